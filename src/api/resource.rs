// src/api/resource.rs

use serde::Deserialize;

/// The handful of fields this crate reads from any RightScale resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSummary {
    pub name: String,
    /// Self link of the resource.
    pub href: String,
    /// Only present on RightScripts.
    pub revision: Option<u64>,
}

impl ResourceSummary {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = Some(revision);
        self
    }
}

/// Form parameter attached to a run-executable POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParam {
    pub key: &'static str,
    pub value: String,
}

impl RunParam {
    pub fn as_form(&self) -> [(&str, &str); 1] {
        [(self.key, self.value.as_str())]
    }
}

/// Wire shape of a resource as returned by the 1.5 API.
#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    name: String,
    #[serde(default)]
    revision: Option<serde_json::Value>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    rel: String,
    href: String,
}

impl RawResource {
    /// Convert to a summary. Resources without a self link are unusable and
    /// yield `None`.
    fn into_summary(self) -> Option<ResourceSummary> {
        let href = self
            .links
            .into_iter()
            .find(|link| link.rel == "self")
            .map(|link| link.href)?;

        Some(ResourceSummary {
            name: self.name,
            href,
            revision: self.revision.as_ref().and_then(parse_revision),
        })
    }
}

/// Revisions are numeric; older API versions sometimes serialize them as
/// strings.
fn parse_revision(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode a collection response into summaries.
///
/// Search endpoints return a list, but a single match may come back as a
/// bare object; both are normalized to a list. Entries without a self link
/// are dropped.
pub fn summaries_from_json(value: serde_json::Value) -> Result<Vec<ResourceSummary>, String> {
    let raw = resources_from_json(value)?;
    Ok(raw.into_iter().filter_map(RawResource::into_summary).collect())
}

fn resources_from_json(value: serde_json::Value) -> Result<Vec<RawResource>, String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|e| e.to_string()))
            .collect(),
        obj @ serde_json::Value::Object(_) => serde_json::from_value(obj)
            .map(|res| vec![res])
            .map_err(|e| e.to_string()),
        serde_json::Value::Null => Ok(Vec::new()),
        other => Err(format!("expected a list of resources, got {other}")),
    }
}
