// src/locate/handles.rs

use std::fmt;

use crate::api::{ResourceSummary, RunParam};
use crate::errors::{FleetError, Result};

/// Namespace separator that marks a Chef recipe (`cookbook::recipe`).
pub const RECIPE_SEPARATOR: &str = "::";

/// A resolved server array.
///
/// Member instances are not stored here: the fleet may change
/// between resolution and dispatch, so they are listed at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayHandle {
    pub name: String,
    pub href: String,
}

/// One current member instance of an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    pub name: String,
    pub href: String,
}

impl ArrayHandle {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }

    /// Endpoint for array-wide dispatch.
    pub fn multi_run_url(&self) -> String {
        format!("{}/multi_run_executable", self.href.trim_end_matches('/'))
    }
}

impl InstanceHandle {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }

    pub fn run_url(&self) -> String {
        format!("{}/run_executable", self.href.trim_end_matches('/'))
    }
}

impl From<ResourceSummary> for ArrayHandle {
    fn from(summary: ResourceSummary) -> Self {
        Self::new(summary.name, summary.href)
    }
}

impl From<ResourceSummary> for InstanceHandle {
    fn from(summary: ResourceSummary) -> Self {
        Self::new(summary.name, summary.href)
    }
}

/// What to run on the fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableRef {
    /// Referenced by name only; nothing is looked up remotely.
    Recipe { qualified_name: String },
    /// A RightScript resolved by the locator.
    Script {
        name: String,
        revision: u64,
        href: String,
    },
}

impl ExecutableRef {
    pub fn recipe(qualified_name: impl Into<String>) -> Self {
        ExecutableRef::Recipe {
            qualified_name: qualified_name.into(),
        }
    }

    /// Name used in log and report lines.
    pub fn display_name(&self) -> &str {
        match self {
            ExecutableRef::Recipe { qualified_name } => qualified_name,
            ExecutableRef::Script { name, .. } => name,
        }
    }

    /// Form parameter for a run-executable POST.
    ///
    /// Fails with `InvalidReference` when neither a recipe name nor a script
    /// href can be produced.
    pub fn run_param(&self) -> Result<RunParam> {
        match self {
            ExecutableRef::Recipe { qualified_name }
                if qualified_name.contains(RECIPE_SEPARATOR) =>
            {
                Ok(RunParam {
                    key: "recipe_name",
                    value: qualified_name.clone(),
                })
            }
            ExecutableRef::Recipe { qualified_name } => Err(FleetError::InvalidReference(
                format!("recipe '{qualified_name}' has no '{RECIPE_SEPARATOR}' separator"),
            )),
            ExecutableRef::Script { name, href, .. } if href.trim().is_empty() => Err(
                FleetError::InvalidReference(format!("script '{name}' has no href")),
            ),
            ExecutableRef::Script { href, .. } => Ok(RunParam {
                key: "right_script_href",
                value: href.clone(),
            }),
        }
    }
}

impl fmt::Display for ExecutableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutableRef::Recipe { qualified_name } => write!(f, "recipe {qualified_name}"),
            ExecutableRef::Script {
                name,
                revision,
                href,
            } => write!(f, "script {name} (rev {revision}, {href})"),
        }
    }
}
