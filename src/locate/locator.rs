// src/locate/locator.rs

use std::sync::Arc;

use tracing::{debug, error};

use crate::api::{RemoteApi, ResourceSummary};
use crate::errors::{FleetError, ResourceKind, Result};

use super::handles::{ArrayHandle, ExecutableRef, RECIPE_SEPARATOR};

/// Resolves human-supplied names to remote handles.
pub struct ResourceLocator<A: RemoteApi> {
    api: Arc<A>,
}

impl<A: RemoteApi> ResourceLocator<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Search server arrays by name.
    ///
    /// - `exact = true`: only a candidate whose name equals `name`; at most
    ///   one handle is returned.
    /// - `exact = false`: every candidate the remote search returned, in
    ///   remote order.
    ///
    /// An empty result is a `NotFound` error.
    pub async fn find_arrays_by_name(&self, name: &str, exact: bool) -> Result<Vec<ArrayHandle>> {
        ensure_name(name, ResourceKind::Array)?;
        debug!(name, exact, "searching for ServerArray");

        let candidates = self.api.search_arrays(name).await?;
        let arrays: Vec<ArrayHandle> = if exact {
            candidates
                .into_iter()
                .find(|c| c.name == name)
                .map(ArrayHandle::from)
                .into_iter()
                .collect()
        } else {
            candidates.into_iter().map(ArrayHandle::from).collect()
        };

        if arrays.is_empty() {
            error!(name, "could not find ServerArray");
            return Err(FleetError::NotFound {
                kind: ResourceKind::Array,
                name: name.to_string(),
            });
        }

        debug!(name, found = arrays.len(), "got ServerArray(s)");
        Ok(arrays)
    }

    /// Find the latest revision of the RightScript named exactly `name`.
    ///
    /// The remote search is only used to narrow candidates; a candidate is
    /// accepted only on exact name equality.
    pub async fn find_script_by_name(&self, name: &str) -> Result<ExecutableRef> {
        ensure_name(name, ResourceKind::Script)?;
        debug!(name, "searching for RightScript");

        let candidates = self.api.search_scripts(name).await?;
        let fuzzy = candidates.len();

        let Some(script) = select_latest_revision(candidates, name) else {
            error!(name, fuzzy_matches = fuzzy, "could not find RightScript");
            return Err(FleetError::NotFound {
                kind: ResourceKind::Script,
                name: name.to_string(),
            });
        };

        let revision = script.revision.unwrap_or(0);
        debug!(name, revision, href = %script.href, "got RightScript");

        Ok(ExecutableRef::Script {
            name: script.name,
            revision,
            href: script.href,
        })
    }

    /// Resolve a script-or-recipe name.
    ///
    /// Names containing `::` are recipes and are accepted without any
    /// remote lookup. A malformed recipe only surfaces when dispatch fails.
    pub async fn resolve_executable(&self, name: &str) -> Result<ExecutableRef> {
        if name.trim().is_empty() {
            return Err(FleetError::InvalidReference(
                "script or recipe name must not be empty".to_string(),
            ));
        }
        if name.contains(RECIPE_SEPARATOR) {
            debug!(recipe = name, "treating name as a recipe reference");
            return Ok(ExecutableRef::recipe(name));
        }
        self.find_script_by_name(name).await
    }
}

/// Keep candidates named exactly `name` and return the one with the highest
/// numeric revision. Ties go to the first candidate seen; a missing revision
/// counts as 0.
pub fn select_latest_revision(
    candidates: Vec<ResourceSummary>,
    name: &str,
) -> Option<ResourceSummary> {
    let mut best: Option<ResourceSummary> = None;

    for candidate in candidates.into_iter().filter(|c| c.name == name) {
        let newer = match best {
            Some(ref current) => {
                candidate.revision.unwrap_or(0) > current.revision.unwrap_or(0)
            }
            None => true,
        };
        if newer {
            best = Some(candidate);
        }
    }

    best
}

fn ensure_name(name: &str, kind: ResourceKind) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FleetError::InvalidReference(format!(
            "{kind} name must not be empty"
        )));
    }
    Ok(())
}
