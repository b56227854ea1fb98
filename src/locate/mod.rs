// src/locate/mod.rs

//! Name → remote resource resolution.
//!
//! - [`handles`] defines the resolved handle types ([`ArrayHandle`],
//!   [`InstanceHandle`], [`ExecutableRef`]).
//! - [`locator`] turns user-supplied names into those handles, applying
//!   fuzzy search, exact-name filtering and revision tie-breaking.

pub mod handles;
pub mod locator;

pub use handles::{ArrayHandle, ExecutableRef, InstanceHandle, RECIPE_SEPARATOR};
pub use locator::{ResourceLocator, select_latest_revision};
