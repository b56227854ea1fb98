// src/api/mod.rs

//! Remote API seam.
//!
//! Everything above this module talks to a [`RemoteApi`] instead of a raw
//! HTTP client. Production code uses [`RightScaleClient`]; tests provide an
//! in-memory implementation that records calls and injects failures.
//!
//! - [`client`] is the `reqwest`-backed RightScale 1.5 client.
//! - [`resource`] holds the small resource summaries this crate reads.

pub mod client;
pub mod resource;

use std::future::Future;
use std::pin::Pin;

use crate::errors::ApiError;

pub use client::RightScaleClient;
pub use resource::{summaries_from_json, ResourceSummary, RunParam};

/// Boxed future returned by every [`RemoteApi`] call.
pub type ApiFuture<'a, T> =
    Pin<Box<dyn Future<Output = std::result::Result<T, ApiError>> + Send + 'a>>;

/// The remote operations the orchestration layer consumes.
///
/// Hrefs and task locations are passed exactly as the API handed them out;
/// the implementation is responsible for turning them into absolute URLs.
pub trait RemoteApi: Send + Sync {
    /// Fuzzy search of the server array collection by name.
    fn search_arrays<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<ResourceSummary>>;

    /// Fuzzy search of the RightScript collection by name.
    fn search_scripts<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<ResourceSummary>>;

    /// Current member instances of the array at `array_href`.
    fn list_instances<'a>(&'a self, array_href: &'a str)
        -> ApiFuture<'a, Vec<ResourceSummary>>;

    /// POST a run request to `url` and return the task location.
    fn run_executable<'a>(&'a self, url: &'a str, param: &'a RunParam)
        -> ApiFuture<'a, String>;

    /// Current `summary` of the task at `location`, if the body carries one.
    fn task_summary<'a>(&'a self, location: &'a str) -> ApiFuture<'a, Option<String>>;
}
