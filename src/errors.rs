// src/errors.rs

//! Crate-wide error types and aliases.
//!
//! - [`FleetError`] is what the locator, dispatcher and orchestration facade
//!   return. Anything surfaced through it is fatal to the current call.
//! - [`ApiError`] describes a single failed remote request. During
//!   resolution it is wrapped into `FleetError::Api`; during dispatch and
//!   polling it is recovered locally and only logged/recorded.

use std::fmt;

use thiserror::Error;

/// What kind of remote resource a lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Array,
    Script,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Array => f.write_str("ServerArray"),
            ResourceKind::Script => f.write_str("RightScript"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Could not find {kind} matching name: {name}")]
    NotFound { kind: ResourceKind, name: String },

    #[error("Invalid executable reference: {0}")]
    InvalidReference(String),

    #[error("Remote API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of one remote request.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, TLS, ...).
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The per-request timeout fired.
    #[error("HTTP request to {url} timed out")]
    Timeout { url: String },

    /// The API answered with a non-2xx status.
    #[error("API error ({status}) from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// A run-executable call succeeded but carried no task location.
    #[error("response from {url} has no Location header")]
    MissingLocation { url: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
            }
        } else {
            ApiError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FleetError>;
