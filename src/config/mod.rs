// src/config/mod.rs

//! Configuration loading and validation for fleetrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into the [`Settings`] value object handed to the
//!   orchestration facade (`validate.rs`, `settings.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, load_settings};
pub use model::{ApiSection, DispatchSection, PollSection, RawConfigFile};
pub use settings::{ApiSettings, DispatchSettings, PollSettings, Settings};
pub use validate::{MAX_DURATION, validate_settings};
