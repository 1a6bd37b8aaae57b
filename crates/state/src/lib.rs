//! Manages sbmig configuration.
//!
//! This crate provides utilities for:
//! - Reading environment variables for configuration.
//! - Loading `sbmig.config.json`.
//! - Layering CLI overrides, environment and file settings into one
//!   [`RuntimeConfig`].

pub mod env;
pub mod settings;

pub use env::{
    config_file, env_concurrency, env_per_page, env_timeout_secs, env_working_dir,
    CONFIG_FILE_NAME,
};
pub use settings::{load_settings, Overrides, RuntimeConfig, Settings, DEFAULT_API_URL};
