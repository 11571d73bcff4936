//! Configuration loading, env substitution, overrides, and validation.
//!
//! Config files: `chatrank.toml`, `chatrank.yaml`, or `chatrank.json`
//! Searched in `./` then `~/.config/chatrank/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::{ChatRankConfig, CounterConfig, MetricsConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate_config},
};
