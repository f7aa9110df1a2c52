//! Configuration loading, environment overrides, and validation.
//!
//! Config file: `ely.toml`, searched in `./`, next to the executable, then
//! the user config directory. Environment variables (optionally from a
//! `.env` file) override file values; CLI flags override both.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Context, Error, Result},
    loader::{
        CONFIG_FILENAME, ConfigSource, DotenvFailure, DotenvOutcome, apply_overrides_from,
        discover_source, find_config_file, load_config, load_dotenv, load_source,
    },
    schema::{DiscordConfig, ElyConfig, EngineConfig, ServerConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
