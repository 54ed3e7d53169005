//! Coderoom configuration system.
//!
//! TOML-based configuration with environment overrides and full
//! validation. All sections use defaults so partial configs work.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use coderoom_config::load_config;
//!
//! let config = load_config(None, |config| config.server.port = 6000)
//!     .expect("failed to load config");
//! println!("listening on {}", config.server.bind_addr());
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use env::apply_env_overrides;
pub use schema::{CoderoomConfig, LogLevel};

use coderoom_common::ConfigError;
use std::path::Path;

/// Build the effective config and validate it once.
///
/// Layers, lowest first: `path` (or the platform default file), environment
/// overrides, then `overrides` from the caller. Only the final result is
/// validated, so a later layer can correct an out-of-range file value.
pub fn load_config<F>(path: Option<&Path>, overrides: F) -> Result<CoderoomConfig, ConfigError>
where
    F: FnOnce(&mut CoderoomConfig),
{
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    apply_env_overrides(&mut config);
    overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}
