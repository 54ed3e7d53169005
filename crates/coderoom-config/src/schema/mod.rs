//! Configuration schema types for the coderoom server.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod server;
mod sessions;

pub use logging::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoderoomConfig {
    pub server: ServerConfig,
    pub sessions: SessionsConfig,
    pub logging: LoggingConfig,
}
