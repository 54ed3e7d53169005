use std::path::PathBuf;

use crate::id::ConnectionId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("no platform config directory; pass an explicit config path")]
    NoConfigDir,

    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures reported by the session coordinator.
///
/// `DuplicateConnection` and `DanglingMembership` are misuse of the
/// connection registry by the transport layer; the offending connection is
/// dropped and every other session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("connection {0} still holds a session membership")]
    DanglingMembership(ConnectionId),

    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("invalid join: {0}")]
    InvalidJoin(String),
}

impl CoordinatorError {
    /// Whether the error means the transport integration is broken for this
    /// connection and the link should be torn down.
    pub fn is_registry_misuse(&self) -> bool {
        matches!(
            self,
            CoordinatorError::DuplicateConnection(_) | CoordinatorError::DanglingMembership(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoderoomError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
