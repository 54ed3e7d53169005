pub mod errors;
pub mod id;

pub use errors::{CoderoomError, ConfigError, CoordinatorError};
pub use id::{new_id, ConnectionId, SessionId};

pub type Result<T> = std::result::Result<T, CoderoomError>;
