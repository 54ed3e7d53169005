//! Full configuration validation.
//!
//! Each section is checked independently and all errors are collected
//! into a single `ConfigError`.

mod helpers;


use crate::schema::CoderoomConfig;
use coderoom_common::ConfigError;
use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &CoderoomConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let server = &config.server;
    validate_range(&mut errors, "server.port", server.port as u64, 1, 65535);
    validate_range(
        &mut errors,
        "server.outbox_capacity",
        server.outbox_capacity as u64,
        1,
        65536,
    );
    if server.host.trim().is_empty() {
        errors.push("server.host must not be empty".into());
    }

    let sessions = &config.sessions;
    validate_range(
        &mut errors,
        "sessions.max_session_id_len",
        sessions.max_session_id_len as u64,
        1,
        4096,
    );
    validate_range(
        &mut errors,
        "sessions.max_display_name_len",
        sessions.max_display_name_len as u64,
        1,
        4096,
    );
    validate_range(
        &mut errors,
        "sessions.max_content_bytes",
        sessions.max_content_bytes as u64,
        1,
        u64::MAX,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
