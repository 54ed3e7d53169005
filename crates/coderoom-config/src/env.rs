//! Environment variable overrides applied on top of the loaded file.

use crate::schema::{CoderoomConfig, LogLevel};
use tracing::warn;

/// Listening port override.
pub const PORT_VAR: &str = "PORT";
/// Log level override (`DEBUG`, `INFO`, ...).
pub const LOG_VAR: &str = "CODEROOM_LOG";

/// Apply `PORT` and `CODEROOM_LOG` from the process environment.
pub fn apply_env_overrides(config: &mut CoderoomConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides using `lookup` to read variables. Unparseable values are
/// ignored with a warning.
pub fn apply_overrides_from<F>(config: &mut CoderoomConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(PORT_VAR) {
        match raw.trim().parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(e) => warn!("ignoring {PORT_VAR}={raw}: {e}"),
        }
    }

    if let Some(raw) = lookup(LOG_VAR) {
        let quoted = format!("\"{}\"", raw.trim().to_ascii_uppercase());
        match serde_json::from_str::<LogLevel>(&quoted) {
            Ok(level) => config.logging.level = level,
            Err(e) => warn!("ignoring {LOG_VAR}={raw}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn port_override_applies() {
        let mut config = CoderoomConfig::default();
        apply_overrides_from(&mut config, lookup(&[("PORT", "4000")]));
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn bad_port_is_ignored() {
        let mut config = CoderoomConfig::default();
        apply_overrides_from(&mut config, lookup(&[("PORT", "not-a-port")]));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn log_override_is_case_insensitive() {
        let mut config = CoderoomConfig::default();
        apply_overrides_from(&mut config, lookup(&[("CODEROOM_LOG", "debug")]));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn no_vars_leaves_config_untouched() {
        let mut config = CoderoomConfig::default();
        apply_overrides_from(&mut config, lookup(&[]));
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}
