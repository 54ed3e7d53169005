//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Coderoom Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "0.0.0.0"
# port = 5000                   # 1-65535, overridden by $PORT
# outbox_capacity = 256         # 1-65536 notifications per connection
# stats_interval_secs = 60      # 0 disables the periodic stats line

[sessions]
# bootstrap_late_joiners = true # send last-known code/language on join
# max_session_id_len = 128      # 1-4096
# max_display_name_len = 64     # 1-4096
# max_content_bytes = 1048576

[logging]
# level = "INFO"                # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
