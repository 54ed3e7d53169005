use serde::{Deserialize, Serialize};

/// Session membership and relay limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Push the last-known code and language to a connection right after it joins.
    pub bootstrap_late_joiners: bool,
    pub max_session_id_len: usize,
    pub max_display_name_len: usize,
    /// Content updates larger than this are dropped instead of relayed.
    pub max_content_bytes: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            bootstrap_late_joiners: true,
            max_session_id_len: 128,
            max_display_name_len: 64,
            max_content_bytes: 1024 * 1024,
        }
    }
}
