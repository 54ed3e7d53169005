use serde::{Deserialize, Serialize};

/// Listener and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port for WebSocket clients.
    pub port: u16,
    /// Notifications buffered per connection before deliveries are dropped.
    pub outbox_capacity: usize,
    /// Seconds between stats log lines. 0 disables the tick.
    pub stats_interval_secs: u64,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            outbox_capacity: 256,
            stats_interval_secs: 60,
        }
    }
}
