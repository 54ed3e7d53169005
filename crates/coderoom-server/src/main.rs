//! coderoom-server: WebSocket front end for shared code rooms.
//!
//! Accepts WebSocket connections, decodes the JSON client events, and hands
//! them to the session coordinator, which fans roster, code, language and
//! typing updates out to the right peers.

mod cli;
mod connection;
mod server;

use std::path::Path;
use std::time::Duration;

use coderoom_config::schema::SessionsConfig;
use coderoom_config::CoderoomConfig;
use coderoom_coordinator::{Coordinator, CoordinatorOptions};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::server::{serve, spawn_stats_tick};

fn coordinator_options(sessions: &SessionsConfig) -> CoordinatorOptions {
    CoordinatorOptions {
        bootstrap_late_joiners: sessions.bootstrap_late_joiners,
        max_session_id_len: sessions.max_session_id_len,
        max_display_name_len: sessions.max_display_name_len,
        max_content_bytes: sessions.max_content_bytes,
    }
}

fn load_config(args: &Args) -> Result<CoderoomConfig, coderoom_common::ConfigError> {
    coderoom_config::load_config(args.config.as_deref().map(Path::new), |config| {
        if let Some(ref host) = args.host {
            config.server.host = host.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
    })
}

async fn run(config: CoderoomConfig) -> coderoom_common::Result<()> {
    let coordinator = Coordinator::new(coordinator_options(&config.sessions));

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("coderoom-server listening on {}", addr);

    if config.server.stats_interval_secs > 0 {
        spawn_stats_tick(
            coordinator.clone(),
            Duration::from_secs(config.server.stats_interval_secs),
        );
    }

    serve(listener, coordinator, config.server.outbox_capacity).await;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let loaded = load_config(&args);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    let log_directive = args.log_level.clone().unwrap_or_else(|| level.directive());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_directive)),
        )
        .init();

    tracing::info!("coderoom-server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Config load failed: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
