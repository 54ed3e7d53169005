use clap::Parser;

/// Coderoom: shared code rooms over WebSocket.
#[derive(Parser, Debug)]
#[command(name = "coderoom-server", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Interface to bind (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and $PORT).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log filter directive override, e.g. "coderoom_server=debug".
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::parse_from([
            "coderoom-server",
            "--port",
            "4000",
            "--host",
            "127.0.0.1",
            "--log-level",
            "coderoom_server=debug",
        ]);
        assert_eq!(args.port, Some(4000));
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.log_level.as_deref(), Some("coderoom_server=debug"));
        assert!(args.config.is_none());
    }

    #[test]
    fn defaults_to_no_overrides() {
        let args = Args::parse_from(["coderoom-server"]);
        assert!(args.port.is_none());
        assert!(args.host.is_none());
    }
}
