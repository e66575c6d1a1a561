use std::path::PathBuf;

use clap::Parser;
use tutor_config::ServerConfig;

/// Terminal endpoint for the lesson workspace: one shell per websocket.
#[derive(Parser, Debug)]
#[command(name = "tutor-server", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Address to bind, overriding `server.bind`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on, overriding `server.port`.
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Args {
    /// Fold command-line overrides into the loaded server config.
    pub fn apply(&self, server: &mut ServerConfig) {
        if let Some(bind) = &self.bind {
            server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            server.port = port;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
