//! tutor-server: websocket terminal endpoint for the lesson workspace.
//!
//! Every connection on the terminal path gets its own PTY running the
//! configured shell. Bytes pass through unmodified in both directions.

mod cli;
mod connection;
mod pty;
mod server;
mod session;
mod utf8;

use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tutor_config::TutorConfig;

use crate::server::{serve, ServerContext};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = tutor_config::load_config_from(args.config.as_deref());
    let level = match (&args.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.level.as_directive().to_string(),
        (None, Err(_)) => "info".to_string(),
    };
    let directive = format!("tutor_server={level}");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| "tutor_server=info".parse().unwrap()),
            ),
        )
        .init();

    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        TutorConfig::default()
    });
    args.apply(&mut config.server);

    let addr = config.server.listen_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind TCP listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "tutor-server listening on ws://{}{}",
        addr,
        config.server.path
    );

    let ctx = Arc::new(ServerContext::new(config.server, config.shell));
    tokio::select! {
        _ = serve(listener, ctx) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }
    ExitCode::SUCCESS
}
