//! tutor: console front end for the lesson workspace.
//!
//! Mounts a workspace of terminal and browser panes, prints the active
//! terminal's output to stdout, and reads commands from stdin.

mod cli;
mod console;
mod input;
mod repl;

use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tutor_bridge::{DisplaySink, WsConnector};
use tutor_common::{EventBus, PaneId};
use tutor_config::TutorConfig;
use tutor_workspace::{MountOptions, SinkFactory, Workspace};

use crate::console::{ActivePane, ConsoleSink};

const LOG_TARGETS: [&str; 3] = ["tutor", "tutor_workspace", "tutor_bridge"];

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = tutor_config::load_config_from(args.config.as_deref());
    let level = match (&args.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.level.as_directive().to_string(),
        (None, Err(_)) => "info".to_string(),
    };
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        match format!("{target}={level}").parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("ignoring log level {level:?}: {e}"),
        }
    }
    // Stdout belongs to the panes.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        TutorConfig::default()
    });
    args.apply(&mut config.terminal);

    let bus = EventBus::new(config.workspace.event_capacity as usize);
    let active = ActivePane::default();
    let tracker = tokio::spawn(console::track_active(bus.subscribe_notifications(), active.clone()));

    let out = Arc::new(Mutex::new(std::io::stdout()));
    let observer: SinkFactory = {
        let active = active.clone();
        let out = out.clone();
        Arc::new(move |pane: PaneId| {
            Box::new(ConsoleSink::new(pane, active.clone(), out.clone())) as Box<dyn DisplaySink>
        })
    };

    let connector = WsConnector::new(Duration::from_secs(config.terminal.connect_timeout_secs));
    tracing::info!(endpoint = %config.terminal.endpoint, "mounting workspace");
    let (workspace, shell) = Workspace::mount(
        MountOptions::from_config(&config).with_observer(observer),
        Arc::new(connector),
        bus,
    );

    let cancel = CancellationToken::new();
    let driver = tokio::spawn(workspace.run(cancel.clone()));
    console::print_line(&out, "type :help for commands");

    let interrupted = tokio::select! {
        _ = repl::run(tokio::io::stdin(), shell.clone(), active, out.clone()) => false,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            true
        }
    };

    shell.quit();
    cancel.cancel();
    if let Err(e) = driver.await {
        tracing::error!(error = %e, "workspace task failed");
        return ExitCode::FAILURE;
    }
    tracker.abort();
    if interrupted {
        // A pending stdin read would hold the runtime open.
        std::process::exit(0);
    }
    ExitCode::SUCCESS
}
