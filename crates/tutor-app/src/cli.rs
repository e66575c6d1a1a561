use std::path::PathBuf;

use clap::Parser;
use tutor_config::TerminalConfig;

/// Lesson workspace: terminal and browser panes driven from one console.
#[derive(Parser, Debug)]
#[command(name = "tutor", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Terminal endpoint, overriding `terminal.endpoint`.
    #[arg(short, long)]
    pub endpoint: Option<String>,
}

impl Args {
    pub fn apply(&self, terminal: &mut TerminalConfig) {
        if let Some(endpoint) = &self.endpoint {
            terminal.endpoint = endpoint.clone();
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
