//! Terminal pane (client side) configuration types.

use serde::{Deserialize, Serialize};

/// How terminal panes reach the remote shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Websocket endpoint every terminal pane dials.
    pub endpoint: String,
    /// Seconds before a pending dial is reported as a connect failure
    /// (valid range: 1-120).
    pub connect_timeout_secs: u64,
    /// Bytes of output retained per pane for re-rendering.
    pub scrollback_bytes: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:8080/term".into(),
            connect_timeout_secs: 10,
            scrollback_bytes: 256 * 1024,
        }
    }
}
