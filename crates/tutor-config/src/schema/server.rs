//! Terminal endpoint server configuration types.

use serde::{Deserialize, Serialize};

/// Listener and PTY settings for the endpoint server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind: String,
    pub port: u16,
    /// Websocket upgrade path; every other path is answered with 404.
    pub path: String,
    /// Concurrent terminal sessions (valid range: 1-256).
    pub max_sessions: u32,
    /// Initial PTY columns (valid range: 20-500).
    pub cols: u16,
    /// Initial PTY rows (valid range: 5-200).
    pub rows: u16,
    /// Value of `TERM` inside the shell.
    pub term: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            path: "/term".into(),
            max_sessions: 16,
            cols: 80,
            rows: 24,
            term: "xterm".into(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
