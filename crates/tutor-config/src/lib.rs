//! Tutor configuration system.
//!
//! TOML-based configuration shared by the workspace client and the terminal
//! endpoint server. Every section uses `serde(default)` so partial configs
//! work out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BrowserConfig, LogLevel, LoggingConfig, ServerConfig, ShellConfig, TerminalConfig,
    TutorConfig, WorkspaceConfig, CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use tutor_common::ConfigError;

/// Load config from the platform default path, creating a commented
/// default file when none exists.
pub fn load_config() -> Result<TutorConfig, ConfigError> {
    toml_loader::load_default()
}

/// Load config from `path` when given, otherwise from the platform default.
pub fn load_config_from(path: Option<&Path>) -> Result<TutorConfig, ConfigError> {
    match path {
        Some(path) => toml_loader::load_from_path(path),
        None => load_config(),
    }
}

/// Serialize a config to a pretty-printed TOML string.
pub fn config_to_toml(config: &TutorConfig) -> String {
    toml::to_string_pretty(config)
        .unwrap_or_else(|e| format!("# failed to serialize config: {e}\n"))
}
