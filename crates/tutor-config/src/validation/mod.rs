//! Full configuration validation.
//!
//! Validates numeric ranges and URL/path shapes. Every problem is collected
//! into a single `ConfigError` so a user sees all of them at once.

mod endpoints;
mod helpers;


use crate::schema::TutorConfig;
use tutor_common::ConfigError;

use helpers::validate_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TutorConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(
        &mut errors,
        "workspace.event_capacity",
        u64::from(config.workspace.event_capacity),
        1,
        4096,
    );
    validate_range(
        &mut errors,
        "terminal.connect_timeout_secs",
        config.terminal.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        &mut errors,
        "server.max_sessions",
        u64::from(config.server.max_sessions),
        1,
        256,
    );
    validate_range(&mut errors, "server.cols", u64::from(config.server.cols), 20, 500);
    validate_range(&mut errors, "server.rows", u64::from(config.server.rows), 5, 200);

    if config.server.port == 0 {
        errors.push("server.port must not be 0".into());
    }
    if config.server.term.trim().is_empty() {
        errors.push("server.term must not be empty".into());
    }

    endpoints::validate_endpoints(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
