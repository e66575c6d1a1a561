//! Validation for the websocket endpoint, server path, and browser home URL.

use crate::schema::TutorConfig;

use super::helpers::has_scheme;

pub(crate) fn validate_endpoints(errors: &mut Vec<String>, config: &TutorConfig) {
    if !has_scheme(&config.terminal.endpoint, &["ws", "wss"]) {
        errors.push(format!(
            "terminal.endpoint = {:?} must be a ws:// or wss:// URL",
            config.terminal.endpoint
        ));
    }

    if !config.server.path.starts_with('/') {
        errors.push(format!(
            "server.path = {:?} must start with '/'",
            config.server.path
        ));
    }

    if !has_scheme(&config.browser.home_url, &["http", "https"]) {
        errors.push(format!(
            "browser.home_url = {:?} must be an http:// or https:// URL",
            config.browser.home_url
        ));
    }
}
