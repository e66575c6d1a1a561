//! Commented default config written on first run.

/// Generate the default TOML config content with comments.
pub fn default_config_toml() -> String {
    r##"# Tutor Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[workspace]
# initial_panes = ["terminal"]   # terminal, browser
# event_capacity = 64            # 1-4096

[terminal]
# endpoint = "ws://127.0.0.1:8080/term"
# connect_timeout_secs = 10      # 1-120
# scrollback_bytes = 262144

[browser]
# home_url = "https://example.com"

[server]
# bind = "127.0.0.1"
# port = 8080
# path = "/term"
# max_sessions = 16              # 1-256
# cols = 80                      # 20-500
# rows = 24                      # 5-200
# term = "xterm"

[shell]
# program = ""                   # empty: $SHELL, then /bin/sh
# args = []
# login_shell = true

[logging]
# level = "info"                 # trace, debug, info, warn, error
"##
    .to_string()
}
