//! Workspace and browser pane configuration types.

use serde::{Deserialize, Serialize};
use tutor_common::PaneKind;

/// Settings for the pane multiplexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Panes created when the workspace mounts, in display order.
    pub initial_panes: Vec<PaneKind>,
    /// Capacity of the broadcast event bus (valid range: 1-4096).
    pub event_capacity: u32,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            initial_panes: vec![PaneKind::Terminal],
            event_capacity: 64,
        }
    }
}

/// Settings for browser panes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// URL loaded by browser panes opened from the tab strip.
    pub home_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            home_url: "https://example.com".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_defaults() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.initial_panes, vec![PaneKind::Terminal]);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn initial_panes_from_toml() {
        let config: WorkspaceConfig =
            toml::from_str(r#"initial_panes = ["terminal", "browser", "terminal"]"#).unwrap();
        assert_eq!(
            config.initial_panes,
            vec![PaneKind::Terminal, PaneKind::Browser, PaneKind::Terminal]
        );
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn browser_default_home() {
        assert_eq!(BrowserConfig::default().home_url, "https://example.com");
    }
}
