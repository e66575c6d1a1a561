use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a pane. Allocated from a monotonic counter and never reused
/// for the lifetime of the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaneId(pub u32);

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneKind {
    Terminal,
    Browser,
}

impl PaneKind {
    /// Title used when the creator supplies no hint.
    pub fn default_title(self) -> &'static str {
        match self {
            PaneKind::Terminal => "Terminal",
            PaneKind::Browser => "Browser",
        }
    }

    /// Short prefix used for tab keys (`term-3`, `browser-4`).
    pub fn key_prefix(self) -> &'static str {
        match self {
            PaneKind::Terminal => "term",
            PaneKind::Browser => "browser",
        }
    }
}

impl fmt::Display for PaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaneKind::Terminal => write!(f, "terminal"),
            PaneKind::Browser => write!(f, "browser"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pane_id_display() {
        assert_eq!(PaneId(7).to_string(), "pane-7");
    }

    #[test]
    fn pane_id_ordering_follows_counter() {
        assert!(PaneId(1) < PaneId(2));
    }

    #[test]
    fn pane_kind_titles_and_prefixes() {
        assert_eq!(PaneKind::Terminal.default_title(), "Terminal");
        assert_eq!(PaneKind::Browser.default_title(), "Browser");
        assert_eq!(PaneKind::Terminal.key_prefix(), "term");
        assert_eq!(PaneKind::Browser.key_prefix(), "browser");
    }

    #[test]
    fn pane_kind_serializes_lowercase() {
        let json = serde_json::to_string(&PaneKind::Browser).unwrap();
        assert_eq!(json, "\"browser\"");
        let kind: PaneKind = serde_json::from_str("\"terminal\"").unwrap();
        assert_eq!(kind, PaneKind::Terminal);
    }
}
