//! Navigation state owned by a browser pane.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Matches inputs that already carry an http(s) scheme.
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Turn address-bar input into a loadable URL.
///
/// Surrounding whitespace is trimmed and `https://` is prepended when no
/// http(s) scheme is present. Empty input yields `None`.
pub fn normalize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if SCHEME_RE.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

/// Current page plus the address-bar draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    url: String,
    draft: String,
    /// Bumped on every reload so a renderer can tell a refresh from a no-op.
    reloads: u32,
}

impl NavigationState {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            draft: url.clone(),
            url,
            reloads: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    /// Edit the address bar without loading anything.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Load whatever is in the address bar. Returns the new URL, or `None`
    /// if the draft was blank (the current page stays loaded).
    pub fn submit(&mut self) -> Option<&str> {
        let url = normalize_url(&self.draft)?;
        self.draft = url.clone();
        self.url = url;
        Some(&self.url)
    }

    /// Shorthand for `set_draft` followed by `submit`.
    pub fn navigate(&mut self, input: &str) -> Option<&str> {
        self.set_draft(input);
        self.submit()
    }

    pub fn reload(&mut self) {
        self.reloads = self.reloads.wrapping_add(1);
    }
}
