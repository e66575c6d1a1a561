//! Render-ready snapshots of the registry for a tab strip and pane body.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tutor_bridge::BridgeState;
use tutor_common::{PaneId, PaneKind};

use crate::pane::{Pane, PaneBody};
use crate::registry::PaneRegistry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneView {
    pub id: PaneId,
    pub key: String,
    pub kind: PaneKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    /// Every pane can be closed from its tab.
    pub closable: bool,
    pub body: PaneViewBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaneViewBody {
    Terminal {
        state: String,
        endpoint: String,
        /// Scrollback decoded lossily as UTF-8.
        output: String,
        pending_command: bool,
    },
    Browser {
        url: String,
        draft: String,
        reloads: u32,
    },
}

impl PaneView {
    pub fn of(pane: &Pane, active: bool) -> Self {
        let body = match &pane.body {
            PaneBody::Terminal(t) => PaneViewBody::Terminal {
                state: t.state().to_string(),
                endpoint: t.endpoint().to_string(),
                output: t.scrollback().text(),
                pending_command: t.has_pending(),
            },
            PaneBody::Browser(nav) => PaneViewBody::Browser {
                url: nav.url().to_string(),
                draft: nav.draft().to_string(),
                reloads: nav.reloads(),
            },
        };
        Self {
            id: pane.id,
            key: pane.key(),
            kind: pane.kind,
            title: pane.title.clone(),
            created_at: pane.created_at,
            active,
            closable: true,
            body,
        }
    }

    /// Bridge state for terminal panes.
    pub fn bridge_state(&self) -> Option<&str> {
        match &self.body {
            PaneViewBody::Terminal { state, .. } => Some(state),
            PaneViewBody::Browser { .. } => None,
        }
    }

    /// One tab-strip label, e.g. `[term-1 Terminal]*` for the active tab.
    pub fn label(&self) -> String {
        let marker = if self.active { "*" } else { "" };
        format!("[{} {}]{}", self.key, self.title, marker)
    }
}

/// Whole-workspace view: panes in display order plus the active id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceSnapshot {
    pub panes: Vec<PaneView>,
    pub active: Option<PaneId>,
}

impl WorkspaceSnapshot {
    pub fn tab_strip(&self) -> String {
        self.panes
            .iter()
            .map(PaneView::label)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn active_view(&self) -> Option<&PaneView> {
        self.panes.iter().find(|v| v.active)
    }
}

impl PaneRegistry {
    pub fn views(&self) -> Vec<PaneView> {
        let active = self.active_id();
        self.panes()
            .map(|p| PaneView::of(p, Some(p.id) == active))
            .collect()
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            panes: self.views(),
            active: self.active_id(),
        }
    }

    /// Bridge state of a terminal pane.
    pub fn bridge_state(&self, id: PaneId) -> Option<BridgeState> {
        self.pane(id)?.terminal().map(|t| t.state())
    }
}
