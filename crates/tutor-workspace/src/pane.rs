use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use tutor_bridge::{BridgeState, DisplaySink, Scrollback, StreamBridge, WriteOutcome};
use tutor_common::{PaneId, PaneKind};

use crate::navigation::NavigationState;

/// Builds an extra sink that sees a terminal pane's output alongside its
/// scrollback (e.g. a console renderer).
pub type SinkFactory = Arc<dyn Fn(PaneId) -> Box<dyn DisplaySink> + Send + Sync>;

pub struct Pane {
    pub id: PaneId,
    pub kind: PaneKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub(crate) body: PaneBody,
}

pub(crate) enum PaneBody {
    Terminal(TerminalPane),
    Browser(NavigationState),
}

impl Pane {
    pub(crate) fn new_terminal(id: PaneId, title: impl Into<String>, terminal: TerminalPane) -> Self {
        Self {
            id,
            kind: PaneKind::Terminal,
            title: title.into(),
            created_at: Utc::now(),
            body: PaneBody::Terminal(terminal),
        }
    }

    pub(crate) fn new_browser(id: PaneId, title: impl Into<String>, nav: NavigationState) -> Self {
        Self {
            id,
            kind: PaneKind::Browser,
            title: title.into(),
            created_at: Utc::now(),
            body: PaneBody::Browser(nav),
        }
    }

    /// Tab key, e.g. `term-3`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.kind.key_prefix(), self.id.0)
    }

    pub fn terminal(&self) -> Option<&TerminalPane> {
        match &self.body {
            PaneBody::Terminal(t) => Some(t),
            PaneBody::Browser(_) => None,
        }
    }

    pub(crate) fn terminal_mut(&mut self) -> Option<&mut TerminalPane> {
        match &mut self.body {
            PaneBody::Terminal(t) => Some(t),
            PaneBody::Browser(_) => None,
        }
    }

    pub fn navigation(&self) -> Option<&NavigationState> {
        match &self.body {
            PaneBody::Browser(nav) => Some(nav),
            PaneBody::Terminal(_) => None,
        }
    }

    pub(crate) fn navigation_mut(&mut self) -> Option<&mut NavigationState> {
        match &mut self.body {
            PaneBody::Browser(nav) => Some(nav),
            PaneBody::Terminal(_) => None,
        }
    }

    /// Release whatever the pane owns. Safe to call more than once.
    pub(crate) fn close(&mut self) {
        if let PaneBody::Terminal(t) = &mut self.body {
            t.close();
        }
    }
}

/// A terminal pane's bridge, its scrollback, and the single pending command
/// slot used by routed submissions.
pub struct TerminalPane {
    bridge: StreamBridge,
    scrollback: Scrollback,
    pending: Option<Vec<u8>>,
}

impl TerminalPane {
    pub(crate) fn new(bridge: StreamBridge, scrollback: Scrollback) -> Self {
        Self {
            bridge,
            scrollback,
            pending: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.bridge.state()
    }

    pub fn endpoint(&self) -> &str {
        self.bridge.endpoint()
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn bridge_mut(&mut self) -> &mut StreamBridge {
        &mut self.bridge
    }

    /// Raw input path: whatever the bridge does with it, nothing is kept.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> WriteOutcome {
        self.bridge.write(bytes)
    }

    /// Deliver now if open, otherwise hold in the pending slot until the
    /// bridge opens. Returns false when the submission had to be dropped.
    pub(crate) fn submit(&mut self, line: Vec<u8>) -> bool {
        match self.bridge.state() {
            BridgeState::Open => self.bridge.write(&line) == WriteOutcome::Forwarded,
            BridgeState::Connecting => {
                if self.pending.is_some() {
                    warn!(pane = %self.bridge.pane(), "pending slot taken, dropping submission");
                    return false;
                }
                debug!(pane = %self.bridge.pane(), len = line.len(), "holding submission until open");
                self.pending = Some(line);
                true
            }
            BridgeState::Error | BridgeState::Closed => false,
        }
    }

    /// Called after every bridge transition.
    pub(crate) fn on_transition(&mut self, state: BridgeState) {
        match state {
            BridgeState::Open => {
                if let Some(line) = self.pending.take() {
                    debug!(pane = %self.bridge.pane(), "flushing pending submission");
                    self.bridge.write(&line);
                }
            }
            BridgeState::Error | BridgeState::Closed => {
                if self.pending.take().is_some() {
                    warn!(pane = %self.bridge.pane(), state = %state, "pending submission discarded");
                }
            }
            BridgeState::Connecting => {}
        }
    }

    pub(crate) fn close(&mut self) {
        self.pending = None;
        self.bridge.close();
    }
}

/// Sink handed to a terminal pane's bridge: always fills the scrollback,
/// and mirrors to an observer when one was installed.
pub(crate) struct PaneSink {
    scrollback: Scrollback,
    observer: Option<Box<dyn DisplaySink>>,
}

impl PaneSink {
    pub(crate) fn new(scrollback: Scrollback, observer: Option<Box<dyn DisplaySink>>) -> Self {
        Self {
            scrollback,
            observer,
        }
    }
}

impl DisplaySink for PaneSink {
    fn write(&mut self, bytes: &[u8]) {
        self.scrollback.write(bytes);
        if let Some(observer) = self.observer.as_mut() {
            observer.write(bytes);
        }
    }

    fn state_changed(&mut self, state: BridgeState) {
        self.scrollback.state_changed(state);
        if let Some(observer) = self.observer.as_mut() {
            observer.state_changed(state);
        }
    }
}
