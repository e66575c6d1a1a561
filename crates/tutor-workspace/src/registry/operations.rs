//! Create, close, and activate operations on the PaneRegistry.

use tracing::{debug, info};
use tutor_bridge::{Scrollback, StreamBridge};
use tutor_common::{Event, PaneId, PaneKind};

use crate::navigation::{normalize_url, NavigationState};
use crate::pane::{Pane, PaneSink, TerminalPane};

use super::PaneRegistry;

fn pick_title(kind: PaneKind, hint: Option<&str>) -> String {
    match hint.map(str::trim) {
        Some(hint) if !hint.is_empty() => hint.to_string(),
        _ => kind.default_title().to_string(),
    }
}

impl PaneRegistry {
    /// Append a new pane of `kind` and make it active.
    ///
    /// A terminal pane starts dialing immediately. A browser pane opens the
    /// configured home URL.
    pub fn create_pane(&mut self, kind: PaneKind, title_hint: Option<&str>) -> PaneId {
        match kind {
            PaneKind::Terminal => {
                let id = self.allocate_id();
                let pane = Pane::new_terminal(id, pick_title(kind, title_hint), self.spawn_terminal(id));
                self.insert(pane)
            }
            PaneKind::Browser => {
                let home = self.options.home_url.clone();
                self.open_browser(&home, title_hint)
            }
        }
    }

    /// Append a browser pane pointed at `url` and make it active. Browser
    /// panes are never shared: every call is a fresh navigation.
    pub fn open_browser(&mut self, url: &str, title_hint: Option<&str>) -> PaneId {
        let url = normalize_url(url).unwrap_or_else(|| self.options.home_url.clone());
        let id = self.allocate_id();
        let pane = Pane::new_browser(
            id,
            pick_title(PaneKind::Browser, title_hint),
            NavigationState::new(url),
        );
        self.insert(pane)
    }

    /// Remove a pane. Unknown ids are ignored.
    ///
    /// The pane's bridge is closed before it leaves the registry. Closing the
    /// active pane activates the new last pane; closing any other pane leaves
    /// the active pane alone.
    pub fn close_pane(&mut self, id: PaneId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(pane = %id, "close ignored, no such pane");
            return false;
        };

        self.panes[index].close();
        let pane = self.panes.remove(index);
        info!(pane = %id, key = %pane.key(), "pane closed");
        drop(pane);
        self.bus.publish(Event::PaneClosed(id));

        if self.active == Some(id) {
            let next = self.panes.last().map(|p| p.id);
            self.set_active_inner(next);
        }
        true
    }

    /// Make `id` the active pane. Unknown ids are ignored.
    pub fn set_active(&mut self, id: PaneId) -> bool {
        if !self.contains(id) {
            debug!(pane = %id, "activate ignored, no such pane");
            return false;
        }
        self.set_active_inner(Some(id));
        true
    }

    /// Close every pane's bridge exactly once and empty the registry.
    pub fn shutdown(&mut self) {
        if self.panes.is_empty() {
            return;
        }
        info!(panes = self.panes.len(), "closing all panes");
        for pane in &mut self.panes {
            pane.close();
        }
        for pane in self.panes.drain(..) {
            self.bus.publish(Event::PaneClosed(pane.id));
        }
        self.set_active_inner(None);
    }

    fn allocate_id(&mut self) -> PaneId {
        let id = PaneId(self.next_id);
        self.next_id += 1;
        id
    }

    fn spawn_terminal(&self, id: PaneId) -> TerminalPane {
        let scrollback = Scrollback::new(self.options.scrollback_bytes);
        let observer = self.observer.as_ref().map(|factory| factory(id));
        let sink = PaneSink::new(scrollback.clone(), observer);
        let mut bridge = StreamBridge::new(id, self.options.endpoint.clone(), Box::new(sink));
        bridge.open(self.connector.as_ref(), &self.bridge_tx);
        TerminalPane::new(bridge, scrollback)
    }

    fn insert(&mut self, pane: Pane) -> PaneId {
        let id = pane.id;
        info!(pane = %id, key = %pane.key(), title = %pane.title, "pane opened");
        self.panes.push(pane);
        self.bus.publish(Event::PaneOpened(id));
        self.set_active_inner(Some(id));
        id
    }

    fn set_active_inner(&mut self, next: Option<PaneId>) {
        if self.active == next {
            return;
        }
        debug!(from = ?self.active, to = ?next, "active pane changed");
        self.active = next;
        self.bus.publish(Event::ActivePaneChanged(next));
    }
}
