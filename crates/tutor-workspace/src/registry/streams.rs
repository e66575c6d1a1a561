//! Input, bridge-event, and navigation operations on the PaneRegistry.

use tracing::{debug, trace};
use tutor_bridge::{BridgeEvent, BridgeEventKind, WriteOutcome};
use tutor_common::PaneId;

use super::PaneRegistry;

impl PaneRegistry {
    /// Raw keystroke path. Returns `None` when `id` is not a terminal pane.
    pub fn write_input(&mut self, id: PaneId, bytes: &[u8]) -> Option<WriteOutcome> {
        let terminal = self.pane_mut(id)?.terminal_mut()?;
        Some(terminal.write(bytes))
    }

    /// Submit a command line on behalf of the router. Unlike raw input, a
    /// pane that is still connecting holds it until the bridge opens.
    pub fn queue_command(&mut self, id: PaneId, line: Vec<u8>) -> bool {
        match self.pane_mut(id).and_then(|p| p.terminal_mut()) {
            Some(terminal) => terminal.submit(line),
            None => false,
        }
    }

    /// Apply one asynchronous bridge event to the pane it belongs to.
    ///
    /// Events for panes that are gone are dropped; a connection that arrives
    /// for a gone pane is released on the spot.
    pub fn handle_bridge_event(&mut self, event: BridgeEvent) {
        let BridgeEvent { pane, kind } = event;
        let Some(terminal) = self.pane_mut(pane).and_then(|p| p.terminal_mut()) else {
            match kind {
                BridgeEventKind::Connected(mut transport) => {
                    debug!(%pane, "connection for closed pane, releasing");
                    transport.close();
                }
                other => trace!(%pane, event = ?other, "event for closed pane dropped"),
            }
            return;
        };

        if let Some(state) = terminal.bridge_mut().handle_event(kind) {
            terminal.on_transition(state);
        }
    }

    /// Load address-bar input in a browser pane. Returns the URL now loaded.
    pub fn navigate(&mut self, id: PaneId, input: &str) -> Option<String> {
        let nav = self.pane_mut(id)?.navigation_mut()?;
        let url = nav.navigate(input)?.to_string();
        debug!(pane = %id, %url, "navigated");
        Some(url)
    }

    /// Re-request the current page of a browser pane.
    pub fn reload(&mut self, id: PaneId) -> bool {
        match self.pane_mut(id).and_then(|p| p.navigation_mut()) {
            Some(nav) => {
                nav.reload();
                debug!(pane = %id, url = %nav.url(), "reloaded");
                true
            }
            None => false,
        }
    }
}
