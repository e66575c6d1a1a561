//! Console rendering: only the active pane's output reaches the terminal.

use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tutor_bridge::{BridgeState, DisplaySink};
use tutor_common::{Event, PaneId};

/// Shared view of which pane is active. Pane ids start at 1, so 0 means none.
#[derive(Clone, Default)]
pub struct ActivePane(Arc<AtomicU32>);

impl ActivePane {
    pub fn set(&self, pane: Option<PaneId>) {
        self.0.store(pane.map_or(0, |p| p.0), Ordering::SeqCst);
    }

    pub fn get(&self) -> Option<PaneId> {
        match self.0.load(Ordering::SeqCst) {
            0 => None,
            id => Some(PaneId(id)),
        }
    }

    pub fn is(&self, pane: PaneId) -> bool {
        self.get() == Some(pane)
    }
}

/// Follow `ActivePaneChanged` on the bus until it closes.
pub async fn track_active(mut events: broadcast::Receiver<Event>, active: ActivePane) {
    loop {
        match events.recv().await {
            Ok(Event::ActivePaneChanged(pane)) => active.set(pane),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "console lagged behind event bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Print one line of console chrome (help, tab strip, errors).
pub fn print_line<W: Write>(out: &Mutex<W>, text: &str) {
    let mut out = out.lock().unwrap_or_else(|e| e.into_inner());
    let _ = writeln!(out, "{text}").and_then(|_| out.flush());
}

/// Display sink for one terminal pane that writes through to a shared
/// output only while that pane is active.
pub struct ConsoleSink<W: Write + Send + 'static> {
    pane: PaneId,
    active: ActivePane,
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send + 'static> ConsoleSink<W> {
    pub fn new(pane: PaneId, active: ActivePane, out: Arc<Mutex<W>>) -> Self {
        Self { pane, active, out }
    }
}

impl<W: Write + Send + 'static> DisplaySink for ConsoleSink<W> {
    fn write(&mut self, bytes: &[u8]) {
        if !self.active.is(self.pane) {
            return;
        }
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = out.write_all(bytes).and_then(|_| out.flush()) {
            tracing::debug!(pane = %self.pane, error = %e, "console write failed");
        }
    }

    fn state_changed(&mut self, state: BridgeState) {
        tracing::info!(pane = %self.pane, %state, "terminal state changed");
    }
}
