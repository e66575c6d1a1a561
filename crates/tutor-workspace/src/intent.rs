use tokio::sync::{mpsc, oneshot};
use tutor_common::{Event, EventBus, PaneId, PaneKind};

use crate::view::WorkspaceSnapshot;

/// User-driven requests from whatever renders the tab strip.
#[derive(Debug)]
pub enum ShellIntent {
    Create {
        kind: PaneKind,
        title: Option<String>,
    },
    Close(PaneId),
    Activate(PaneId),
    Navigate {
        pane: PaneId,
        input: String,
    },
    Reload(PaneId),
    Snapshot(oneshot::Sender<WorkspaceSnapshot>),
    Quit,
}

/// Cloneable handle for driving a mounted workspace from other tasks.
#[derive(Clone)]
pub struct ShellHandle {
    intents: mpsc::UnboundedSender<ShellIntent>,
    bus: EventBus,
}

impl ShellHandle {
    pub(crate) fn new(intents: mpsc::UnboundedSender<ShellIntent>, bus: EventBus) -> Self {
        Self { intents, bus }
    }

    /// Send an intent. Returns false once the workspace has unmounted.
    pub fn send(&self, intent: ShellIntent) -> bool {
        self.intents.send(intent).is_ok()
    }

    pub fn create(&self, kind: PaneKind, title: Option<String>) -> bool {
        self.send(ShellIntent::Create { kind, title })
    }

    pub fn close(&self, pane: PaneId) -> bool {
        self.send(ShellIntent::Close(pane))
    }

    pub fn activate(&self, pane: PaneId) -> bool {
        self.send(ShellIntent::Activate(pane))
    }

    pub fn navigate(&self, pane: PaneId, input: impl Into<String>) -> bool {
        self.send(ShellIntent::Navigate {
            pane,
            input: input.into(),
        })
    }

    pub fn reload(&self, pane: PaneId) -> bool {
        self.send(ShellIntent::Reload(pane))
    }

    pub fn quit(&self) -> bool {
        self.send(ShellIntent::Quit)
    }

    /// Ask the workspace for a snapshot. `None` if it has gone away.
    pub async fn snapshot(&self) -> Option<WorkspaceSnapshot> {
        let (tx, rx) = oneshot::channel();
        if !self.send(ShellIntent::Snapshot(tx)) {
            return None;
        }
        rx.await.ok()
    }

    /// The bus the workspace listens on, for publishing commands.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn publish(&self, event: Event) -> usize {
        self.bus.publish(event)
    }
}
