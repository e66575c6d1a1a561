//! Process-wide typed event bus.
//!
//! Any component may publish or subscribe. The bus has two lanes: commands
//! (`RunCommand`, `OpenUrl`, `PaneInput`, `Shutdown`) flow towards the
//! workspace, and pane lifecycle notifications flow out of it for whoever
//! renders the tab strip. `publish` picks the lane, so a burst of
//! notifications can never push an unread command out of a receiver.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::PaneId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// Run a shell command in a terminal pane. Payload is the literal
    /// command text, without a line terminator.
    RunCommand(String),
    /// Open an absolute URL in a new browser pane.
    OpenUrl(String),
    /// Raw input for a terminal pane; `None` targets the active pane.
    PaneInput { pane: Option<PaneId>, data: Vec<u8> },
    PaneOpened(PaneId),
    PaneClosed(PaneId),
    ActivePaneChanged(Option<PaneId>),
    Shutdown,
    #[serde(other)]
    Unknown,
}

impl Event {
    /// Whether this event asks the workspace to do something, as opposed to
    /// reporting something the workspace already did.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Event::RunCommand(_) | Event::OpenUrl(_) | Event::PaneInput { .. } | Event::Shutdown
        )
    }
}

#[derive(Clone)]
pub struct EventBus {
    commands: broadcast::Sender<Event>,
    notifications: broadcast::Sender<Event>,
}

impl EventBus {
    /// `capacity` applies to each lane.
    pub fn new(capacity: usize) -> Self {
        let (commands, _) = broadcast::channel(capacity);
        let (notifications, _) = broadcast::channel(capacity);
        Self {
            commands,
            notifications,
        }
    }

    /// Receiver for events where [`Event::is_command`] holds.
    pub fn subscribe_commands(&self) -> broadcast::Receiver<Event> {
        self.commands.subscribe()
    }

    /// Receiver for lifecycle notifications and anything unrecognised.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Event> {
        self.notifications.subscribe()
    }

    /// Send on the event's lane. Returns how many receivers it reached.
    pub fn publish(&self, event: Event) -> usize {
        let lane = if event.is_command() {
            &self.commands
        } else {
            &self.notifications
        };
        lane.send(event).unwrap_or(0)
    }
}
