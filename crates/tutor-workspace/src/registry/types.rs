//! Core types and constructors for PaneRegistry.

use std::sync::Arc;

use tutor_bridge::{bridge_channel, BridgeEventReceiver, BridgeEventSender, Connector};
use tutor_common::{EventBus, PaneId, PaneKind};
use tutor_config::TutorConfig;

use crate::pane::{Pane, SinkFactory};

/// Per-workspace settings the registry needs when it builds panes.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Endpoint every terminal pane dials.
    pub endpoint: String,
    /// URL for browser panes created without one.
    pub home_url: String,
    pub scrollback_bytes: usize,
}

impl RegistryOptions {
    pub fn from_config(config: &TutorConfig) -> Self {
        Self {
            endpoint: config.terminal.endpoint.clone(),
            home_url: config.browser.home_url.clone(),
            scrollback_bytes: config.terminal.scrollback_bytes,
        }
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self::from_config(&TutorConfig::default())
    }
}

/// Ordered set of panes plus the active-pane pointer.
///
/// Panes are kept in creation order, which is also display order. When the
/// registry is non-empty `active` always names a member; when it is empty
/// `active` is `None`.
pub struct PaneRegistry {
    pub(super) panes: Vec<Pane>,
    pub(super) active: Option<PaneId>,
    /// Next id to hand out. Ids are never reused.
    pub(super) next_id: u32,
    pub(super) options: RegistryOptions,
    pub(super) connector: Arc<dyn Connector>,
    pub(super) observer: Option<SinkFactory>,
    pub(super) bridge_tx: BridgeEventSender,
    pub(super) bus: EventBus,
}

impl PaneRegistry {
    /// Create an empty registry. Bridge events for its panes arrive on the
    /// returned receiver and must be fed back through
    /// [`handle_bridge_event`](Self::handle_bridge_event).
    pub fn new(
        options: RegistryOptions,
        connector: Arc<dyn Connector>,
        bus: EventBus,
    ) -> (Self, BridgeEventReceiver) {
        let (bridge_tx, bridge_rx) = bridge_channel();
        let registry = Self {
            panes: Vec::new(),
            active: None,
            next_id: 1,
            options,
            connector,
            observer: None,
            bridge_tx,
            bus,
        };
        (registry, bridge_rx)
    }

    /// Mirror output of terminal panes created from now on into sinks built
    /// by `factory`.
    pub fn set_output_observer(&mut self, factory: SinkFactory) {
        self.observer = Some(factory);
    }

    // -- Accessors --

    pub fn active_id(&self) -> Option<PaneId> {
        self.active
    }

    pub fn active(&self) -> Option<&Pane> {
        self.active.and_then(|id| self.pane(id))
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn contains(&self, id: PaneId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.iter().find(|p| p.id == id)
    }

    pub(crate) fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|p| p.id == id)
    }

    /// Panes in display order.
    pub fn panes(&self) -> impl Iterator<Item = &Pane> {
        self.panes.iter()
    }

    pub fn ids(&self) -> Vec<PaneId> {
        self.panes.iter().map(|p| p.id).collect()
    }

    /// Most recently created pane of `kind`.
    pub fn find_pane_by_kind(&self, kind: PaneKind) -> Option<PaneId> {
        self.panes.iter().rev().find(|p| p.kind == kind).map(|p| p.id)
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub(super) fn index_of(&self, id: PaneId) -> Option<usize> {
        self.panes.iter().position(|p| p.id == id)
    }
}

impl Drop for PaneRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
