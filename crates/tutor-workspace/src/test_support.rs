//! Fakes for the connector seam.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tutor_bridge::{
    BridgeEvent, BridgeEventKind, BridgeEventReceiver, BridgeEventSender, ConnectHandle, Connector,
    Transport,
};
use tutor_common::{BridgeError, EventBus, PaneId};

use crate::registry::{PaneRegistry, RegistryOptions};

/// Transport that records every chunk and counts closes.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closes: Arc<AtomicUsize>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, chunk: Vec<u8>) -> Result<(), BridgeError> {
        if self.closes() > 0 {
            return Err(BridgeError::Closed);
        }
        self.sent.lock().unwrap().push(chunk);
        Ok(())
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct Dial {
    pane: PaneId,
    endpoint: String,
    events: BridgeEventSender,
    cancelled: Arc<AtomicBool>,
}

/// Connector whose dials stay pending until a test resolves them.
#[derive(Default)]
pub struct FakeConnector {
    dials: Mutex<Vec<Dial>>,
}

impl FakeConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn dial_count(&self) -> usize {
        self.dials.lock().unwrap().len()
    }

    pub fn dialed(&self) -> Vec<PaneId> {
        self.dials.lock().unwrap().iter().map(|d| d.pane).collect()
    }

    pub fn endpoint_for(&self, pane: PaneId) -> Option<String> {
        self.with_dial(pane, |d| d.endpoint.clone())
    }

    pub fn was_cancelled(&self, pane: PaneId) -> bool {
        self.with_dial(pane, |d| d.cancelled.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Complete the dial for `pane` with a fresh recording transport.
    pub fn accept(&self, pane: PaneId) -> RecordingTransport {
        let transport = RecordingTransport::default();
        self.emit(pane, BridgeEventKind::Connected(Box::new(transport.clone())));
        transport
    }

    pub fn fail(&self, pane: PaneId, reason: &str) {
        self.emit(pane, BridgeEventKind::ConnectFailed(reason.to_string()));
    }

    pub fn data(&self, pane: PaneId, bytes: &[u8]) {
        self.emit(pane, BridgeEventKind::Data(bytes.to_vec()));
    }

    pub fn remote_close(&self, pane: PaneId) {
        self.emit(pane, BridgeEventKind::RemoteClosed);
    }

    pub fn transport_error(&self, pane: PaneId, reason: &str) {
        self.emit(pane, BridgeEventKind::TransportError(reason.to_string()));
    }

    fn emit(&self, pane: PaneId, kind: BridgeEventKind) {
        let dials = self.dials.lock().unwrap();
        let dial = dials
            .iter()
            .find(|d| d.pane == pane)
            .unwrap_or_else(|| panic!("no dial for {pane}"));
        dial.events.send(BridgeEvent::new(pane, kind)).unwrap();
    }

    fn with_dial<T>(&self, pane: PaneId, f: impl FnOnce(&Dial) -> T) -> Option<T> {
        self.dials.lock().unwrap().iter().find(|d| d.pane == pane).map(f)
    }
}

impl Connector for FakeConnector {
    fn connect(&self, pane: PaneId, endpoint: &str, events: BridgeEventSender) -> ConnectHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.dials.lock().unwrap().push(Dial {
            pane,
            endpoint: endpoint.to_string(),
            events,
            cancelled: cancelled.clone(),
        });
        ConnectHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

/// A registry wired to a fake connector, with its bus and event receiver.
pub struct Harness {
    pub registry: PaneRegistry,
    pub connector: Arc<FakeConnector>,
    pub bus: EventBus,
    pub bridge_rx: BridgeEventReceiver,
}

impl Harness {
    pub fn new() -> Self {
        let connector = FakeConnector::new();
        let bus = EventBus::new(64);
        let (registry, bridge_rx) =
            PaneRegistry::new(RegistryOptions::default(), connector.clone(), bus.clone());
        Self {
            registry,
            connector,
            bus,
            bridge_rx,
        }
    }

    /// Feed every queued bridge event into the registry.
    pub fn pump(&mut self) {
        while let Ok(event) = self.bridge_rx.try_recv() {
            self.registry.handle_bridge_event(event);
        }
    }
}
