//! The seam between a bridge and the network: connectors dial, transports
//! carry bytes, and everything asynchronous comes back as a `BridgeEvent`.

use std::fmt;

use tokio::sync::mpsc;
use tutor_common::{BridgeError, PaneId};

/// Outbound half of an established connection.
pub trait Transport: Send {
    /// Queue one chunk for the remote. Never blocks.
    fn send(&mut self, chunk: Vec<u8>) -> Result<(), BridgeError>;

    /// Release the connection. Called at most once per transport.
    fn close(&mut self);
}

/// Issues dials on behalf of bridges.
///
/// Implementations must not call back into the bridge directly; every
/// outcome is reported through `events`, tagged with `pane`.
pub trait Connector: Send + Sync {
    fn connect(&self, pane: PaneId, endpoint: &str, events: BridgeEventSender) -> ConnectHandle;
}

/// Cancels an in-flight dial.
pub struct ConnectHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ConnectHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for ConnectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectHandle")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// Something that happened on a pane's stream.
pub struct BridgeEvent {
    pub pane: PaneId,
    pub kind: BridgeEventKind,
}

pub enum BridgeEventKind {
    /// Dial succeeded; the transport is the last-known-good connection.
    Connected(Box<dyn Transport>),
    ConnectFailed(String),
    /// Bytes from the remote, in arrival order.
    Data(Vec<u8>),
    TransportError(String),
    RemoteClosed,
}

impl BridgeEvent {
    pub fn new(pane: PaneId, kind: BridgeEventKind) -> Self {
        Self { pane, kind }
    }
}

impl fmt::Debug for BridgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeEvent")
            .field("pane", &self.pane)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Debug for BridgeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeEventKind::Connected(_) => f.write_str("Connected"),
            BridgeEventKind::ConnectFailed(reason) => {
                f.debug_tuple("ConnectFailed").field(reason).finish()
            }
            BridgeEventKind::Data(bytes) => write!(f, "Data({} bytes)", bytes.len()),
            BridgeEventKind::TransportError(reason) => {
                f.debug_tuple("TransportError").field(reason).finish()
            }
            BridgeEventKind::RemoteClosed => f.write_str("RemoteClosed"),
        }
    }
}

pub type BridgeEventSender = mpsc::UnboundedSender<BridgeEvent>;
pub type BridgeEventReceiver = mpsc::UnboundedReceiver<BridgeEvent>;

/// Channel that carries bridge events back to the owning task.
pub fn bridge_channel() -> (BridgeEventSender, BridgeEventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn cancel_runs_callback_once() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = ConnectHandle::new(move || flag.store(true, Ordering::SeqCst));
        handle.cancel();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn detached_cancel_is_noop() {
        ConnectHandle::detached().cancel();
    }

    #[test]
    fn events_keep_channel_order() {
        let (tx, mut rx) = bridge_channel();
        tx.send(BridgeEvent::new(PaneId(1), BridgeEventKind::Data(b"a".to_vec())))
            .unwrap();
        tx.send(BridgeEvent::new(PaneId(1), BridgeEventKind::Data(b"b".to_vec())))
            .unwrap();
        tx.send(BridgeEvent::new(PaneId(1), BridgeEventKind::RemoteClosed))
            .unwrap();

        let first = rx.try_recv().unwrap();
        assert!(matches!(first.kind, BridgeEventKind::Data(ref b) if b == b"a"));
        let second = rx.try_recv().unwrap();
        assert!(matches!(second.kind, BridgeEventKind::Data(ref b) if b == b"b"));
        let third = rx.try_recv().unwrap();
        assert!(matches!(third.kind, BridgeEventKind::RemoteClosed));
    }

    #[test]
    fn debug_hides_payloads() {
        let event = BridgeEvent::new(PaneId(2), BridgeEventKind::Data(vec![0; 10]));
        assert_eq!(
            format!("{event:?}"),
            "BridgeEvent { pane: PaneId(2), kind: Data(10 bytes) }"
        );
    }
}
