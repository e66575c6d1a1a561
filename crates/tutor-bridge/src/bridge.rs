//! Per-pane stream bridge state machine.

use tracing::{debug, trace, warn};
use tutor_common::{BridgeError, PaneId};

use crate::sink::DisplaySink;
use crate::state::BridgeState;
use crate::transport::{BridgeEventKind, BridgeEventSender, ConnectHandle, Connector, Transport};

/// Written to the sink when the stream opens.
pub(crate) const CONNECTED_BANNER: &[u8] =
    b"\x1b[32mConnected to terminal backend...\x1b[0m\r\n\r\n";

/// Written to the sink when the remote hangs up.
pub(crate) const CONNECTION_CLOSED: &[u8] = b"\r\n\x1b[31mConnection closed.\x1b[0m\r\n";

fn connect_error_diagnostic(reason: &str) -> Vec<u8> {
    format!("\r\n\x1b[31mConnection Error (Is backend running?).\x1b[0m\r\n{reason}\r\n").into_bytes()
}

fn transport_error_diagnostic(reason: &str) -> Vec<u8> {
    format!("\r\n\x1b[31mConnection Error.\x1b[0m\r\n{reason}\r\n").into_bytes()
}

/// What happened to a chunk passed to [`StreamBridge::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Handed to the transport.
    Forwarded,
    /// The stream is still connecting; raw input is not queued.
    DroppedWhileConnecting,
    /// The stream has errored or closed.
    Discarded,
}

/// One terminal pane's connection to the remote shell.
///
/// Starts in `Connecting`. Failures become inline diagnostics on the sink and
/// an `Error` state; nothing here returns an error to the caller.
pub struct StreamBridge {
    pane: PaneId,
    endpoint: String,
    state: BridgeState,
    dialed: bool,
    /// In-flight dial, cancelled if the bridge closes before it resolves.
    dial: Option<ConnectHandle>,
    /// Last-known-good connection, present only while `Open`.
    transport: Option<Box<dyn Transport>>,
    sink: Box<dyn DisplaySink>,
}

impl StreamBridge {
    pub fn new(pane: PaneId, endpoint: impl Into<String>, sink: Box<dyn DisplaySink>) -> Self {
        Self {
            pane,
            endpoint: endpoint.into(),
            state: BridgeState::Connecting,
            dialed: false,
            dial: None,
            transport: None,
            sink,
        }
    }

    pub fn pane(&self) -> PaneId {
        self.pane
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Issue the dial. Only the first call on a `Connecting` bridge does
    /// anything.
    pub fn open(&mut self, connector: &dyn Connector, events: &BridgeEventSender) {
        if self.state != BridgeState::Connecting || self.dialed {
            debug!(pane = %self.pane, state = %self.state, "open ignored");
            return;
        }
        self.dialed = true;
        debug!(pane = %self.pane, endpoint = %self.endpoint, "dialing terminal endpoint");
        self.dial = Some(connector.connect(self.pane, &self.endpoint, events.clone()));
    }

    /// Forward one input chunk. Chunks are never merged or reordered.
    pub fn write(&mut self, bytes: &[u8]) -> WriteOutcome {
        match self.state {
            BridgeState::Connecting => {
                debug!(pane = %self.pane, len = bytes.len(), "dropping input while connecting");
                WriteOutcome::DroppedWhileConnecting
            }
            BridgeState::Open => {
                let Some(transport) = self.transport.as_mut() else {
                    return WriteOutcome::Discarded;
                };
                match transport.send(bytes.to_vec()) {
                    Ok(()) => WriteOutcome::Forwarded,
                    Err(e) => {
                        self.fail(e);
                        WriteOutcome::Discarded
                    }
                }
            }
            BridgeState::Error | BridgeState::Closed => {
                trace!(pane = %self.pane, state = %self.state, "discarding input");
                WriteOutcome::Discarded
            }
        }
    }

    /// Close the bridge from this side. Idempotent: the dial is cancelled or
    /// the transport released at most once.
    pub fn close(&mut self) {
        if self.state == BridgeState::Closed {
            return;
        }
        if let Some(dial) = self.dial.take() {
            debug!(pane = %self.pane, "cancelling in-flight dial");
            dial.cancel();
        }
        self.release_transport();
        self.transition(BridgeState::Closed);
    }

    /// Apply an asynchronous stream event. Returns the new state when the
    /// event caused a transition.
    pub fn handle_event(&mut self, kind: BridgeEventKind) -> Option<BridgeState> {
        let before = self.state;
        match kind {
            BridgeEventKind::Connected(mut transport) => {
                if self.state != BridgeState::Connecting {
                    debug!(pane = %self.pane, state = %self.state, "late connect ack, releasing");
                    transport.close();
                    return None;
                }
                self.dial = None;
                self.transport = Some(transport);
                self.sink.write(CONNECTED_BANNER);
                self.transition(BridgeState::Open);
            }
            BridgeEventKind::ConnectFailed(reason) => {
                if self.state != BridgeState::Connecting {
                    return None;
                }
                self.dial = None;
                warn!(pane = %self.pane, endpoint = %self.endpoint, %reason, "connect failed");
                self.sink.write(&connect_error_diagnostic(&reason));
                self.transition(BridgeState::Error);
            }
            BridgeEventKind::Data(bytes) => {
                if self.state == BridgeState::Open {
                    self.sink.write(&bytes);
                } else {
                    trace!(pane = %self.pane, len = bytes.len(), "discarding output");
                }
            }
            BridgeEventKind::TransportError(reason) => {
                if self.state == BridgeState::Open {
                    self.fail(BridgeError::Transport(reason));
                }
            }
            BridgeEventKind::RemoteClosed => {
                if self.state == BridgeState::Open {
                    self.release_transport();
                    self.sink.write(CONNECTION_CLOSED);
                    self.transition(BridgeState::Closed);
                }
            }
        }
        (self.state != before).then_some(self.state)
    }

    fn fail(&mut self, err: BridgeError) {
        warn!(pane = %self.pane, error = %err, "stream failed");
        self.release_transport();
        let reason = match &err {
            BridgeError::Transport(reason) | BridgeError::Connect(reason) => reason.clone(),
            BridgeError::Closed => err.to_string(),
        };
        self.sink.write(&transport_error_diagnostic(&reason));
        self.transition(BridgeState::Error);
    }

    fn release_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    fn transition(&mut self, next: BridgeState) {
        if self.state == next {
            return;
        }
        debug!(pane = %self.pane, from = %self.state, to = %next, "bridge state changed");
        self.state = next;
        self.sink.state_changed(next);
    }
}

impl Drop for StreamBridge {
    fn drop(&mut self) {
        self.close();
    }
}
