//! WebSocket connector: dials the terminal endpoint and pumps frames between
//! the socket and the bridge event channel.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tutor_common::{BridgeError, PaneId};

use crate::transport::{
    BridgeEvent, BridgeEventKind, BridgeEventSender, ConnectHandle, Connector, Transport,
};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Dials `ws://` / `wss://` endpoints on the ambient tokio runtime.
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Connector for WsConnector {
    fn connect(&self, pane: PaneId, endpoint: &str, events: BridgeEventSender) -> ConnectHandle {
        let Ok(runtime) = Handle::try_current() else {
            let _ = events.send(BridgeEvent::new(
                pane,
                BridgeEventKind::ConnectFailed("no async runtime to dial on".into()),
            ));
            return ConnectHandle::detached();
        };

        let task = runtime.spawn(run_connection(
            pane,
            endpoint.to_string(),
            self.connect_timeout,
            events,
        ));
        let abort = task.abort_handle();
        ConnectHandle::new(move || abort.abort())
    }
}

enum Outbound {
    Data(Vec<u8>),
    Close,
}

/// Outbound half handed to the bridge. Frames are queued to the connection
/// task, so `send` never blocks the caller.
struct WsTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Transport for WsTransport {
    fn send(&mut self, chunk: Vec<u8>) -> Result<(), BridgeError> {
        self.outbound
            .send(Outbound::Data(chunk))
            .map_err(|_| BridgeError::Closed)
    }

    fn close(&mut self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

fn encode(chunk: Vec<u8>) -> Message {
    match String::from_utf8(chunk) {
        Ok(text) => Message::Text(text.into()),
        Err(e) => Message::Binary(e.into_bytes().into()),
    }
}

async fn run_connection(
    pane: PaneId,
    endpoint: String,
    connect_timeout: Duration,
    events: BridgeEventSender,
) {
    let fail = |reason: String| {
        let _ = events.send(BridgeEvent::new(pane, BridgeEventKind::ConnectFailed(reason)));
    };

    let ws = match tokio::time::timeout(connect_timeout, connect_async(endpoint.as_str())).await {
        Ok(Ok((ws, _response))) => ws,
        Ok(Err(e)) => {
            tracing::warn!(%pane, %endpoint, error = %e, "terminal dial failed");
            fail(e.to_string());
            return;
        }
        Err(_) => {
            tracing::warn!(%pane, %endpoint, "terminal dial timed out");
            fail(format!("timed out after {}s", connect_timeout.as_secs()));
            return;
        }
    };

    tracing::info!(%pane, %endpoint, "terminal stream connected");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let transport = WsTransport {
        outbound: outbound_tx,
    };
    if events
        .send(BridgeEvent::new(
            pane,
            BridgeEventKind::Connected(Box::new(transport)),
        ))
        .is_err()
    {
        return;
    }

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(Outbound::Data(chunk)) => {
                    if let Err(e) = sink.send(encode(chunk)).await {
                        let _ = events.send(BridgeEvent::new(
                            pane,
                            BridgeEventKind::TransportError(e.to_string()),
                        ));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    tracing::debug!(%pane, "closing terminal stream");
                    let _ = sink.close().await;
                    break;
                }
            },

            frame = stream.next() => {
                let kind = match frame {
                    Some(Ok(Message::Text(text))) => BridgeEventKind::Data(text.as_bytes().to_vec()),
                    Some(Ok(Message::Binary(bytes))) => BridgeEventKind::Data(bytes.to_vec()),
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(%pane, "terminal stream closed by remote");
                        let _ = events.send(BridgeEvent::new(pane, BridgeEventKind::RemoteClosed));
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::warn!(%pane, error = %e, "terminal stream error");
                        let _ = events.send(BridgeEvent::new(
                            pane,
                            BridgeEventKind::TransportError(e.to_string()),
                        ));
                        break;
                    }
                };
                if events.send(BridgeEvent::new(pane, kind)).is_err() {
                    break;
                }
            }
        }
    }
}
