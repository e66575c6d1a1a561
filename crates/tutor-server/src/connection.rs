//! Per-connection handler: spawn a shell, then pump bytes both ways until
//! either side goes away.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::WebSocketStream;
use tutor_common::SessionId;
use tutor_config::{ServerConfig, ShellConfig};

use crate::pty::spawn_shell;
use crate::utf8::Utf8Chunker;

fn close_frame(code: CloseCode, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: Utf8Bytes::from_static(reason),
    }))
}

/// Serve one terminal session on an upgraded websocket.
pub async fn handle_connection(
    mut ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    session: &SessionId,
    server: &ServerConfig,
    shell: &ShellConfig,
) {
    let mut process = match spawn_shell(shell, server) {
        Ok(process) => process,
        Err(e) => {
            tracing::error!(peer = %addr, session = %session, error = %e, "shell spawn failed");
            let _ = ws.send(close_frame(CloseCode::Error, "failed to start shell")).await;
            return;
        }
    };

    let (cols, rows) = process.size();
    tracing::info!(peer = %addr, session = %session, cols, rows, "terminal session started");

    let (mut sink, mut stream) = ws.split();
    let mut chunker = Utf8Chunker::new();

    loop {
        tokio::select! {
            output = process.next_output() => match output {
                Some(bytes) => {
                    let text = chunker.push(&bytes);
                    if text.is_empty() {
                        continue;
                    }
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => {
                    tracing::info!(session = %session, "shell exited");
                    if let Some(rest) = chunker.finish() {
                        let _ = sink.send(Message::Text(rest.into())).await;
                    }
                    let _ = sink.send(close_frame(CloseCode::Normal, "shell exited")).await;
                    break;
                }
            },

            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = process.write_input(text.as_bytes()) {
                        tracing::warn!(session = %session, error = %e, "PTY input failed");
                        break;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => {
                    if let Err(e) = process.write_input(&bytes) {
                        tracing::warn!(session = %session, error = %e, "PTY input failed");
                        break;
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = sink.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(peer = %addr, error = %e, "WS error");
                    break;
                }
                _ => {}
            }
        }
    }

    process.kill();
    tracing::info!(peer = %addr, session = %session, "terminal session ended");
}
