//! Accept loop: upgrade connections on the terminal path and hand each one
//! its own session.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::SinkExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tutor_config::{ServerConfig, ShellConfig};

use crate::connection::handle_connection;
use crate::session::SessionStore;

/// Everything a connection needs, shared across the accept loop.
pub struct ServerContext {
    pub server: ServerConfig,
    pub shell: ShellConfig,
    pub store: SessionStore,
}

impl ServerContext {
    pub fn new(server: ServerConfig, shell: ShellConfig) -> Self {
        let store = SessionStore::new(server.max_sessions as usize);
        Self {
            server,
            shell,
            store,
        }
    }
}

/// Reject upgrades on any path other than `expected`.
fn check_path(expected: &str, req: &Request, resp: Response) -> Result<Response, ErrorResponse> {
    if req.uri().path() == expected {
        return Ok(resp);
    }
    let mut err = ErrorResponse::new(Some(format!("no terminal endpoint at {}", req.uri().path())));
    *err.status_mut() = StatusCode::NOT_FOUND;
    Err(err)
}

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let ctx = ctx.clone();
                tokio::spawn(async move { accept(stream, addr, ctx).await });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

async fn accept(stream: TcpStream, addr: SocketAddr, ctx: Arc<ServerContext>) {
    let path = ctx.server.path.clone();
    let callback = move |req: &Request, resp: Response| check_path(&path, req, resp);
    let mut ws = match accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
            return;
        }
    };

    let Some(session) = ctx.store.open(addr).await else {
        let live = ctx.store.peers().await;
        tracing::warn!(
            peer = %addr,
            max = ctx.store.max_sessions(),
            live = ?live,
            "session limit reached, refusing"
        );
        let _ = ws
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Again,
                reason: Utf8Bytes::from_static("too many sessions"),
            })))
            .await;
        return;
    };

    handle_connection(ws, addr, &session, &ctx.server, &ctx.shell).await;

    if let Some(lived) = ctx.store.close(&session).await {
        tracing::debug!(session = %session, secs = lived.as_secs(), "session released");
    }
}
