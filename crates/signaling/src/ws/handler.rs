//! Per-connection WebSocket handling.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::config::SignalingConfig;
use crate::error::ServerError;
use crate::protocol::{ClientEvent, SignalPayload};
use crate::registry::ConnectionId;
use crate::switchboard::Switchboard;

/// Outbound events buffered per connection before delivery degrades
const OUTBOUND_BUFFER: usize = 128;

/// Handle a single WebSocket connection from handshake to cleanup.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<SignalingConfig>,
    switchboard: Arc<Switchboard>,
) -> Result<(), ServerError> {
    let ws_stream = accept_hdr_async(stream, |request: &Request, response: Response| {
        let origin = request
            .headers()
            .get("origin")
            .and_then(|value| value.to_str().ok());
        if config.origin_allowed(origin) {
            Ok(response)
        } else {
            warn!(
                addr = %peer_addr,
                origin = origin.unwrap_or("<none>"),
                "rejecting cross-origin handshake"
            );
            let mut rejection = ErrorResponse::new(None);
            *rejection.status_mut() = StatusCode::FORBIDDEN;
            Err(rejection)
        }
    })
    .await?;

    let id = ConnectionId::new();
    info!(connection_id = %id, addr = %peer_addr, "WebSocket connection established");

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel(OUTBOUND_BUFFER);
    switchboard.connect(id, tx).await;

    // Writer task: drains the outbound channel into the socket.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!(connection_id = %id, error = %e, "failed to encode event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = ws_rx.next().await {
        match message {
            Ok(Message::Text(text)) => dispatch(&text, id, &switchboard).await,
            Ok(Message::Close(_)) => {
                debug!(connection_id = %id, "close frame received");
                break;
            }
            // Pings are answered by the WebSocket layer; binary frames are
            // not part of the protocol.
            Ok(_) => {}
            Err(e) => {
                debug!(connection_id = %id, error = %e, "WebSocket read error");
                break;
            }
        }
    }

    info!(connection_id = %id, addr = %peer_addr, "connection closed, cleaning up");
    switchboard.disconnect(id).await;
    writer.abort();

    Ok(())
}

/// Parse one inbound frame and hand it to the switchboard. Malformed
/// frames and relay failures are logged and dropped; nothing here is
/// fatal to the connection.
async fn dispatch(text: &str, id: ConnectionId, switchboard: &Switchboard) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!(connection_id = %id, error = %e, "dropping malformed frame");
            return;
        }
    };

    match event {
        ClientEvent::JoinQueue => switchboard.join_queue(id).await,
        ClientEvent::LeaveQueue => switchboard.leave_queue(id).await,
        ClientEvent::SignalOffer { session_id, offer } => {
            let _ = switchboard
                .relay(session_id, id, SignalPayload::Offer(offer))
                .await;
        }
        ClientEvent::SignalAnswer { session_id, answer } => {
            let _ = switchboard
                .relay(session_id, id, SignalPayload::Answer(answer))
                .await;
        }
        ClientEvent::SignalCandidate {
            session_id,
            candidate,
        } => {
            let _ = switchboard
                .relay(session_id, id, SignalPayload::Candidate(candidate))
                .await;
        }
    }
}
