//! Error types for the signaling relay.

use thiserror::Error;

use crate::registry::ConnectionId;
use crate::relay::SessionId;

/// Result type alias for transport and bootstrap operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors surfaced by the WebSocket transport and server bootstrap
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listening socket
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error while accepting or serving a connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Relay lookup failures.
///
/// These are per-event and locally absorbed: the event loop logs them at
/// diagnostic level and drops the message. Nothing here is fatal and no
/// hard failure is propagated back to the client.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RelayError {
    /// The referenced session is absent from the session table (already
    /// torn down, or never existed)
    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    /// The sender is not one of the session's two participants
    #[error("connection {from} is not a participant of session {session}")]
    NotAParticipant {
        /// Session the message referenced
        session: SessionId,
        /// Connection that sent the message
        from: ConnectionId,
    },
}
