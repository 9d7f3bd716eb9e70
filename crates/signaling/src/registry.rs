//! Connection identity and the live-connection registry.
//!
//! A [`ConnectionId`] is minted by the transport when a socket is accepted
//! and is the single identity value threaded through the queue, the session
//! table, and the registry. Ids are never reused.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// Opaque identifier for one live client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Mint a fresh connection id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Tracks every currently-connected client and its outbound event sender.
///
/// Existence tracking only: the registry has no opinion on whether a
/// connection is queued, sessioned, or idle.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection with its outbound sender
    pub fn insert(&mut self, id: ConnectionId, tx: mpsc::Sender<ServerEvent>) {
        self.connections.insert(id, tx);
    }

    /// Remove a connection; returns false if it was not registered
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Whether the connection is currently registered
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connections are registered
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Best-effort delivery of an event to a connection.
    ///
    /// Delivery is non-blocking: a full or closed channel means the
    /// connection is gone or hopelessly behind, and the event is dropped
    /// with a warning rather than stalling the event loop.
    pub fn notify(&self, id: ConnectionId, event: ServerEvent) {
        let Some(tx) = self.connections.get(&id) else {
            warn!(connection_id = %id, "dropping event for unregistered connection");
            return;
        };
        if let Err(e) = tx.try_send(event) {
            warn!(connection_id = %id, error = %e, "failed to deliver event");
        }
    }
}
