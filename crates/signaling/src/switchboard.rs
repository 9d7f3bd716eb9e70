//! Single-owner coordination of the registry, queue, and session table.
//!
//! All mutable state lives behind one lock so every event (join, leave,
//! relay, disconnect) executes atomically with respect to the others, the
//! same guarantee a single-threaded event loop would give. A connection is
//! therefore always in exactly one of three states: waiting, sessioned, or
//! idle.

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::error::RelayError;
use crate::matchmaker::{EnqueueOutcome, Matchmaker, PairingPolicy};
use crate::protocol::{ServerEvent, SignalPayload};
use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::relay::{SessionId, SessionTable};

struct Inner {
    registry: ConnectionRegistry,
    matchmaker: Matchmaker,
    sessions: SessionTable,
}

/// The event-processing core of the signaling server.
///
/// Connection tasks share a `Switchboard` via `Arc` and call into it for
/// every client event; notifications to clients go out through the
/// per-connection senders held by the registry.
pub struct Switchboard {
    inner: Mutex<Inner>,
}

impl Switchboard {
    /// Create a switchboard with the default deterministic FIFO pairing
    pub fn new() -> Self {
        Self::with_matchmaker(Matchmaker::fifo())
    }

    /// Create a switchboard with a custom pairing policy
    pub fn with_policy(policy: Box<dyn PairingPolicy>) -> Self {
        Self::with_matchmaker(Matchmaker::new(policy))
    }

    fn with_matchmaker(matchmaker: Matchmaker) -> Self {
        Self {
            inner: Mutex::new(Inner {
                registry: ConnectionRegistry::new(),
                matchmaker,
                sessions: SessionTable::new(),
            }),
        }
    }

    /// Register a newly accepted connection and its outbound sender
    pub async fn connect(&self, id: ConnectionId, tx: mpsc::Sender<ServerEvent>) {
        let mut inner = self.inner.lock().await;
        inner.registry.insert(id, tx);
        debug!(connection_id = %id, connections = inner.registry.len(), "connection registered");
    }

    /// Handle a join-queue request: pair with the earliest waiter or wait.
    ///
    /// No-op for connections that are unregistered, already waiting, or
    /// already in a live session.
    pub async fn join_queue(&self, id: ConnectionId) {
        let mut inner = self.inner.lock().await;
        if !inner.registry.contains(id) {
            debug!(connection_id = %id, "join from unregistered connection ignored");
            return;
        }
        if inner.sessions.contains_participant(id) {
            debug!(connection_id = %id, "join ignored, already in a session");
            return;
        }

        match inner.matchmaker.enqueue(id) {
            EnqueueOutcome::AlreadyWaiting => {
                debug!(connection_id = %id, "join ignored, already waiting");
            }
            EnqueueOutcome::Queued => {
                debug!(connection_id = %id, waiting = inner.matchmaker.len(), "queued");
            }
            EnqueueOutcome::Matched { partner } => {
                let session_id = inner.sessions.create(id, partner);
                info!(
                    session_id = %session_id,
                    a = %id,
                    b = %partner,
                    "session created"
                );
                inner
                    .registry
                    .notify(partner, ServerEvent::SessionCreated { session_id });
                inner
                    .registry
                    .notify(id, ServerEvent::SessionCreated { session_id });
            }
        }
    }

    /// Handle an explicit leave-queue request. Idempotent; does not touch
    /// live sessions.
    pub async fn leave_queue(&self, id: ConnectionId) {
        let mut inner = self.inner.lock().await;
        if inner.matchmaker.dequeue(id) {
            debug!(connection_id = %id, "left the queue");
        }
    }

    /// Forward a signaling payload to the sender's session peer.
    ///
    /// The payload is delivered unmodified, tagged with the sender's id,
    /// and never echoed back to the sender. Lookup failures are returned
    /// for the caller to absorb; they are logged here and carry no further
    /// consequence.
    pub async fn relay(
        &self,
        session_id: SessionId,
        from: ConnectionId,
        payload: SignalPayload,
    ) -> Result<(), RelayError> {
        let inner = self.inner.lock().await;
        let to = match inner.sessions.route(session_id, from) {
            Ok(to) => to,
            Err(e) => {
                debug!(
                    session_id = %session_id,
                    from = %from,
                    kind = payload.kind(),
                    error = %e,
                    "dropping signaling message"
                );
                return Err(e);
            }
        };
        debug!(
            session_id = %session_id,
            from = %from,
            to = %to,
            kind = payload.kind(),
            "forwarding signaling message"
        );
        inner.registry.notify(to, payload.into_event(from));
        Ok(())
    }

    /// Handle a disconnect: deregister, leave the queue, and tear down the
    /// at-most-one session containing `id`, notifying the remaining peer.
    ///
    /// A connection is never both queued and sessioned, so at most one of
    /// the two cleanups has an effect.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut inner = self.inner.lock().await;
        inner.registry.remove(id);
        inner.matchmaker.dequeue(id);
        if let Some((session_id, peer)) = inner.sessions.remove_participant(id) {
            info!(
                session_id = %session_id,
                disconnected = %id,
                peer = %peer,
                "session torn down"
            );
            inner.registry.notify(peer, ServerEvent::PeerDisconnected);
        }
        debug!(connection_id = %id, connections = inner.registry.len(), "connection removed");
    }

    /// Number of registered connections
    pub async fn connection_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    /// Number of waiting connections
    pub async fn queue_len(&self) -> usize {
        self.inner.lock().await.matchmaker.len()
    }

    /// Whether `id` is currently waiting for a match
    pub async fn is_queued(&self, id: ConnectionId) -> bool {
        self.inner.lock().await.matchmaker.contains(id)
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    /// Whether `id` participates in any live session
    pub async fn in_session(&self, id: ConnectionId) -> bool {
        self.inner.lock().await.sessions.contains_participant(id)
    }
}

impl Default for Switchboard {
    fn default() -> Self {
        Self::new()
    }
}
