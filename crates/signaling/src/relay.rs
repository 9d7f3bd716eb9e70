//! Session table and relay routing.
//!
//! A session binds exactly two connections for the duration of one
//! negotiation. There is no state machine: a session is created when a
//! pair is formed and destroyed when either participant disconnects.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RelayError;
use crate::registry::ConnectionId;

/// Opaque identifier for a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a fresh session id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Two distinct connections bound together for one negotiation.
/// Participants are immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    participants: [ConnectionId; 2],
}

impl Session {
    fn new(a: ConnectionId, b: ConnectionId) -> Self {
        debug_assert_ne!(a, b, "a session's participants must be distinct");
        Self {
            participants: [a, b],
        }
    }

    /// Both participants, in creation order
    pub fn participants(&self) -> [ConnectionId; 2] {
        self.participants
    }

    /// Whether `id` is one of the two participants
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.participants.contains(&id)
    }

    /// The other participant, if `id` is one of the two
    pub fn peer_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        let [a, b] = self.participants;
        if id == a {
            Some(b)
        } else if id == b {
            Some(a)
        } else {
            None
        }
    }
}

/// Mapping from session id to its two participants.
///
/// Invariant: every connection appears in at most one live session.
/// Upheld by the caller only ever creating a session from two ids that
/// are neither queued nor already sessioned.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<SessionId, Session>,
}

impl SessionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind two connections into a new session and return its fresh id
    pub fn create(&mut self, a: ConnectionId, b: ConnectionId) -> SessionId {
        let session_id = SessionId::new();
        self.sessions.insert(session_id, Session::new(a, b));
        session_id
    }

    /// Look up a session
    pub fn get(&self, session_id: SessionId) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    /// Resolve the forwarding target for a message sent by `from` into
    /// `session_id`: the *other* participant, never the sender.
    pub fn route(&self, session_id: SessionId, from: ConnectionId) -> Result<ConnectionId, RelayError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(RelayError::UnknownSession(session_id))?;
        session
            .peer_of(from)
            .ok_or(RelayError::NotAParticipant {
                session: session_id,
                from,
            })
    }

    /// Tear down the at-most-one session containing `id`.
    ///
    /// Returns the removed session's id and the remaining peer so the
    /// caller can notify it. No-op if `id` is in no session.
    pub fn remove_participant(&mut self, id: ConnectionId) -> Option<(SessionId, ConnectionId)> {
        let found = self.sessions.iter().find_map(|(&session_id, session)| {
            session.peer_of(id).map(|peer| (session_id, peer))
        })?;
        let _ = self.sessions.remove(&found.0);
        Some(found)
    }

    /// Whether `id` participates in any live session
    pub fn contains_participant(&self, id: ConnectionId) -> bool {
        self.sessions.values().any(|session| session.contains(id))
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are live
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
