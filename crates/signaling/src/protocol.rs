//! Wire protocol for the signaling WebSocket.
//!
//! Events are JSON objects tagged with a `type` field. Signaling payloads
//! (offer, answer, candidate) are carried as opaque [`Value`]s: the server
//! forwards them without inspection, and the message kind rides in the
//! event type rather than in relay routing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::ConnectionId;
use crate::relay::SessionId;

/// Events a client sends to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Ask to be matched with another waiting client
    JoinQueue,

    /// Withdraw from the waiting queue
    LeaveQueue,

    /// Forward an SDP offer to the session peer
    #[serde(rename_all = "camelCase")]
    SignalOffer {
        /// Session the offer belongs to
        session_id: SessionId,
        /// Opaque offer payload
        offer: Value,
    },

    /// Forward an SDP answer to the session peer
    #[serde(rename_all = "camelCase")]
    SignalAnswer {
        /// Session the answer belongs to
        session_id: SessionId,
        /// Opaque answer payload
        answer: Value,
    },

    /// Forward a connectivity candidate to the session peer
    #[serde(rename_all = "camelCase")]
    SignalCandidate {
        /// Session the candidate belongs to
        session_id: SessionId,
        /// Opaque candidate payload
        candidate: Value,
    },
}

/// Events the server sends to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent to both participants when a pair is formed
    #[serde(rename_all = "camelCase")]
    SessionCreated {
        /// Id of the newly created session
        session_id: SessionId,
    },

    /// An offer forwarded from the session peer
    SignalOffer {
        /// Opaque offer payload, forwarded unmodified
        offer: Value,
        /// Connection that sent the offer
        from: ConnectionId,
    },

    /// An answer forwarded from the session peer
    SignalAnswer {
        /// Opaque answer payload, forwarded unmodified
        answer: Value,
        /// Connection that sent the answer
        from: ConnectionId,
    },

    /// A connectivity candidate forwarded from the session peer
    SignalCandidate {
        /// Opaque candidate payload, forwarded unmodified
        candidate: Value,
        /// Connection that sent the candidate
        from: ConnectionId,
    },

    /// Sent to the remaining participant when its peer disconnects
    PeerDisconnected,
}

/// A signaling payload in flight through the relay.
///
/// All three kinds share one relay code path; the kind only matters when
/// the payload is turned back into a [`ServerEvent`] for the receiver.
#[derive(Debug, Clone)]
pub enum SignalPayload {
    /// SDP offer
    Offer(Value),
    /// SDP answer
    Answer(Value),
    /// ICE candidate
    Candidate(Value),
}

impl SignalPayload {
    /// Kind label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
        }
    }

    /// Build the outbound event for the receiving peer
    pub fn into_event(self, from: ConnectionId) -> ServerEvent {
        match self {
            Self::Offer(offer) => ServerEvent::SignalOffer { offer, from },
            Self::Answer(answer) => ServerEvent::SignalAnswer { answer, from },
            Self::Candidate(candidate) => ServerEvent::SignalCandidate { candidate, from },
        }
    }
}
