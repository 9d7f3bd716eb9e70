//! Rendezvous and signaling relay for pairwise real-time peer connections.
//!
//! Anonymous clients join a FIFO waiting queue; the matchmaker binds two
//! waiting connections into a session and the relay forwards signaling
//! messages (offers, answers, connectivity candidates) between the pair
//! until one side disconnects. Payloads are opaque: the server never
//! inspects or rewrites what it forwards.
//!
//! The [`Switchboard`] owns all mutable state behind a single lock; the
//! [`ws`] module exposes it over WebSocket text frames.

pub mod config;
pub mod error;
pub mod matchmaker;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod switchboard;
pub mod ws;

pub use config::SignalingConfig;
pub use error::{RelayError, ServerError};
pub use matchmaker::{CoinFlipPairing, FifoPairing, Matchmaker, PairingPolicy};
pub use protocol::{ClientEvent, ServerEvent, SignalPayload};
pub use registry::{ConnectionId, ConnectionRegistry};
pub use relay::{Session, SessionId, SessionTable};
pub use switchboard::Switchboard;
pub use ws::SignalingServer;
