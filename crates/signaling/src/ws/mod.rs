//! WebSocket transport for the signaling relay.
//!
//! One task per connection; outbound events travel through a
//! per-connection channel drained by a writer task. Closing the socket is
//! the disconnect event.

mod handler;
mod server;

pub use server::SignalingServer;
