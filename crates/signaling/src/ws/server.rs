//! Listener and accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::SignalingConfig;
use crate::error::ServerError;
use crate::matchmaker::CoinFlipPairing;
use crate::switchboard::Switchboard;

use super::handler;

/// WebSocket signaling server.
///
/// Binds eagerly so callers can learn the actual listening address (port 0
/// in the config selects an ephemeral port), then serves connections until
/// dropped.
pub struct SignalingServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<SignalingConfig>,
    switchboard: Arc<Switchboard>,
}

impl SignalingServer {
    /// Validate the configuration and bind the listening socket
    pub async fn bind(config: SignalingConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let switchboard = match config.pair_chance {
            Some(chance) => Arc::new(Switchboard::with_policy(Box::new(CoinFlipPairing::new(
                chance,
            )))),
            None => Arc::new(Switchboard::new()),
        };

        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            config: Arc::new(config),
            switchboard,
        })
    }

    /// The address the server is actually listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle to the shared event-processing core
    pub fn switchboard(&self) -> Arc<Switchboard> {
        Arc::clone(&self.switchboard)
    }

    /// Accept connections until the accept loop fails or the future is
    /// dropped (e.g. by a shutdown `select!`).
    pub async fn run(self) -> Result<(), ServerError> {
        info!(addr = %self.local_addr, "signaling server listening");
        loop {
            let (stream, peer_addr) = self.listener.accept().await?;
            let config = Arc::clone(&self.config);
            let switchboard = Arc::clone(&self.switchboard);
            tokio::spawn(async move {
                if let Err(e) =
                    handler::handle_connection(stream, peer_addr, config, switchboard).await
                {
                    debug!(addr = %peer_addr, error = %e, "connection ended with error");
                }
            });
        }
    }
}
