//! Signaling server binary entry point.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port with any origin allowed
//! cargo run -p tandem-signaling-server
//!
//! # Restrict origins and pick a port
//! cargo run -p tandem-signaling-server -- \
//!   --port 3000 \
//!   --allowed-origins https://app.example,http://localhost:5173
//!
//! # Randomized pairing: match immediately only half the time
//! cargo run -p tandem-signaling-server -- --pair-chance 0.5
//! ```

use clap::Parser;
use tandem_signaling::{SignalingConfig, SignalingServer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tandem signaling server
///
/// Matches anonymous clients into two-party sessions and relays WebRTC
/// signaling messages between the matched pair.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the listener to
    #[arg(long, default_value = "0.0.0.0", env = "BIND_ADDR")]
    bind: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "PORT")]
    port: u16,

    /// Allowed origins (comma-separated; empty allows any origin)
    #[arg(long, value_delimiter = ',', env = "ALLOWED_ORIGINS")]
    allowed_origins: Vec<String>,

    /// Probability of pairing a join immediately instead of re-queuing
    /// (omit for deterministic FIFO pairing)
    #[arg(long, env = "PAIR_CHANCE")]
    pair_chance: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Tandem signaling server starting"
    );

    let config = SignalingConfig {
        bind_addr: args.bind,
        port: args.port,
        allowed_origins: args.allowed_origins,
        pair_chance: args.pair_chance,
    };

    let server = SignalingServer::bind(config).await?;
    info!(addr = %server.local_addr(), "listening for WebSocket connections");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping");
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
