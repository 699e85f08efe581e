//! Veilroom server binary.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store (rooms vanish on restart)
//! veilroom-server --bind 127.0.0.1:4180
//!
//! # Durable store
//! veilroom-server --bind 0.0.0.0:4180 --data /var/lib/veilroom/rooms.redb
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use veilroom_core::{MemoryStore, RedbStore, RoomStore};

/// Veilroom room messaging server
#[derive(Parser, Debug)]
#[command(name = "veilroom-server")]
#[command(about = "End-to-end encrypted room messaging server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1:4180")]
    bind: String,

    /// Path to the redb database (in-memory store when omitted)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let store: Arc<dyn RoomStore> = match &args.data {
        Some(path) => {
            tracing::info!(path = %path.display(), "using durable store");
            Arc::new(RedbStore::open(path)?)
        },
        None => {
            tracing::warn!("no --data path given; rooms will not survive a restart");
            Arc::new(MemoryStore::new())
        },
    };

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, veilroom_server::app(store)).await?;

    Ok(())
}
