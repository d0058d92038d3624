//! Sketchparty server binary.
//!
//! Environment:
//! - `SKETCHPARTY_BIND`: listen address (default `0.0.0.0:$PORT`, `PORT`
//!   defaulting to 3001)
//! - `SKETCHPARTY_AUTO_ADVANCE`: `1` or `true` closes turns when the guess
//!   deadline passes
//! - `SKETCHPARTY_AUTO_START`: member count that starts a game on its own
//! - `RUST_LOG`: log filter (default `info`)

use std::env;

use sketchparty::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 3001;

#[tokio::main]
async fn main() -> Result<(), SketchError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bind = env::var("SKETCHPARTY_BIND").unwrap_or_else(|_| {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        format!("0.0.0.0:{port}")
    });

    let room_config = RoomConfig {
        auto_advance: env_flag("SKETCHPARTY_AUTO_ADVANCE"),
        auto_start_at: env::var("SKETCHPARTY_AUTO_START")
            .ok()
            .and_then(|v| v.parse().ok()),
        ..RoomConfig::default()
    };

    let server = SketchServer::builder()
        .bind(&bind)
        .room_config(room_config)
        .build()
        .await?;

    match server.local_addr() {
        Ok(addr) => tracing::info!(%addr, "listening"),
        Err(e) => tracing::warn!(error = %e, "could not read local address"),
    }

    server.run().await
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(false)
}
