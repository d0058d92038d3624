//! # Sketchparty
//!
//! Room and game session server for a multiplayer drawing-and-guessing
//! game.
//!
//! Clients connect over WebSocket and exchange JSON events. One member
//! creates a room and becomes its admin; others join by room id. The admin
//! starts the game, drawers take turns picking a secret word, everyone
//! else guesses, and points are awarded by guess speed with a bonus for
//! drawers whose word most guessers got.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sketchparty::prelude::*;
//!
//! # async fn run() -> Result<(), SketchError> {
//! let server = SketchServer::builder().bind("0.0.0.0:3001").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::SketchError;
pub use server::{
    DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_IDLE_TIMEOUT, SketchServer, SketchServerBuilder,
};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{SketchError, SketchServer, SketchServerBuilder};
    pub use sketchparty_protocol::{
        Avatar, ClientEvent, Codec, JsonCodec, Member, MemberId, Point, RoomId,
    };
    pub use sketchparty_room::{GameState, Phase, RoomConfig, RoomError, ServerEvent};
}
