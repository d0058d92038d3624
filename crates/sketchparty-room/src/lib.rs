//! Rooms and game flow for Sketchparty.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! members, game state, and undo stack. Requests for one room are applied
//! one at a time, in arrival order.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates and destroys rooms, tracks who is where
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`Party`]: the synchronous room core the actor drives
//! - [`GameState`]: phases, drawer, word, guesses, and scores
//! - [`ServerEvent`]: everything the server sends to clients
//!
//! ```text
//! RoomManager ──create/join/leave──→ RoomHandle ──mpsc──→ actor(Party)
//!                                                            │
//!                          per-member UnboundedSender ←──────┘
//! ```

mod config;
mod error;
mod event;
mod manager;
mod party;
mod room;
mod scheduler;
pub mod scoring;
mod state;
mod undo;

pub use config::{Phase, RoomConfig};
pub use error::RoomError;
pub use event::ServerEvent;
pub use manager::RoomManager;
pub use party::{Outbox, Party, RoomAction};
pub use room::{MemberSender, RoomHandle};
pub use state::{DrawerChoice, GameState, GuessEntry, ScoreEntry};
pub use undo::UndoPoints;
