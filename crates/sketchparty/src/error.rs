//! Unified error type for the Sketchparty server.

use sketchparty_protocol::ProtocolError;
use sketchparty_room::RoomError;
use sketchparty_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode or decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, full, wrong phase).
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl SketchError {
    /// Status code reported to a client whose request failed with this
    /// error.
    pub fn code(&self) -> u16 {
        match self {
            Self::Transport(_) => 500,
            Self::Protocol(_) => 400,
            Self::Room(e) => e.code(),
        }
    }
}
