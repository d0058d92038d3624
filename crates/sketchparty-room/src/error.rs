//! Error types for the room layer.

use sketchparty_protocol::{MemberId, RoomId};

use crate::Phase;

/// Errors that can occur during room operations.
///
/// A rejected operation never changes room state. Errors are reported to
/// the member who sent the event and nobody else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (never created, or already destroyed).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room has no free member slots.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The member already belongs to a room; a connection occupies at
    /// most one room at a time.
    #[error("member {0} is already in room {1}")]
    AlreadyInRoom(MemberId, RoomId),

    /// The member is not in this room.
    #[error("member {0} is not in room {1}")]
    NotInRoom(MemberId, RoomId),

    /// An operation named a member the game has no record of.
    #[error("member {0} is not part of this game")]
    UnknownMember(MemberId),

    /// The operation is not allowed in the current phase.
    #[error("cannot {action} while the game is {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },

    /// Only the room's admin may do this.
    #[error("member {0} is not the room admin")]
    NotAdmin(MemberId),

    /// Only the current drawer may do this.
    #[error("member {0} is not the current drawer")]
    NotDrawer(MemberId),

    /// The drawer tried to guess their own word.
    #[error("member {0} is drawing and cannot guess")]
    DrawerCannotGuess(MemberId),

    /// The room's command channel is closed (room shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// HTTP-style status code sent to the client with the error.
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::RoomFull(_) | Self::AlreadyInRoom(..) => 409,
            Self::NotAdmin(_) | Self::NotDrawer(_) | Self::DrawerCannotGuess(_) => 403,
            Self::InvalidPhase { .. } => 422,
            Self::NotInRoom(..) | Self::UnknownMember(_) => 400,
            Self::Unavailable(_) => 503,
        }
    }
}
