//! Events the server sends to clients.

use serde::{Deserialize, Serialize};
use sketchparty_protocol::{Member, MemberId, RoomId};

use crate::GameState;

/// An outbound event, encoded as
/// `{ "event": "<kebab-case-name>", "data": { ... } }`.
///
/// Rooms produce these paired with a [`Recipient`](sketchparty_protocol::Recipient);
/// the connection layer only encodes and writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Sent to the creator once their room is live.
    RoomCreated { room_id: RoomId, member: Member },

    /// Sent to a member who just joined, with the full member list.
    RoomJoined {
        room_id: RoomId,
        member: Member,
        members: Vec<Member>,
    },

    RoomNotFound { room_id: RoomId, message: String },

    UpdateMembers { members: Vec<Member> },

    /// Human-readable toast, e.g. "New member arrived!".
    Notification { title: String, message: String },

    GameStarted { state: GameState },

    /// Full snapshot after any game-state change.
    #[serde(rename = "game-state")]
    GameStateUpdate { state: GameState },

    WordSelected { word: String },

    /// Relayed drawing instruction; `draw_options` is opaque.
    UpdateCanvasState { draw_options: serde_json::Value },

    ClearCanvas,

    UndoCanvas { canvas_state: String },

    /// Reply to `get-last-undo-point`; `None` when the stack is empty.
    LastUndoPoint { undo_point: Option<String> },

    ChatMessage {
        member_id: MemberId,
        username: String,
        message: String,
    },

    /// Asks an established member to send their canvas for `requester`.
    GetCanvasState { requester: MemberId },

    CanvasState {
        canvas_state: String,
        state: GameState,
    },

    /// The requester is alone in the room; there is no canvas to load.
    ClientLoaded,

    /// The admin ended the game; the room is gone.
    GameStopped,

    /// A request was rejected. Only the requester receives this.
    Error { code: u16, message: String },
}

impl ServerEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomCreated { .. } => "room-created",
            Self::RoomJoined { .. } => "room-joined",
            Self::RoomNotFound { .. } => "room-not-found",
            Self::UpdateMembers { .. } => "update-members",
            Self::Notification { .. } => "notification",
            Self::GameStarted { .. } => "game-started",
            Self::GameStateUpdate { .. } => "game-state",
            Self::WordSelected { .. } => "word-selected",
            Self::UpdateCanvasState { .. } => "update-canvas-state",
            Self::ClearCanvas => "clear-canvas",
            Self::UndoCanvas { .. } => "undo-canvas",
            Self::LastUndoPoint { .. } => "last-undo-point",
            Self::ChatMessage { .. } => "chat-message",
            Self::GetCanvasState { .. } => "get-canvas-state",
            Self::CanvasState { .. } => "canvas-state",
            Self::ClientLoaded => "client-loaded",
            Self::GameStopped => "game-stopped",
            Self::Error { .. } => "error",
        }
    }
}
