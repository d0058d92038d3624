//! Core protocol types for Sketchparty's wire format.
//!
//! Every client event is a JSON object of the form
//! `{ "event": "<kebab-case-name>", "data": { ...camelCase fields... } }`,
//! which is what the browser client emits and listens for.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a member by the connection it occupies.
///
/// A member id is only valid for the lifetime of one connection; when the
/// connection drops, the id is never handed out again.
///
/// `#[serde(transparent)]` keeps it a plain number on the wire (and a
/// numeric string when used as a map key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// Identifies a room.
///
/// Generated by the server when a room is created and typed in by
/// players who want to join it, so it is a short string rather than a
/// number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A member's avatar: named anchor points (eyes, mouth, ...) mapped to
/// coordinates. The server stores and relays it without interpreting it.
pub type Avatar = BTreeMap<String, Point>;

/// A participant in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// The connection this member occupies.
    pub id: MemberId,
    /// Display name.
    pub username: String,
    /// Avatar anchor points.
    #[serde(default)]
    pub avatar: Avatar,
    /// `true` only for the member who created the room.
    #[serde(default)]
    pub is_admin: bool,
}

impl Member {
    /// Creates a regular (non-admin) member.
    pub fn new(id: MemberId, username: impl Into<String>, avatar: Avatar) -> Self {
        Self {
            id,
            username: username.into(),
            avatar,
            is_admin: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive an event produced inside a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every member of the room.
    All,

    /// One member.
    Member(MemberId),

    /// Every member except one (typically the sender).
    AllExcept(MemberId),
}

impl Recipient {
    /// Returns `true` if `member` is among the recipients.
    pub fn includes(&self, member: MemberId) -> bool {
        match self {
            Self::All => true,
            Self::Member(id) => *id == member,
            Self::AllExcept(id) => *id != member,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// Events a client sends to the server.
///
/// Join data is assumed to be validated by the client; the server only
/// relies on serde for shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Create a new room with the sender as admin.
    CreateRoom {
        username: String,
        #[serde(default)]
        avatar: Avatar,
        /// Overrides the server's default number of rounds.
        #[serde(default)]
        total_rounds: Option<u32>,
        /// Overrides the server's default per-round drawing quota.
        #[serde(default)]
        max_drawings_per_round: Option<u32>,
    },

    /// Join an existing room by id.
    JoinRoom {
        room_id: RoomId,
        username: String,
        #[serde(default)]
        avatar: Avatar,
    },

    LeaveRoom { room_id: RoomId },

    /// Admin only.
    StartGame { room_id: RoomId },

    /// Admin only. Ends the game and closes the room.
    StopGame { room_id: RoomId },

    /// Open a word-choosing turn. With `rotate`, the server picks the
    /// next drawer; otherwise `drawer` is used as given.
    ChooseDrawer {
        room_id: RoomId,
        #[serde(default)]
        drawer: Option<MemberId>,
        #[serde(default)]
        rotate: bool,
    },

    /// The drawer picked the secret word.
    SelectWord { room_id: RoomId, word: String },

    /// The sender guessed the word, `guessed_at_seconds` into the turn.
    SubmitGuess {
        room_id: RoomId,
        guessed_at_seconds: u32,
    },

    RequestScoring { room_id: RoomId },

    /// A drawing instruction, relayed verbatim to the rest of the room.
    Draw {
        room_id: RoomId,
        draw_options: serde_json::Value,
    },

    ClearCanvas { room_id: RoomId },

    /// Broadcast an undone canvas to the rest of the room.
    Undo { room_id: RoomId, canvas_state: String },

    PushUndoPoint { room_id: RoomId, undo_point: String },

    GetLastUndoPoint { room_id: RoomId },

    DeleteLastUndoPoint { room_id: RoomId },

    /// A freshly joined client is ready to receive the current canvas.
    ClientReady { room_id: RoomId },

    /// Answer to a `get-canvas-state` request. Delivered to `requester`,
    /// or to the newest member when absent.
    SendCanvasState {
        room_id: RoomId,
        canvas_state: String,
        #[serde(default)]
        requester: Option<MemberId>,
    },

    /// Chat line for the whole room.
    BroadcastMessage { room_id: RoomId, message: String },
}

impl ClientEvent {
    /// Returns the room the event targets. `None` for `create-room`.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::CreateRoom { .. } => None,
            Self::JoinRoom { room_id, .. }
            | Self::LeaveRoom { room_id }
            | Self::StartGame { room_id }
            | Self::StopGame { room_id }
            | Self::ChooseDrawer { room_id, .. }
            | Self::SelectWord { room_id, .. }
            | Self::SubmitGuess { room_id, .. }
            | Self::RequestScoring { room_id }
            | Self::Draw { room_id, .. }
            | Self::ClearCanvas { room_id }
            | Self::Undo { room_id, .. }
            | Self::PushUndoPoint { room_id, .. }
            | Self::GetLastUndoPoint { room_id }
            | Self::DeleteLastUndoPoint { room_id }
            | Self::ClientReady { room_id }
            | Self::SendCanvasState { room_id, .. }
            | Self::BroadcastMessage { room_id, .. } => Some(room_id),
        }
    }

    /// The wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create-room",
            Self::JoinRoom { .. } => "join-room",
            Self::LeaveRoom { .. } => "leave-room",
            Self::StartGame { .. } => "start-game",
            Self::StopGame { .. } => "stop-game",
            Self::ChooseDrawer { .. } => "choose-drawer",
            Self::SelectWord { .. } => "select-word",
            Self::SubmitGuess { .. } => "submit-guess",
            Self::RequestScoring { .. } => "request-scoring",
            Self::Draw { .. } => "draw",
            Self::ClearCanvas { .. } => "clear-canvas",
            Self::Undo { .. } => "undo",
            Self::PushUndoPoint { .. } => "push-undo-point",
            Self::GetLastUndoPoint { .. } => "get-last-undo-point",
            Self::DeleteLastUndoPoint { .. } => "delete-last-undo-point",
            Self::ClientReady { .. } => "client-ready",
            Self::SendCanvasState { .. } => "send-canvas-state",
            Self::BroadcastMessage { .. } => "broadcast-message",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
