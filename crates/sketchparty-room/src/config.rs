//! Room configuration and the game phase enum.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for a room instance.
///
/// The server holds one default; `create-room` may override the round
/// count and per-round quota for the room it creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Number of rounds before the game finishes.
    pub total_rounds: u32,

    /// How many turns each member may draw within one round.
    pub max_drawings_per_round: u32,

    /// Time members have to guess once a word is selected.
    pub guess_window: Duration,

    /// Maximum members allowed in the room.
    pub max_members: usize,

    /// Start the game automatically once this many members are present.
    pub auto_start_at: Option<usize>,

    /// Score the turn and rotate the drawer when the guess deadline
    /// passes. Without this, some client has to request both.
    pub auto_advance: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            max_drawings_per_round: 1,
            guess_window: Duration::from_secs(90),
            max_members: 12,
            auto_start_at: None,
            auto_advance: false,
        }
    }
}

impl RoomConfig {
    /// Returns a copy with the per-room overrides from `create-room` applied.
    pub fn with_overrides(
        &self,
        total_rounds: Option<u32>,
        max_drawings_per_round: Option<u32>,
    ) -> Self {
        Self {
            total_rounds: total_rounds.unwrap_or(self.total_rounds),
            max_drawings_per_round: max_drawings_per_round
                .unwrap_or(self.max_drawings_per_round),
            ..self.clone()
        }
        .validated()
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Rounds, quota, and capacity are forced to at least 1; an
    /// auto-start threshold of 0 is treated as "never".
    pub fn validated(mut self) -> Self {
        if self.total_rounds == 0 {
            tracing::warn!("total_rounds is 0, using 1");
            self.total_rounds = 1;
        }
        if self.max_drawings_per_round == 0 {
            tracing::warn!("max_drawings_per_round is 0, using 1");
            self.max_drawings_per_round = 1;
        }
        self.max_members = self.max_members.max(1);
        if self.auto_start_at == Some(0) {
            self.auto_start_at = None;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The game's current stage.
///
/// ```text
/// NotStarted ─start─→ Started ─choose─→ ChoosingWord ─select─→ GuessingWord
///                                            ↑                     │
///                                            └───────choose────────┤
///                                                                  ↓
///                                                    Finished (rounds exhausted)
/// ```
///
/// - **Started**: the game is running and the first drawer is known, but
///   no turn has been opened yet.
/// - **Finished**: every round has been played. A new game may be started
///   from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    NotStarted,
    Started,
    ChoosingWord,
    GuessingWord,
    Finished,
}

impl Phase {
    /// Returns `true` while a game is being played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started | Self::ChoosingWord | Self::GuessingWord)
    }

    /// Returns `true` if a game may be started from this phase.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Finished)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Started => write!(f, "Started"),
            Self::ChoosingWord => write!(f, "ChoosingWord"),
            Self::GuessingWord => write!(f, "GuessingWord"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
