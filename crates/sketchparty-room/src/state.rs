//! Per-room game state and its transitions.
//!
//! `GameState` is both the state machine and the snapshot broadcast to
//! clients as `game-state`. Transitions validate the current phase and
//! return [`RoomError::InvalidPhase`] instead of changing anything when
//! called at the wrong time.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use sketchparty_protocol::MemberId;

use crate::{Phase, RoomConfig, RoomError, scheduler, scoring};

/// One member's guess in the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessEntry {
    pub guessed: bool,
    /// Seconds into the turn at which the guess landed.
    pub guessed_at_seconds: u32,
}

/// A member's running score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub score: u32,
    pub word_draw_occurrence: String,
}

/// How the next drawer is picked when a turn opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerChoice {
    /// Let the scheduler pick among members still under quota.
    Rotate,
    /// Use this member.
    Explicit(MemberId),
}

/// The game state of one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) phase: Phase,
    pub(crate) drawer: Option<MemberId>,
    pub(crate) word: String,
    /// Milliseconds since the Unix epoch.
    pub(crate) guess_deadline: Option<u64>,
    pub(crate) guess_record: BTreeMap<MemberId, GuessEntry>,
    pub(crate) score: BTreeMap<MemberId, ScoreEntry>,
    pub(crate) draw_counts: BTreeMap<MemberId, u32>,
    pub(crate) current_round: u32,
    pub(crate) total_rounds: u32,
    pub(crate) max_drawings_per_round: u32,
    #[serde(skip)]
    pub(crate) turn_scored: bool,
}

impl GameState {
    /// Creates the state of a freshly created room whose only member is
    /// `creator`.
    pub fn new(config: &RoomConfig, creator: MemberId) -> Self {
        let mut state = Self {
            phase: Phase::NotStarted,
            drawer: None,
            word: String::new(),
            guess_deadline: None,
            guess_record: BTreeMap::new(),
            score: BTreeMap::new(),
            draw_counts: BTreeMap::new(),
            current_round: 1,
            total_rounds: config.total_rounds.max(1),
            max_drawings_per_round: config.max_drawings_per_round.max(1),
            turn_scored: false,
        };
        state.add_member(creator);
        state
    }

    // -- Accessors -------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn drawer(&self) -> Option<MemberId> {
        self.drawer
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    /// When guessing closes, in milliseconds since the Unix epoch.
    ///
    /// Advisory: the state itself never times out.
    pub fn guess_deadline(&self) -> Option<u64> {
        self.guess_deadline
    }

    pub fn guess_record(&self) -> &BTreeMap<MemberId, GuessEntry> {
        &self.guess_record
    }

    pub fn scores(&self) -> &BTreeMap<MemberId, ScoreEntry> {
        &self.score
    }

    /// Returns a member's score, or `None` if they are not in the game.
    pub fn score_of(&self, member: MemberId) -> Option<u32> {
        self.score.get(&member).map(|entry| entry.score)
    }

    /// Returns how many turns a member has drawn in the current round.
    pub fn draw_count(&self, member: MemberId) -> Option<u32> {
        self.draw_counts.get(&member).copied()
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn max_drawings_per_round(&self) -> u32 {
        self.max_drawings_per_round
    }

    // -- Membership ------------------------------------------------------

    /// Seeds score and draw-count entries for a new member. Existing
    /// entries are left alone.
    pub fn add_member(&mut self, member: MemberId) {
        self.score.entry(member).or_default();
        self.draw_counts.entry(member).or_insert(0);
    }

    /// Drops a departed member's score and draw-count entries.
    ///
    /// A guess they already made stays in this turn's record. If they
    /// were drawing, the drawer slot is cleared; the turn is not rotated.
    pub fn remove_member(&mut self, member: MemberId) {
        self.score.remove(&member);
        self.draw_counts.remove(&member);
        if self.drawer == Some(member) {
            self.drawer = None;
        }
    }

    // -- Transitions -----------------------------------------------------

    /// Starts a game (or a rematch after `Finished`) with `first_drawer`
    /// holding the pen. Scores, rounds, and quotas are reset.
    pub fn start(&mut self, first_drawer: MemberId) -> Result<(), RoomError> {
        if !self.phase.can_start() {
            return Err(self.invalid("start the game"));
        }
        if !self.score.contains_key(&first_drawer) {
            return Err(RoomError::UnknownMember(first_drawer));
        }

        for entry in self.score.values_mut() {
            *entry = ScoreEntry::default();
        }
        for count in self.draw_counts.values_mut() {
            *count = 0;
        }
        self.phase = Phase::Started;
        self.drawer = Some(first_drawer);
        self.current_round = 1;
        self.word.clear();
        self.guess_deadline = None;
        self.guess_record.clear();
        self.turn_scored = false;
        Ok(())
    }

    /// Opens a new turn in `ChoosingWord`.
    ///
    /// With [`DrawerChoice::Rotate`] the scheduler picks the drawer and
    /// may close the round or finish the game; `Ok(None)` means the game
    /// is now `Finished` and nobody draws. An explicit choice is counted
    /// against the member's quota while they are under it.
    pub fn choose_word<R: Rng + ?Sized>(
        &mut self,
        choice: DrawerChoice,
        rng: &mut R,
    ) -> Result<Option<MemberId>, RoomError> {
        if !self.phase.is_active() {
            return Err(self.invalid("choose a drawer"));
        }

        let drawer = match choice {
            DrawerChoice::Explicit(member) => {
                if !self.score.contains_key(&member) {
                    return Err(RoomError::UnknownMember(member));
                }
                if let Some(count) = self.draw_counts.get_mut(&member) {
                    if *count < self.max_drawings_per_round {
                        *count += 1;
                    }
                }
                member
            }
            DrawerChoice::Rotate => match scheduler::select_next(self, rng) {
                Some(member) => member,
                None => return Ok(None),
            },
        };

        self.drawer = Some(drawer);
        self.phase = Phase::ChoosingWord;
        self.word.clear();
        self.guess_deadline = None;
        Ok(Some(drawer))
    }

    /// Sets the secret word and opens guessing until `now + window`.
    pub fn select_word(
        &mut self,
        word: impl Into<String>,
        now: SystemTime,
        window: Duration,
    ) -> Result<(), RoomError> {
        if self.phase != Phase::ChoosingWord {
            return Err(self.invalid("select a word"));
        }

        self.word = word.into();
        self.phase = Phase::GuessingWord;
        self.guess_deadline = Some(epoch_millis(now + window));
        self.guess_record.clear();
        self.turn_scored = false;
        Ok(())
    }

    /// Records that `member` guessed the word `guessed_at_seconds` into
    /// the turn. A repeat overwrites the earlier entry, so the latest
    /// reported time is the one scored.
    pub fn record_guess(
        &mut self,
        member: MemberId,
        guessed_at_seconds: u32,
    ) -> Result<(), RoomError> {
        if self.phase != Phase::GuessingWord {
            return Err(self.invalid("record a guess"));
        }
        if !self.score.contains_key(&member) {
            return Err(RoomError::UnknownMember(member));
        }

        self.guess_record.insert(
            member,
            GuessEntry {
                guessed: true,
                guessed_at_seconds,
            },
        );
        Ok(())
    }

    /// Applies this turn's points. Does not change phase or clear the
    /// guess record.
    ///
    /// Returns `Ok(false)` if the turn was already scored.
    pub fn score_turn(&mut self) -> Result<bool, RoomError> {
        if self.phase != Phase::GuessingWord {
            return Err(self.invalid("score the turn"));
        }
        if self.turn_scored {
            return Ok(false);
        }

        scoring::apply_scores(self);
        self.turn_scored = true;
        Ok(true)
    }

    fn invalid(&self, action: &'static str) -> RoomError {
        RoomError::InvalidPhase {
            action,
            phase: self.phase,
        }
    }
}

fn epoch_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
