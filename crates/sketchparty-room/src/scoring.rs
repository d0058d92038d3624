//! Turn scoring.

use crate::GameState;

/// Guesses at or under this many seconds earn [`FAST_GUESS_POINTS`].
pub const FAST_GUESS_SECS: u32 = 30;
/// Guesses at or under this many seconds earn [`STEADY_GUESS_POINTS`].
pub const STEADY_GUESS_SECS: u32 = 60;

pub const FAST_GUESS_POINTS: u32 = 175;
pub const STEADY_GUESS_POINTS: u32 = 125;
pub const SLOW_GUESS_POINTS: u32 = 75;

/// Awarded to the drawer when a strict majority of recorded guessers got
/// the word.
pub const DRAWER_BONUS: u32 = 100;

/// Points for a correct guess made `secs` seconds into the turn.
pub fn guess_points(secs: u32) -> u32 {
    if secs <= FAST_GUESS_SECS {
        FAST_GUESS_POINTS
    } else if secs <= STEADY_GUESS_SECS {
        STEADY_GUESS_POINTS
    } else {
        SLOW_GUESS_POINTS
    }
}

/// Adds this turn's guess points and drawer bonus to the running scores.
///
/// Entries for members who have since left are skipped.
pub(crate) fn apply_scores(state: &mut GameState) {
    let total = state.guess_record.len();
    let mut correct = 0;

    for (member, entry) in &state.guess_record {
        if !entry.guessed {
            continue;
        }
        correct += 1;
        match state.score.get_mut(member) {
            Some(score) => {
                score.score = score
                    .score
                    .saturating_add(guess_points(entry.guessed_at_seconds));
            }
            None => tracing::debug!(%member, "guesser left, skipping points"),
        }
    }

    if total > 0 && correct * 2 > total {
        if let Some(score) = state.drawer.and_then(|d| state.score.get_mut(&d)) {
            score.score = score.score.saturating_add(DRAWER_BONUS);
        }
    }

    tracing::debug!(correct, total, "turn scored");
}
