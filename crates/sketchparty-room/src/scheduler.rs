//! Drawer rotation.
//!
//! Each member may draw `max_drawings_per_round` turns per round. The next
//! drawer is picked uniformly at random among members still under quota;
//! once everyone has drawn their share the round closes, counts reset, and
//! selection retries. Running out of rounds finishes the game.

use rand::Rng;
use sketchparty_protocol::MemberId;

use crate::{GameState, Phase};

/// Picks the next drawer and counts the turn against their quota.
///
/// Returns `None` when the last round is exhausted; the state is then
/// `Finished` with no drawer.
pub(crate) fn select_next<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
) -> Option<MemberId> {
    // Every pass that finds nobody eligible either advances the round or
    // finishes the game, so `total_rounds + 1` passes always suffice.
    for _ in 0..=state.total_rounds {
        let eligible: Vec<MemberId> = state
            .draw_counts
            .iter()
            .filter(|(_, count)| **count < state.max_drawings_per_round)
            .map(|(member, _)| *member)
            .collect();

        if !eligible.is_empty() {
            let chosen = eligible[rng.random_range(0..eligible.len())];
            if let Some(count) = state.draw_counts.get_mut(&chosen) {
                *count += 1;
            }
            tracing::debug!(
                member = %chosen,
                round = state.current_round,
                "drawer selected"
            );
            return Some(chosen);
        }

        if state.current_round >= state.total_rounds {
            break;
        }
        state.current_round += 1;
        for count in state.draw_counts.values_mut() {
            *count = 0;
        }
        tracing::info!(round = state.current_round, "round advanced");
    }

    state.phase = Phase::Finished;
    state.drawer = None;
    tracing::info!(rounds = state.total_rounds, "game finished");
    None
}
