// Automated picks for non-user teams.

use rand::Rng;
use tracing::{info, warn};

use crate::draft::pick::HistoryEntry;
use crate::draft::rounds::validate_round;
use crate::draft::state::DraftState;
use crate::error::ValidationError;

/// How many of the top remaining players a simulated pick may draw from,
/// indexed by round. Early rounds stay close to the top of the board.
pub const BIAS_WINDOWS: [usize; 7] = [10, 20, 30, 35, 35, 35, 35];

/// Window size for `round` before capping to the pool size.
pub fn bias_window(round: u32) -> Result<usize, ValidationError> {
    let round = validate_round(round)?;
    Ok(BIAS_WINDOWS[round as usize - 1])
}

/// Draft a player for `team` by drawing uniformly from the round's bias
/// window and placing them in the team's first open slot.
///
/// On error the state is left untouched: every check runs before the pool or
/// the team's picks are modified.
pub fn simulate_pick<R: Rng + ?Sized>(
    state: &mut DraftState,
    team: &str,
    round: u32,
    rng: &mut R,
) -> Result<HistoryEntry, ValidationError> {
    let window = bias_window(round)?;

    if let Err(e) = state.next_open_slot(team) {
        if matches!(e, ValidationError::NoOpenPick { .. }) {
            warn!("No available pick slot for {team} in round {round}");
        }
        return Err(e);
    }

    let eligible = state.available_players.top(window).len();
    if eligible == 0 {
        warn!("No available players to pick for {team}");
        return Err(ValidationError::NoPlayersAvailable);
    }

    let index = rng.random_range(0..eligible);
    let player = state
        .available_players
        .take_at(index)
        .ok_or(ValidationError::NoPlayersAvailable)?;
    let entry = state.assign_next_pick(team, player)?;

    info!(
        "Player {} selected by {} at pick {} (window {}/{})",
        entry.player_name, team, entry.pick_number, index + 1, eligible
    );
    Ok(entry)
}
