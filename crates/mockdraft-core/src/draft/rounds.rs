// Pick-number to round mapping.

use crate::error::ValidationError;

/// Number of rounds in the draft.
pub const TOTAL_ROUNDS: u32 = 7;

/// Inclusive pick ranges per round. Later rounds are wider because they carry
/// compensatory selections.
pub const ROUND_BOUNDARIES: [(u32, u32); TOTAL_ROUNDS as usize] = [
    (1, 32),
    (33, 64),
    (65, 100),
    (101, 135),
    (136, 176),
    (177, 220),
    (221, 257),
];

/// Total number of picks covered by the round table.
pub const LAST_PICK: u32 = ROUND_BOUNDARIES[TOTAL_ROUNDS as usize - 1].1;

/// Map a pick number to its round (1-based). Pick numbers outside every range
/// are rejected rather than clamped.
pub fn round_of(pick_number: u32) -> Result<u32, ValidationError> {
    ROUND_BOUNDARIES
        .iter()
        .position(|&(first, last)| (first..=last).contains(&pick_number))
        .map(|idx| idx as u32 + 1)
        .ok_or(ValidationError::InvalidPickNumber { pick_number })
}

/// Reject rounds outside `1..=TOTAL_ROUNDS`.
pub fn validate_round(round: u32) -> Result<u32, ValidationError> {
    if (1..=TOTAL_ROUNDS).contains(&round) {
        Ok(round)
    } else {
        Err(ValidationError::InvalidRound {
            round,
            max: TOTAL_ROUNDS,
        })
    }
}
