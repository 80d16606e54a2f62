// Global pick ordering derived from per-team holdings.

use serde::{Deserialize, Serialize};

use crate::draft::rounds::round_of;
use crate::draft::state::DraftState;
use crate::error::ValidationError;

/// One slot in league-wide draft order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencedPick {
    pub pick_number: u32,
    pub team: String,
    /// Whether the slot belongs to the user's team.
    pub is_user: bool,
    pub round: u32,
    pub value: f64,
}

/// Flatten every team's slots into one list ordered by pick number.
///
/// Fails if any held pick number falls outside the round table, since that
/// means the catalog or a trade produced a slot the draft cannot place.
pub fn generate_sequence(
    state: &DraftState,
    user_team: &str,
) -> Result<Vec<SequencedPick>, ValidationError> {
    let mut picks = Vec::with_capacity(state.total_picks());

    for (team, team_picks) in &state.team_picks {
        for pick in team_picks {
            picks.push(SequencedPick {
                pick_number: pick.pick_number,
                team: team.clone(),
                is_user: team == user_team,
                round: round_of(pick.pick_number)?,
                value: pick.value,
            });
        }
    }

    picks.sort_by_key(|p| p.pick_number);
    Ok(picks)
}

/// The sequence minus every pick already recorded in the draft history.
/// Used to resume after a trade, where pick numbers may have changed hands.
pub fn remaining_sequence(
    state: &DraftState,
    user_team: &str,
) -> Result<Vec<SequencedPick>, ValidationError> {
    let resolved = state.resolved_pick_numbers();
    let mut sequence = generate_sequence(state, user_team)?;
    sequence.retain(|p| !resolved.contains(&p.pick_number));
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::draft::pick::{HistoryEntry, Pick, Player};

    fn player(name: &str) -> Player {
        Player {
            name: name.to_string(),
            position: "OT".into(),
            team: "U".into(),
            rating: None,
            ranking: None,
        }
    }

    fn state() -> DraftState {
        let mut picks = BTreeMap::new();
        picks.insert(
            "Alpha".to_string(),
            vec![Pick::new(1, 100.0), Pick::new(34, 19.0)],
        );
        picks.insert(
            "Beta".to_string(),
            vec![Pick::new(2, 95.0), Pick::new(33, 20.0)],
        );
        DraftState::new(picks, vec![player("A"), player("B"), player("C")])
    }

    #[test]
    fn sequence_is_sorted_by_pick_number() {
        let seq = generate_sequence(&state(), "Alpha").unwrap();
        let order: Vec<(u32, &str)> = seq.iter().map(|p| (p.pick_number, p.team.as_str())).collect();
        assert_eq!(order, vec![(1, "Alpha"), (2, "Beta"), (33, "Beta"), (34, "Alpha")]);
    }

    #[test]
    fn sequence_marks_user_and_round() {
        let seq = generate_sequence(&state(), "Beta").unwrap();
        assert!(!seq[0].is_user);
        assert!(seq[1].is_user);
        assert_eq!(seq[1].round, 1);
        assert_eq!(seq[2].round, 2);
        assert_eq!(seq[2].value, 20.0);
    }

    #[test]
    fn unknown_user_team_marks_nobody() {
        let seq = generate_sequence(&state(), "Nobody").unwrap();
        assert!(seq.iter().all(|p| !p.is_user));
    }

    #[test]
    fn out_of_range_pick_fails_sequence() {
        let mut s = state();
        s.team_picks.get_mut("Alpha").unwrap().push(Pick::new(258, 0.1));
        assert_eq!(
            generate_sequence(&s, "Alpha"),
            Err(ValidationError::InvalidPickNumber { pick_number: 258 })
        );
    }

    #[test]
    fn remaining_sequence_skips_resolved_picks() {
        let mut s = state();
        s.select_player("Alpha", "A").unwrap();
        s.select_player("Beta", "B").unwrap();

        let rest: Vec<u32> = remaining_sequence(&s, "Alpha")
            .unwrap()
            .iter()
            .map(|p| p.pick_number)
            .collect();
        assert_eq!(rest, vec![33, 34]);
    }

    #[test]
    fn remaining_sequence_uses_history_not_a_threshold() {
        // Pick 33 resolved before pick 2: a "greater than last pick" filter
        // would wrongly drop pick 2 as well.
        let mut s = state();
        s.select_player("Alpha", "A").unwrap();
        let late = s.available_players.take_by_name("C").unwrap();
        s.team_picks.get_mut("Beta").unwrap()[1].player = Some(late.clone());
        s.draft_history.push(HistoryEntry::new(33, "Beta", &late));
        s.check_invariants(3).unwrap();

        let rest: Vec<u32> = remaining_sequence(&s, "Alpha")
            .unwrap()
            .iter()
            .map(|p| p.pick_number)
            .collect();
        assert_eq!(rest, vec![2, 34]);
    }
}
