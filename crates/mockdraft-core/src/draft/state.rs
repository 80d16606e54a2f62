// Draft state: team pick holdings, resolved history, remaining player pool.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::pick::{HistoryEntry, Pick, Player};
use super::pool::PlayerPool;
use super::rounds::{round_of, TOTAL_ROUNDS};
use crate::error::ValidationError;

/// The single shared draft aggregate. Every write goes through the
/// coordinator; this type only knows how to transform itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftState {
    pub current_round: u32,
    pub total_rounds: u32,
    /// Per-team slots, each list kept ascending by pick number.
    pub team_picks: BTreeMap<String, Vec<Pick>>,
    /// Resolved picks in the order they were made.
    pub draft_history: Vec<HistoryEntry>,
    pub available_players: PlayerPool,
}

/// A stored draft document and the version it was read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedDocument {
    pub state: DraftState,
    pub version: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A broken structural invariant. Seeing one of these means a bug, not a bad
/// request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("pick {0} is held by more than one team")]
    DuplicatePickNumber(u32),

    #[error("{team}'s picks are not in ascending order")]
    UnsortedPicks { team: String },

    #[error("{0} is both drafted and still available")]
    PlayerStillAvailable(String),

    #[error("history has {history} entries but {filled} picks are filled")]
    HistoryMismatch { history: usize, filled: usize },

    #[error("{drafted} drafted + {available} available != pool of {pool}")]
    PoolSizeMismatch {
        drafted: usize,
        available: usize,
        pool: usize,
    },
}

impl DraftState {
    /// Fresh draft: every slot open, full player pool, empty history.
    pub fn new(team_picks: BTreeMap<String, Vec<Pick>>, players: Vec<Player>) -> Self {
        let team_picks = team_picks
            .into_iter()
            .map(|(team, picks)| {
                let mut picks: Vec<Pick> = picks.iter().map(Pick::unfilled).collect();
                picks.sort_by_key(|p| p.pick_number);
                (team, picks)
            })
            .collect();

        DraftState {
            current_round: 1,
            total_rounds: TOTAL_ROUNDS,
            team_picks,
            draft_history: Vec::new(),
            available_players: PlayerPool::new(players),
        }
    }

    pub fn has_team(&self, team: &str) -> bool {
        self.team_picks.contains_key(team)
    }

    /// A team's slots in pick order.
    pub fn picks_for(&self, team: &str) -> Result<&[Pick], ValidationError> {
        self.team_picks
            .get(team)
            .map(Vec::as_slice)
            .ok_or_else(|| ValidationError::UnknownTeam {
                team: team.to_string(),
            })
    }

    pub(crate) fn picks_for_mut(&mut self, team: &str) -> Result<&mut Vec<Pick>, ValidationError> {
        self.team_picks
            .get_mut(team)
            .ok_or_else(|| ValidationError::UnknownTeam {
                team: team.to_string(),
            })
    }

    /// Index of the team's first unfilled slot.
    pub fn next_open_slot(&self, team: &str) -> Result<usize, ValidationError> {
        self.picks_for(team)?
            .iter()
            .position(Pick::is_open)
            .ok_or_else(|| ValidationError::NoOpenPick {
                team: team.to_string(),
            })
    }

    /// Put `player` into the team's first open slot and log it. The player
    /// must already be out of the pool.
    pub fn assign_next_pick(
        &mut self,
        team: &str,
        player: Player,
    ) -> Result<HistoryEntry, ValidationError> {
        let slot = self.next_open_slot(team)?;
        let pick = &mut self.picks_for_mut(team)?[slot];
        let entry = HistoryEntry::new(pick.pick_number, team, &player);
        pick.player = Some(player);

        self.draft_history.push(entry.clone());
        self.refresh_current_round();
        Ok(entry)
    }

    /// Manual selection of a named player for `team`. Nothing changes unless
    /// the team, the player and an open slot all check out.
    pub fn select_player(&mut self, team: &str, name: &str) -> Result<HistoryEntry, ValidationError> {
        self.next_open_slot(team)?;
        let player = self
            .available_players
            .take_by_name(name)
            .ok_or_else(|| ValidationError::UnknownPlayer {
                name: name.to_string(),
            })?;
        let entry = self.assign_next_pick(team, player)?;
        debug!(team, player = %entry.player_name, pick = entry.pick_number, "player selected");
        Ok(entry)
    }

    /// Pick numbers that already have a player.
    pub fn resolved_pick_numbers(&self) -> HashSet<u32> {
        self.draft_history.iter().map(|e| e.pick_number).collect()
    }

    /// Lowest pick number still waiting for a player.
    pub fn next_pick_number(&self) -> Option<u32> {
        self.team_picks
            .values()
            .flatten()
            .filter(|p| p.is_open())
            .map(|p| p.pick_number)
            .min()
    }

    pub fn is_complete(&self) -> bool {
        self.next_pick_number().is_none()
    }

    pub fn filled_count(&self) -> usize {
        self.team_picks
            .values()
            .flatten()
            .filter(|p| !p.is_open())
            .count()
    }

    /// Total number of slots across all teams.
    pub fn total_picks(&self) -> usize {
        self.team_picks.values().map(Vec::len).sum()
    }

    /// Move `current_round` to the round of the next open pick, or to the
    /// final round once every slot is filled.
    pub fn refresh_current_round(&mut self) {
        match self.next_pick_number() {
            Some(next) => {
                if let Ok(round) = round_of(next) {
                    self.current_round = round;
                }
            }
            None => self.current_round = self.total_rounds,
        }
    }

    /// Verify the structural invariants against the size of the original
    /// player pool.
    pub fn check_invariants(&self, pool_size: usize) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::new();
        let mut drafted = HashSet::new();

        for (team, picks) in &self.team_picks {
            if picks.windows(2).any(|w| w[0].pick_number > w[1].pick_number) {
                return Err(InvariantViolation::UnsortedPicks { team: team.clone() });
            }
            for pick in picks {
                if !seen.insert(pick.pick_number) {
                    return Err(InvariantViolation::DuplicatePickNumber(pick.pick_number));
                }
                if let Some(player) = &pick.player {
                    drafted.insert(player.name.as_str());
                }
            }
        }

        if let Some(p) = self
            .available_players
            .iter()
            .find(|p| drafted.contains(p.name.as_str()))
        {
            return Err(InvariantViolation::PlayerStillAvailable(p.name.clone()));
        }

        if self.draft_history.len() != drafted.len() {
            return Err(InvariantViolation::HistoryMismatch {
                history: self.draft_history.len(),
                filled: drafted.len(),
            });
        }

        if drafted.len() + self.available_players.len() != pool_size {
            return Err(InvariantViolation::PoolSizeMismatch {
                drafted: drafted.len(),
                available: self.available_players.len(),
                pool: pool_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> Player {
        Player {
            name: name.to_string(),
            position: "CB".into(),
            team: "Tech".into(),
            rating: None,
            ranking: None,
        }
    }

    fn two_team_state() -> DraftState {
        let mut picks = BTreeMap::new();
        picks.insert("Alpha".to_string(), vec![Pick::new(33, 20.0), Pick::new(1, 100.0)]);
        picks.insert("Beta".to_string(), vec![Pick::new(2, 95.0)]);
        DraftState::new(picks, vec![player("A"), player("B"), player("C")])
    }

    #[test]
    fn new_sorts_picks_and_starts_round_one() {
        let state = two_team_state();
        let alpha: Vec<u32> = state.team_picks["Alpha"].iter().map(|p| p.pick_number).collect();
        assert_eq!(alpha, vec![1, 33]);
        assert_eq!(state.current_round, 1);
        assert_eq!(state.total_rounds, 7);
        assert!(state.draft_history.is_empty());
        assert_eq!(state.total_picks(), 3);
    }

    #[test]
    fn new_clears_existing_players() {
        let mut picks = BTreeMap::new();
        picks.insert(
            "Alpha".to_string(),
            vec![Pick {
                player: Some(player("Z")),
                ..Pick::new(1, 100.0)
            }],
        );
        let state = DraftState::new(picks, vec![]);
        assert!(state.team_picks["Alpha"][0].is_open());
    }

    #[test]
    fn select_player_fills_first_open_slot() {
        let mut state = two_team_state();
        let entry = state.select_player("Alpha", "B").unwrap();

        assert_eq!(entry.pick_number, 1);
        assert_eq!(entry.player_name, "B");
        assert_eq!(state.team_picks["Alpha"][0].player.as_ref().unwrap().name, "B");
        assert!(!state.available_players.contains("B"));
        assert_eq!(state.draft_history, vec![entry]);
        state.check_invariants(3).unwrap();
    }

    #[test]
    fn select_unknown_player_changes_nothing() {
        let mut state = two_team_state();
        let before = state.clone();
        let err = state.select_player("Alpha", "Nobody").unwrap_err();
        assert_eq!(err, ValidationError::UnknownPlayer { name: "Nobody".into() });
        assert_eq!(state, before);
    }

    #[test]
    fn select_with_no_open_slot_keeps_player_in_pool() {
        let mut state = two_team_state();
        state.select_player("Beta", "A").unwrap();
        let before = state.clone();

        let err = state.select_player("Beta", "B").unwrap_err();
        assert_eq!(err, ValidationError::NoOpenPick { team: "Beta".into() });
        assert_eq!(state, before);
        assert!(state.available_players.contains("B"));
    }

    #[test]
    fn select_for_unknown_team() {
        let mut state = two_team_state();
        let err = state.select_player("Gamma", "A").unwrap_err();
        assert_eq!(err, ValidationError::UnknownTeam { team: "Gamma".into() });
    }

    #[test]
    fn current_round_follows_next_open_pick() {
        let mut state = two_team_state();
        state.select_player("Alpha", "A").unwrap();
        assert_eq!(state.current_round, 1);
        state.select_player("Beta", "B").unwrap();
        assert_eq!(state.next_pick_number(), Some(33));
        assert_eq!(state.current_round, 2);
        state.select_player("Alpha", "C").unwrap();
        assert!(state.is_complete());
        assert_eq!(state.current_round, 7);
    }

    #[test]
    fn invariants_catch_history_mismatch() {
        let mut state = two_team_state();
        state.draft_history.push(HistoryEntry::new(1, "Alpha", &player("A")));
        assert!(matches!(
            state.check_invariants(3),
            Err(InvariantViolation::HistoryMismatch { history: 1, filled: 0 })
        ));
    }

    #[test]
    fn invariants_catch_player_in_both_sets() {
        let mut state = two_team_state();
        state.team_picks.get_mut("Alpha").unwrap()[0].player = Some(player("A"));
        state.draft_history.push(HistoryEntry::new(1, "Alpha", &player("A")));
        assert_eq!(
            state.check_invariants(3),
            Err(InvariantViolation::PlayerStillAvailable("A".into()))
        );
    }

    #[test]
    fn invariants_catch_duplicate_pick_number() {
        let mut state = two_team_state();
        state.team_picks.get_mut("Beta").unwrap().push(Pick::new(33, 20.0));
        assert_eq!(
            state.check_invariants(3),
            Err(InvariantViolation::DuplicatePickNumber(33))
        );
    }

    #[test]
    fn document_round_trips_through_json() {
        let doc = VersionedDocument {
            state: two_team_state(),
            version: 4,
            updated_at: None,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"teamPicks\""));
        assert!(json.contains("\"availablePlayers\""));
        let back: VersionedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
