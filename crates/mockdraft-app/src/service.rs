// Draft operations exposed to clients. Every write goes through the
// coordinator; reads go straight to the store.

use std::sync::{Arc, Mutex, MutexGuard};

use mockdraft_core::offers::generate_trade_offers;
use mockdraft_core::sequence::{self, SequencedPick};
use mockdraft_core::simulator;
use mockdraft_core::store::INITIAL_VERSION;
use mockdraft_core::trade::{apply_trade, TradeOffer};
use mockdraft_core::{
    Coordinator, DraftError, DraftState, DraftStore, HistoryEntry, Pick, Player, PlayerPool,
    RetryPolicy, ValidationError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::Catalog;

/// Response to starting (or restarting) a draft.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftStart {
    pub current_round: u32,
    pub team_picks: Vec<Pick>,
    pub available_players: PlayerPool,
}

/// Response to an automated pick. `entry` is `None` when the pick could not
/// be made and nothing was written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedPick {
    pub entry: Option<HistoryEntry>,
    pub draft_history: Vec<HistoryEntry>,
    pub available_players: PlayerPool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selected_player: Player,
    pub entry: HistoryEntry,
    pub draft_history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    pub draft_state: DraftState,
    /// Picks still to be made, in order, after the trade.
    pub draft_sequence: Vec<SequencedPick>,
    pub current_round: u32,
}

pub struct DraftService {
    coordinator: Coordinator,
    catalog: Arc<Catalog>,
    rng: Mutex<StdRng>,
}

impl DraftService {
    /// `seed` fixes the random source for reproducible drafts; `None` draws
    /// from the OS.
    pub fn new(
        store: Arc<dyn DraftStore>,
        catalog: Arc<Catalog>,
        key: &str,
        policy: RetryPolicy,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        DraftService {
            coordinator: Coordinator::new(store, key, policy),
            catalog,
            rng: Mutex::new(rng),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        // A panic mid-draw leaves the generator usable.
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn load_state(&self) -> Result<DraftState, DraftError> {
        let doc = self.coordinator.store().load(self.coordinator.key()).await?;
        Ok(doc.state)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn state(&self) -> Result<DraftState, DraftError> {
        self.load_state().await
    }

    pub async fn players(&self) -> Result<PlayerPool, DraftError> {
        Ok(self.load_state().await?.available_players)
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, DraftError> {
        Ok(self.load_state().await?.draft_history)
    }

    /// Every slot in league order, resolved or not.
    pub async fn draft_sequence(&self, user_team: &str) -> Result<Vec<SequencedPick>, DraftError> {
        let state = self.load_state().await?;
        Ok(sequence::generate_sequence(&state, user_team)?)
    }

    /// Slots that still need a player, in league order.
    pub async fn remaining_sequence(
        &self,
        user_team: &str,
    ) -> Result<Vec<SequencedPick>, DraftError> {
        let state = self.load_state().await?;
        Ok(sequence::remaining_sequence(&state, user_team)?)
    }

    /// Trade-up offers other teams would make for the user's pick.
    pub async fn trade_offers(
        &self,
        user_team: &str,
        user_pick: u32,
        round: u32,
    ) -> Result<Vec<TradeOffer>, DraftError> {
        let state = self.load_state().await?;
        let mut rng = self.rng();
        Ok(generate_trade_offers(&state, user_team, user_pick, round, &mut *rng)?)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Wipe the stored draft and start over from the catalog.
    pub async fn reset_draft(&self, team: &str) -> Result<DraftStart, DraftError> {
        if !self.catalog.has_team(team) {
            return Err(ValidationError::UnknownTeam {
                team: team.to_string(),
            }
            .into());
        }

        let state = self.catalog.initial_state();
        self.coordinator
            .store()
            .reset(self.coordinator.key(), &state, INITIAL_VERSION)
            .await?;
        info!(
            "Draft reset for {team}: {} picks, {} players",
            state.total_picks(),
            state.available_players.len()
        );

        Ok(DraftStart {
            current_round: state.current_round,
            team_picks: state.picks_for(team)?.to_vec(),
            available_players: state.available_players,
        })
    }

    /// Make an automated pick for `team`. Running out of slots or players is
    /// logged and reported as a no-op rather than an error.
    pub async fn simulate_pick(&self, team: &str, round: u32) -> Result<SimulatedPick, DraftError> {
        let result = self
            .coordinator
            .mutate(|state| {
                let mut rng = self.rng();
                Ok(simulator::simulate_pick(state, team, round, &mut *rng)?)
            })
            .await;

        match result {
            Ok(committed) => Ok(SimulatedPick {
                entry: Some(committed.output),
                draft_history: committed.state.draft_history,
                available_players: committed.state.available_players,
            }),
            Err(DraftError::Validation(
                e @ (ValidationError::NoOpenPick { .. } | ValidationError::NoPlayersAvailable),
            )) => {
                warn!("Simulated pick for {team} in round {round} skipped: {e}");
                let state = self.load_state().await?;
                Ok(SimulatedPick {
                    entry: None,
                    draft_history: state.draft_history,
                    available_players: state.available_players,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// The user's own pick of a named player.
    pub async fn select_player(&self, player: &str, team: &str) -> Result<Selection, DraftError> {
        info!("Request to select player: {player} for team: {team}");
        let committed = self
            .coordinator
            .mutate(|state| Ok(state.select_player(team, player)?))
            .await?;

        let entry = committed.output;
        let selected_player = committed
            .state
            .picks_for(team)?
            .iter()
            .find(|p| p.pick_number == entry.pick_number)
            .and_then(|p| p.player.clone())
            .ok_or_else(|| ValidationError::UnknownPlayer {
                name: player.to_string(),
            })?;
        info!("{team} selects {} at pick {}", selected_player.name, entry.pick_number);

        Ok(Selection {
            selected_player,
            entry,
            draft_history: committed.state.draft_history,
        })
    }

    /// Accept a trade offer and return the remaining draft order.
    pub async fn make_trade(
        &self,
        offer: &TradeOffer,
        user_team: &str,
        current_round: u32,
    ) -> Result<TradeResult, DraftError> {
        info!(
            "Received trade offer: {} gives {:?} to {} for pick {}",
            offer.from_team,
            offer.from_pick_numbers(),
            offer.to_team,
            offer.to_pick.pick_number
        );
        let committed = self
            .coordinator
            .mutate(|state| {
                *state = apply_trade(state, offer)?;
                Ok(())
            })
            .await?;

        let draft_sequence = sequence::remaining_sequence(&committed.state, user_team)?;
        Ok(TradeResult {
            draft_state: committed.state,
            draft_sequence,
            current_round,
        })
    }
}

#[cfg(test)]
mod tests {
    use mockdraft_core::store::MemoryStore;

    use super::*;
    use crate::catalog::TeamEntry;

    fn catalog() -> Catalog {
        let team = |name: &str, picks: &[(u32, f64)]| TeamEntry {
            name: name.to_string(),
            picks: picks.iter().map(|&(n, v)| Pick::new(n, v)).collect(),
        };
        let players = (1..=12)
            .map(|i| Player {
                name: format!("Prospect {i}"),
                position: "WR".into(),
                team: "College".into(),
                rating: Some(i),
                ranking: Some(i),
            })
            .collect();
        Catalog::from_parts(
            vec![
                team("Alpha", &[(1, 100.0), (4, 86.0)]),
                team("Beta", &[(2, 95.0), (3, 90.0), (5, 50.0), (6, 35.0)]),
            ],
            players,
        )
        .unwrap()
    }

    fn service() -> DraftService {
        DraftService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(catalog()),
            "draftState",
            RetryPolicy::default(),
            Some(9),
        )
    }

    #[tokio::test]
    async fn reads_before_reset_are_not_found() {
        let svc = service();
        assert!(matches!(svc.state().await, Err(DraftError::NotFound { .. })));
        assert!(matches!(
            svc.simulate_pick("Alpha", 1).await,
            Err(DraftError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn reset_returns_team_subset() {
        let svc = service();
        let start = svc.reset_draft("Beta").await.unwrap();
        assert_eq!(start.current_round, 1);
        assert_eq!(start.team_picks.len(), 4);
        assert_eq!(start.available_players.len(), 12);
        assert!(svc.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_unknown_team_is_rejected() {
        let svc = service();
        let err = svc.reset_draft("Gamma").await.unwrap_err();
        assert!(matches!(
            err,
            DraftError::Validation(ValidationError::UnknownTeam { .. })
        ));
    }

    #[tokio::test]
    async fn simulate_pick_records_history() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();

        let sim = svc.simulate_pick("Beta", 1).await.unwrap();
        let entry = sim.entry.unwrap();
        assert_eq!(entry.pick_number, 2);
        assert_eq!(sim.draft_history, vec![entry]);
        assert_eq!(sim.available_players.len(), 11);
    }

    #[tokio::test]
    async fn simulate_without_open_slot_is_a_logged_no_op() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();
        svc.simulate_pick("Alpha", 1).await.unwrap();
        svc.simulate_pick("Alpha", 1).await.unwrap();

        let before = svc.coordinator.store().load("draftState").await.unwrap();
        let sim = svc.simulate_pick("Alpha", 1).await.unwrap();
        let after = svc.coordinator.store().load("draftState").await.unwrap();

        assert!(sim.entry.is_none());
        assert_eq!(sim.draft_history.len(), 2);
        assert_eq!(before.version, after.version);
    }

    #[tokio::test]
    async fn simulate_invalid_round_is_an_error() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();
        assert!(matches!(
            svc.simulate_pick("Beta", 0).await,
            Err(DraftError::Validation(ValidationError::InvalidRound { .. }))
        ));
    }

    #[tokio::test]
    async fn select_player_returns_player_and_history() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();

        let sel = svc.select_player("Prospect 7", "Alpha").await.unwrap();
        assert_eq!(sel.selected_player.name, "Prospect 7");
        assert_eq!(sel.entry.pick_number, 1);
        assert_eq!(sel.draft_history.len(), 1);
        assert!(!svc.players().await.unwrap().contains("Prospect 7"));
    }

    #[tokio::test]
    async fn select_drafted_player_is_rejected() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();
        svc.select_player("Prospect 1", "Alpha").await.unwrap();

        let err = svc.select_player("Prospect 1", "Beta").await.unwrap_err();
        assert!(matches!(
            err,
            DraftError::Validation(ValidationError::UnknownPlayer { .. })
        ));
        assert_eq!(svc.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sequence_flags_user_picks() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();
        let seq = svc.draft_sequence("Alpha").await.unwrap();
        let user: Vec<u32> = seq.iter().filter(|p| p.is_user).map(|p| p.pick_number).collect();
        assert_eq!(user, vec![1, 4]);
        assert_eq!(seq.len(), 6);
    }

    #[tokio::test]
    async fn make_trade_returns_filtered_sequence() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();
        svc.select_player("Prospect 1", "Alpha").await.unwrap();

        let offers = svc.trade_offers("Alpha", 4, 1).await.unwrap();
        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert_eq!(offer.from_pick_numbers(), vec![5, 6]);

        let result = svc.make_trade(offer, "Alpha", 1).await.unwrap();
        let alpha: Vec<u32> = result.draft_state.team_picks["Alpha"]
            .iter()
            .map(|p| p.pick_number)
            .collect();
        assert_eq!(alpha, vec![1, 5, 6]);

        let remaining: Vec<(u32, bool)> = result
            .draft_sequence
            .iter()
            .map(|p| (p.pick_number, p.is_user))
            .collect();
        assert_eq!(
            remaining,
            vec![(2, false), (3, false), (4, false), (5, true), (6, true)]
        );
        assert_eq!(result.current_round, 1);
    }

    #[tokio::test]
    async fn stale_trade_is_rejected_without_write() {
        let svc = service();
        svc.reset_draft("Alpha").await.unwrap();
        let offers = svc.trade_offers("Alpha", 4, 1).await.unwrap();
        svc.make_trade(&offers[0], "Alpha", 1).await.unwrap();
        let version = svc.coordinator.store().load("draftState").await.unwrap().version;

        let err = svc.make_trade(&offers[0], "Alpha", 1).await.unwrap_err();
        assert!(matches!(
            err,
            DraftError::Validation(ValidationError::PickNotHeld { .. })
        ));
        assert_eq!(
            svc.coordinator.store().load("draftState").await.unwrap().version,
            version
        );
    }
}
