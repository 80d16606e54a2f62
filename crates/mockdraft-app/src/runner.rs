// Drives a whole draft from the current state to the last pick.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mockdraft_core::sequence::SequencedPick;
use mockdraft_core::trade::TradeOffer;
use mockdraft_core::{DraftError, HistoryEntry};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::service::DraftService;

/// Attempts per slot when the coordinator gives up on a contended write.
const SLOT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub user_team: String,
    /// Take the first trade-down offer on the user's pick, at most once per
    /// round.
    pub accept_trades: bool,
    /// Pause between picks.
    pub pick_delay: Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub user_picks: Vec<HistoryEntry>,
    pub trades: Vec<TradeOffer>,
    pub picks_made: usize,
    pub skipped: usize,
}

pub struct DraftRunner {
    service: Arc<DraftService>,
    options: RunnerOptions,
}

impl DraftRunner {
    pub fn new(service: Arc<DraftService>, options: RunnerOptions) -> Self {
        DraftRunner { service, options }
    }

    /// Walk the remaining sequence slot by slot. Other teams pick through the
    /// simulator; the user's slots either trade down or take the best player
    /// left on the board.
    pub async fn run(&self) -> Result<DraftSummary, DraftError> {
        let user_team = self.options.user_team.as_str();
        let mut queue: VecDeque<SequencedPick> =
            self.service.remaining_sequence(user_team).await?.into();
        let mut traded_rounds = HashSet::new();
        let mut summary = DraftSummary::default();

        info!("Draft runner starting with {} slots left", queue.len());

        while let Some(slot) = queue.pop_front() {
            if slot.is_user {
                if self.options.accept_trades && !traded_rounds.contains(&slot.round) {
                    if let Some(result) = self.try_trade(&slot).await? {
                        traded_rounds.insert(slot.round);
                        summary.trades.push(result.0);
                        queue = result.1.into();
                        continue;
                    }
                }

                match self.user_pick(&slot).await? {
                    Some(entry) => {
                        summary.picks_made += 1;
                        summary.user_picks.push(entry);
                    }
                    None => summary.skipped += 1,
                }
            } else {
                let sim = with_retry(|| self.service.simulate_pick(&slot.team, slot.round)).await?;
                match sim.entry {
                    Some(_) => summary.picks_made += 1,
                    None => summary.skipped += 1,
                }
            }

            if !self.options.pick_delay.is_zero() {
                tokio::time::sleep(self.options.pick_delay).await;
            }
        }

        info!(
            "Draft finished: {} picks made, {} skipped, {} trades",
            summary.picks_made,
            summary.skipped,
            summary.trades.len()
        );
        Ok(summary)
    }

    /// Accept the first offer for the user's slot, returning it with the
    /// post-trade sequence.
    async fn try_trade(
        &self,
        slot: &SequencedPick,
    ) -> Result<Option<(TradeOffer, Vec<SequencedPick>)>, DraftError> {
        let user_team = self.options.user_team.as_str();
        let offers = self
            .service
            .trade_offers(user_team, slot.pick_number, slot.round)
            .await?;
        let Some(offer) = offers.into_iter().next() else {
            return Ok(None);
        };

        match with_retry(|| self.service.make_trade(&offer, user_team, slot.round)).await {
            Ok(result) => Ok(Some((offer, result.draft_sequence))),
            Err(DraftError::Validation(e)) => {
                // The slot changed between offer and acceptance.
                warn!("Trade for pick {} no longer valid: {e}", slot.pick_number);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn user_pick(&self, slot: &SequencedPick) -> Result<Option<HistoryEntry>, DraftError> {
        let players = self.service.players().await?;
        let Some(best) = players.iter().next() else {
            warn!("No players left for {} at pick {}", slot.team, slot.pick_number);
            return Ok(None);
        };

        let selection = with_retry(|| self.service.select_player(&best.name, &slot.team)).await?;
        debug!("User pick {} -> {}", slot.pick_number, selection.selected_player.name);
        Ok(Some(selection.entry))
    }
}

async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, DraftError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DraftError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_retryable() && attempt < SLOT_ATTEMPTS => {
                warn!("{e}; retrying slot ({attempt}/{SLOT_ATTEMPTS})");
                attempt += 1;
            }
            other => return other,
        }
    }
}
