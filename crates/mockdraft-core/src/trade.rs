// Pick-for-picks trades between two teams.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::draft::pick::Pick;
use crate::draft::state::DraftState;
use crate::error::ValidationError;

/// A pick as it appears in a trade offer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickRef {
    #[serde(alias = "pick")]
    pub pick_number: u32,
    pub value: f64,
}

impl From<&Pick> for PickRef {
    fn from(pick: &Pick) -> Self {
        PickRef {
            pick_number: pick.pick_number,
            value: pick.value,
        }
    }
}

/// `from_team` gives up `from_picks` in exchange for `to_team`'s `to_pick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOffer {
    pub from_team: String,
    pub from_picks: Vec<PickRef>,
    pub to_team: String,
    pub to_pick: PickRef,
}

impl TradeOffer {
    /// Combined value of the picks `from_team` gives up.
    pub fn offered_value(&self) -> f64 {
        self.from_picks.iter().map(|p| p.value).sum()
    }

    pub fn from_pick_numbers(&self) -> Vec<u32> {
        self.from_picks.iter().map(|p| p.pick_number).collect()
    }
}

/// Apply `offer` to a copy of `state` and return the copy. The input is never
/// modified, so a caller that loses a write race can simply drop the result.
///
/// Ownership is checked against the state, not the offer: every pick named
/// must currently sit, unfilled, with the team the offer says holds it.
/// Value balance is the offer generator's concern and is not rechecked here.
pub fn apply_trade(state: &DraftState, offer: &TradeOffer) -> Result<DraftState, ValidationError> {
    validate(state, offer)?;

    let mut next = state.clone();
    let outgoing: HashSet<u32> = offer.from_picks.iter().map(|p| p.pick_number).collect();

    let to_picks = next.picks_for_mut(&offer.to_team)?;
    let received = take_picks(to_picks, |n| n == offer.to_pick.pick_number);

    let from_picks = next.picks_for_mut(&offer.from_team)?;
    let given = take_picks(from_picks, |n| outgoing.contains(&n));
    from_picks.extend(received.iter().map(Pick::unfilled));
    from_picks.sort_by_key(|p| p.pick_number);

    let to_picks = next.picks_for_mut(&offer.to_team)?;
    to_picks.extend(given.iter().map(Pick::unfilled));
    to_picks.sort_by_key(|p| p.pick_number);

    info!(
        from = %offer.from_team,
        to = %offer.to_team,
        gave = ?offer.from_pick_numbers(),
        received = offer.to_pick.pick_number,
        "trade applied"
    );
    Ok(next)
}

/// Remove the picks whose numbers match and return them.
fn take_picks(picks: &mut Vec<Pick>, matches: impl Fn(u32) -> bool) -> Vec<Pick> {
    let (taken, kept): (Vec<Pick>, Vec<Pick>) =
        picks.drain(..).partition(|p| matches(p.pick_number));
    *picks = kept;
    taken
}

fn validate(state: &DraftState, offer: &TradeOffer) -> Result<(), ValidationError> {
    if offer.from_team == offer.to_team {
        return Err(ValidationError::SelfTrade {
            team: offer.from_team.clone(),
        });
    }
    if offer.from_picks.is_empty() {
        return Err(ValidationError::EmptyTrade);
    }

    let mut seen = HashSet::new();
    for pick in &offer.from_picks {
        if !seen.insert(pick.pick_number) {
            return Err(ValidationError::DuplicatePick {
                pick_number: pick.pick_number,
            });
        }
    }

    require_open(state.picks_for(&offer.to_team)?, &offer.to_team, offer.to_pick.pick_number)?;
    let from_held = state.picks_for(&offer.from_team)?;
    for pick in &offer.from_picks {
        require_open(from_held, &offer.from_team, pick.pick_number)?;
    }
    Ok(())
}

fn require_open(held: &[Pick], team: &str, pick_number: u32) -> Result<(), ValidationError> {
    let pick = held
        .iter()
        .find(|p| p.pick_number == pick_number)
        .ok_or_else(|| ValidationError::PickNotHeld {
            team: team.to_string(),
            pick_number,
        })?;
    if pick.is_open() {
        Ok(())
    } else {
        Err(ValidationError::PickAlreadyFilled { pick_number })
    }
}
