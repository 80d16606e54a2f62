// Computer-generated trade offers for the user's pick.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::draft::rounds::validate_round;
use crate::draft::state::DraftState;
use crate::error::ValidationError;
use crate::trade::{PickRef, TradeOffer};

/// Upper bound on offers presented per round.
pub const MAX_OFFERS_PER_ROUND: [usize; 7] = [3, 2, 2, 2, 1, 1, 1];

/// Most extra picks a team will attach to its main pick.
const MAX_COMPENSATION_PICKS: usize = 3;

/// Offers stop collecting compensation once they reach this share of the
/// user's pick value.
const TOP_UP_RATIO: f64 = 0.95;

/// Early rounds require offers inside this band around the user's value.
const EARLY_ROUND_BAND: (f64, f64) = (0.9, 1.1);
const EARLY_ROUNDS: u32 = 3;

/// Build trade-up offers from other teams for `user_pick`.
///
/// Each team offers its next unfilled pick after the user's, topped up with
/// up to three further picks until the package is worth roughly as much as
/// the user's slot. Teams are visited in random order so repeat calls spread
/// offers around the league.
pub fn generate_trade_offers<R: Rng + ?Sized>(
    state: &DraftState,
    user_team: &str,
    user_pick: u32,
    round: u32,
    rng: &mut R,
) -> Result<Vec<TradeOffer>, ValidationError> {
    let round = validate_round(round)?;
    let max_offers = MAX_OFFERS_PER_ROUND[round as usize - 1];

    let user_value = state
        .picks_for(user_team)?
        .iter()
        .find(|p| p.pick_number == user_pick && p.is_open())
        .map(|p| p.value);
    let Some(user_value) = user_value else {
        debug!("{user_team} has no open pick {user_pick}; no offers");
        return Ok(Vec::new());
    };

    let mut teams: Vec<&String> = state
        .team_picks
        .keys()
        .filter(|t| t.as_str() != user_team)
        .collect();
    teams.shuffle(rng);

    let mut offers = Vec::new();
    for team in teams {
        if offers.len() >= max_offers {
            break;
        }

        let later: Vec<PickRef> = state.team_picks[team]
            .iter()
            .filter(|p| p.pick_number > user_pick && p.is_open())
            .map(PickRef::from)
            .collect();
        if later.len() < 2 {
            continue;
        }

        let main = later[0];
        let mut package = vec![main];
        let mut total = main.value;
        for pick in later.iter().skip(1).take(MAX_COMPENSATION_PICKS) {
            if total >= user_value * TOP_UP_RATIO {
                break;
            }
            total += pick.value;
            package.push(*pick);
        }

        if !(2..=MAX_COMPENSATION_PICKS + 1).contains(&package.len()) {
            continue;
        }
        if !is_balanced(round, total, user_value) {
            continue;
        }

        offers.push(TradeOffer {
            from_team: team.clone(),
            from_picks: package,
            to_team: user_team.to_string(),
            to_pick: PickRef {
                pick_number: user_pick,
                value: user_value,
            },
        });
    }

    debug!(
        "Generated {} trade offers for {user_team} pick {user_pick} (round {round})",
        offers.len()
    );
    Ok(offers)
}

fn is_balanced(round: u32, total: f64, user_value: f64) -> bool {
    if round <= EARLY_ROUNDS {
        let (low, high) = EARLY_ROUND_BAND;
        total >= user_value * low && total <= user_value * high
    } else {
        total >= user_value * TOP_UP_RATIO
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::draft::pick::Pick;

    fn picks(list: &[(u32, f64)]) -> Vec<Pick> {
        list.iter().map(|&(n, v)| Pick::new(n, v)).collect()
    }

    /// Alpha (user) holds pick 10 worth 60.
    /// Beta: balanced three-pick package (30 + 25 + 10 = 65).
    /// Gamma: two picks worth 40 in total, too little.
    /// Delta: two picks worth 100 in total, too much for early rounds.
    /// Echo: only one later pick.
    fn state() -> DraftState {
        let mut teams = BTreeMap::new();
        teams.insert("Alpha".to_string(), picks(&[(10, 60.0)]));
        teams.insert("Beta".to_string(), picks(&[(5, 70.0), (40, 30.0), (45, 25.0), (50, 10.0)]));
        teams.insert("Gamma".to_string(), picks(&[(41, 20.0), (46, 20.0)]));
        teams.insert("Delta".to_string(), picks(&[(42, 50.0), (47, 50.0)]));
        teams.insert("Echo".to_string(), picks(&[(43, 90.0)]));
        DraftState::new(teams, Vec::new())
    }

    #[test]
    fn early_round_offers_stay_in_band() {
        let mut rng = StdRng::seed_from_u64(11);
        let offers = generate_trade_offers(&state(), "Alpha", 10, 1, &mut rng).unwrap();

        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert_eq!(offer.from_team, "Beta");
        assert_eq!(offer.from_pick_numbers(), vec![40, 45, 50]);
        assert_eq!(offer.to_team, "Alpha");
        assert_eq!(offer.to_pick, PickRef { pick_number: 10, value: 60.0 });
        assert!((offer.offered_value() - 65.0).abs() < 1e-9);
    }

    #[test]
    fn later_rounds_accept_overpayment() {
        let mut rng = StdRng::seed_from_u64(11);
        let offers = generate_trade_offers(&state(), "Alpha", 10, 4, &mut rng).unwrap();

        let mut teams: Vec<&str> = offers.iter().map(|o| o.from_team.as_str()).collect();
        teams.sort();
        assert_eq!(teams, vec!["Beta", "Delta"]);
    }

    #[test]
    fn offer_count_is_capped_per_round() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let offers = generate_trade_offers(&state(), "Alpha", 10, 5, &mut rng).unwrap();
            assert_eq!(offers.len(), 1);
        }
    }

    #[test]
    fn offered_picks_are_later_and_open() {
        let mut s = state();
        s.team_picks.get_mut("Beta").unwrap()[1].player = Some(crate::draft::pick::Player {
            name: "Taken".into(),
            position: "TE".into(),
            team: "X".into(),
            rating: None,
            ranking: None,
        });
        let mut rng = StdRng::seed_from_u64(2);
        let offers = generate_trade_offers(&s, "Alpha", 10, 4, &mut rng).unwrap();
        for offer in &offers {
            for pick in &offer.from_picks {
                assert!(pick.pick_number > 10);
                assert_ne!(pick.pick_number, 40);
            }
        }
    }

    #[test]
    fn no_offers_for_pick_user_does_not_hold() {
        let mut rng = StdRng::seed_from_u64(1);
        let offers = generate_trade_offers(&state(), "Alpha", 5, 1, &mut rng).unwrap();
        assert!(offers.is_empty());
    }

    #[test]
    fn rejects_bad_round_and_team() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_trade_offers(&state(), "Alpha", 10, 0, &mut rng).is_err());
        assert!(generate_trade_offers(&state(), "Nobody", 10, 1, &mut rng).is_err());
    }
}
