// Pick slots, players, and history snapshots.

use serde::{Deserialize, Serialize};

/// A draft prospect. `team` is the college or club the player comes from,
/// not the drafting team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: String,
    pub team: String,
    /// Board rating as shown next to the player's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<u32>,
}

/// One team's slot in the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    /// League-wide pick number (1-indexed).
    #[serde(alias = "pick")]
    pub pick_number: u32,
    /// Trade-chart value of the slot.
    pub value: f64,
    /// The player taken with this slot, `None` until the pick is made.
    #[serde(default)]
    pub player: Option<Player>,
}

impl Pick {
    pub fn new(pick_number: u32, value: f64) -> Self {
        Pick {
            pick_number,
            value,
            player: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.player.is_none()
    }

    /// A copy of this slot with the player cleared, as it is handed over in a
    /// trade.
    pub fn unfilled(&self) -> Self {
        Pick {
            player: None,
            ..self.clone()
        }
    }
}

/// A resolved pick as shown in the draft log. The player fields are copied
/// out so later edits to the player record never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(alias = "pick")]
    pub pick_number: u32,
    pub team: String,
    #[serde(alias = "player")]
    pub player_name: String,
    pub position: String,
    pub college: String,
}

impl HistoryEntry {
    pub fn new(pick_number: u32, team: &str, player: &Player) -> Self {
        HistoryEntry {
            pick_number,
            team: team.to_string(),
            player_name: player.name.clone(),
            position: player.position.clone(),
            college: player.team.clone(),
        }
    }
}
