// Static team pick catalog and player board.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use mockdraft_core::draft::rounds::round_of;
use mockdraft_core::{DraftState, Pick, Player};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid catalog: {message}")]
    Invalid { message: String },
}

/// Wrapper for the top-level `teams` array in teams.json.
#[derive(Debug, Deserialize)]
struct TeamsFile {
    teams: Vec<TeamEntry>,
}

/// A team and the slots it holds before any trades.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    pub picks: Vec<Pick>,
}

/// Read-only draft inputs: who holds which pick, and the ranked player board.
#[derive(Debug, Clone)]
pub struct Catalog {
    teams: Vec<TeamEntry>,
    players: Vec<Player>,
}

impl Catalog {
    /// Load `teams.json` and `players.json` and validate them together.
    pub fn load(teams_path: &Path, players_path: &Path) -> Result<Self, CatalogError> {
        let teams: TeamsFile = read_json(teams_path)?;
        let players: Vec<Player> = read_json(players_path)?;
        Self::from_parts(teams.teams, players)
    }

    /// Build a catalog from already-parsed parts.
    ///
    /// Pick numbers must be unique across teams, cover `1..=N` without gaps,
    /// and each fall inside a round. Player names must be unique.
    pub fn from_parts(mut teams: Vec<TeamEntry>, players: Vec<Player>) -> Result<Self, CatalogError> {
        if teams.is_empty() {
            return Err(invalid("no teams defined"));
        }

        let mut team_names = HashSet::new();
        let mut pick_numbers = HashSet::new();
        for team in &mut teams {
            if !team_names.insert(team.name.clone()) {
                return Err(invalid(format!("duplicate team {}", team.name)));
            }
            team.picks.sort_by_key(|p| p.pick_number);
            for pick in &team.picks {
                if !pick_numbers.insert(pick.pick_number) {
                    return Err(invalid(format!("pick {} assigned twice", pick.pick_number)));
                }
                round_of(pick.pick_number).map_err(|e| invalid(e.to_string()))?;
            }
        }

        let total = pick_numbers.len() as u32;
        if let Some(missing) = (1..=total).find(|n| !pick_numbers.contains(n)) {
            return Err(invalid(format!("pick {missing} is not assigned to any team")));
        }

        let mut player_names = HashSet::new();
        if let Some(dup) = players.iter().find(|p| !player_names.insert(p.name.as_str())) {
            return Err(invalid(format!("duplicate player {}", dup.name)));
        }

        Ok(Catalog { teams, players })
    }

    pub fn has_team(&self, name: &str) -> bool {
        self.teams.iter().any(|t| t.name == name)
    }

    pub fn teams(&self) -> &[TeamEntry] {
        &self.teams
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Size of the full player pool, for invariant checks.
    pub fn pool_size(&self) -> usize {
        self.players.len()
    }

    pub fn total_picks(&self) -> usize {
        self.teams.iter().map(|t| t.picks.len()).sum()
    }

    /// The state a draft (re)starts from: all picks open, full board, no
    /// history.
    pub fn initial_state(&self) -> DraftState {
        let team_picks: BTreeMap<String, Vec<Pick>> = self
            .teams
            .iter()
            .map(|t| (t.name.clone(), t.picks.clone()))
            .collect();
        DraftState::new(team_picks, self.players.clone())
    }
}

fn invalid(message: impl Into<String>) -> CatalogError {
    CatalogError::Invalid {
        message: message.into(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
