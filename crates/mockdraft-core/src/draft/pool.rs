// The ordered pool of undrafted players.

use serde::{Deserialize, Serialize};

use super::pick::Player;

/// Remaining players in board order. Position in the pool is the player's
/// draft priority; removals keep the relative order of everyone else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerPool(Vec<Player>);

impl PlayerPool {
    pub fn new(players: Vec<Player>) -> Self {
        PlayerPool(players)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Player] {
        &self.0
    }

    /// The first `n` players, or the whole pool if it holds fewer.
    pub fn top(&self, n: usize) -> &[Player] {
        &self.0[..n.min(self.0.len())]
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position_of(name).is_some()
    }

    /// Remove and return the player at `index`.
    pub fn take_at(&mut self, index: usize) -> Option<Player> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    /// Remove and return the player called `name`.
    pub fn take_by_name(&mut self, name: &str) -> Option<Player> {
        let index = self.position_of(name)?;
        self.take_at(index)
    }
}

impl From<Vec<Player>> for PlayerPool {
    fn from(players: Vec<Player>) -> Self {
        PlayerPool(players)
    }
}

impl<'a> IntoIterator for &'a PlayerPool {
    type Item = &'a Player;
    type IntoIter = std::slice::Iter<'a, Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
