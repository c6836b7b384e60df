//! Saving and loading whole games.
//!
//! Games are stored as bincode snapshots of [`FullGame`]. Loading goes
//! through [`FullGame::from_bytes`], which rebuilds the universe's lookup
//! indices, so a loaded game is ready for the next turn.

use std::collections::HashMap;

use crate::error::{GameError, Result};
use crate::game::FullGame;

/// Storage for games, keyed by game id.
pub trait GameStore {
    /// Load a game.
    fn load(&self, id: u64) -> Result<FullGame>;

    /// Save a game, replacing any earlier snapshot with the same id.
    fn save(&mut self, game: &FullGame) -> Result<()>;
}

/// In-memory store of binary snapshots.
#[derive(Debug, Default, Clone)]
pub struct MemoryGameStore {
    snapshots: HashMap<u64, Vec<u8>>,
}

impl MemoryGameStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// No games saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop a saved game. Returns whether it existed.
    pub fn remove(&mut self, id: u64) -> bool {
        self.snapshots.remove(&id).is_some()
    }
}

impl GameStore for MemoryGameStore {
    fn load(&self, id: u64) -> Result<FullGame> {
        let bytes = self.snapshots.get(&id).ok_or(GameError::GameNotFound(id))?;
        let game = FullGame::from_bytes(bytes)?;
        tracing::debug!(game_id = id, year = game.game.year, "game loaded");
        Ok(game)
    }

    fn save(&mut self, game: &FullGame) -> Result<()> {
        let bytes = game.to_bytes()?;
        tracing::debug!(
            game_id = game.game.id,
            year = game.game.year,
            bytes = bytes.len(),
            "game saved"
        );
        self.snapshots.insert(game.game.id, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameSettings, PlayerSetup};
    use crate::race::Race;
    use crate::rules::{Density, Rules, Size};
    use crate::tech::StandardCatalog;

    fn game(id: u64) -> FullGame {
        let settings = GameSettings {
            size: Size::Tiny,
            density: Density::Sparse,
            players: vec![PlayerSetup::human("Ada", Race::default())],
            ..GameSettings::default()
        };
        FullGame::create(id, &settings, Rules::with_seed(11), &StandardCatalog::new()).unwrap()
    }

    #[test]
    fn test_missing_game() {
        let store = MemoryGameStore::new();
        assert!(matches!(store.load(4), Err(GameError::GameNotFound(4))));
    }

    #[test]
    fn test_save_replaces_snapshot() {
        let mut store = MemoryGameStore::new();
        let mut game = game(2);
        store.save(&game).unwrap();
        game.game.year += 1;
        store.save(&game).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load(2).unwrap().game.year, game.game.year);
        assert!(store.remove(2));
        assert!(store.is_empty());
    }
}
