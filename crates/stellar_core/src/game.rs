//! Game header, setup settings and the full persisted game.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::Player;
use crate::race::Race;
use crate::rules::{Density, GameRng, Rules, Size};
use crate::score::VictoryConditions;
use crate::tech::TechCatalog;
use crate::universe::Universe;
use crate::universe_generator::UniverseGenerator;

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Being set up.
    #[default]
    Setup,
    /// Waiting for orders.
    WaitingForPlayers,
    /// A turn is being generated.
    GeneratingTurn,
    /// A victor was declared.
    GameOver,
}

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display name.
    pub name: String,
    /// Race template; copied into the player.
    pub race: Race,
    /// Orders come from the built-in AI.
    pub ai_controlled: bool,
}

impl PlayerSetup {
    /// A human player.
    #[must_use]
    pub fn human(name: impl Into<String>, race: Race) -> Self {
        Self {
            name: name.into(),
            race,
            ai_controlled: false,
        }
    }

    /// An AI player.
    #[must_use]
    pub fn ai(name: impl Into<String>, race: Race) -> Self {
        Self {
            name: name.into(),
            race,
            ai_controlled: true,
        }
    }
}

/// Everything needed to create a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Game name.
    pub name: String,
    /// Map size.
    pub size: Size,
    /// Planet density.
    pub density: Density,
    /// Seats, in player-number order.
    pub players: Vec<PlayerSetup>,
    /// How the game is won.
    pub victory_conditions: VictoryConditions,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            name: "A Barefoot Jaywalk".into(),
            size: Size::default(),
            density: Density::default(),
            players: Vec::new(),
            victory_conditions: VictoryConditions::default(),
        }
    }
}

/// Game header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Identifier used by the store.
    pub id: u64,
    /// Game name.
    pub name: String,
    /// Current year.
    pub year: i32,
    /// Lifecycle state.
    pub state: GameState,
    /// Rules snapshot, including the seed.
    pub rules: Rules,
    /// Map size.
    pub size: Size,
    /// Planet density.
    pub density: Density,
    /// Map width and height in light-years.
    pub area: (i32, i32),
    /// How the game is won.
    pub victory_conditions: VictoryConditions,
    /// Someone has won.
    pub victor_declared: bool,
    /// The game's random stream, persisted mid-sequence.
    pub rng: GameRng,
}

impl Game {
    /// Years since the game started.
    #[must_use]
    pub const fn years_elapsed(&self) -> i32 {
        self.year - self.rules.start_year
    }
}

/// A game with its players and universe: the unit of persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullGame {
    /// Header.
    pub game: Game,
    /// Players, in number order.
    pub players: Vec<Player>,
    /// Map objects.
    pub universe: Universe,
}

impl FullGame {
    /// Create a game: players from the settings, a generated universe and an
    /// initial discovery and AI pass. Nothing is returned on failure.
    pub fn create(
        id: u64,
        settings: &GameSettings,
        rules: Rules,
        catalog: &dyn TechCatalog,
    ) -> Result<Self> {
        if settings.players.is_empty() {
            return Err(GameError::InvalidState(
                "a game needs at least one player".into(),
            ));
        }

        let mut rng = rules.new_rng();
        let players = settings
            .players
            .iter()
            .zip(1u32..)
            .map(|(seat, num)| {
                let player = Player::new(num, seat.name.clone(), seat.race.clone(), &rules);
                if seat.ai_controlled {
                    player.with_ai()
                } else {
                    player
                }
            })
            .collect();

        let generated =
            UniverseGenerator::new(settings, &rules, catalog).generate(players, &mut rng)?;

        tracing::info!(
            game_id = id,
            planets = generated.universe.planets.len(),
            players = generated.players.len(),
            "game created"
        );

        Ok(Self {
            game: Game {
                id,
                name: settings.name.clone(),
                year: rules.start_year,
                state: GameState::WaitingForPlayers,
                size: settings.size,
                density: settings.density,
                area: generated.area,
                victory_conditions: settings.victory_conditions.clone(),
                victor_declared: false,
                rules,
                rng,
            },
            players: generated.players,
            universe: generated.universe,
        })
    }

    /// Player by number.
    #[must_use]
    pub fn player(&self, num: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.num == num)
    }

    /// Encode as a binary snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Serialization(e.to_string()))
    }

    /// Decode a binary snapshot and rebuild the universe's lookup indices.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut game: Self =
            bincode::deserialize(bytes).map_err(|e| GameError::Serialization(e.to_string()))?;
        game.universe.build_maps();
        Ok(game)
    }

    /// Hash of the full snapshot, for comparing runs.
    pub fn state_hash(&self) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        self.to_bytes()?.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tech::StandardCatalog;
    use rand::Rng;

    fn settings() -> GameSettings {
        GameSettings {
            size: Size::Tiny,
            density: Density::Sparse,
            players: vec![PlayerSetup::ai("Robo", Race::default())],
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_create_needs_players() {
        let settings = GameSettings::default();
        let err = FullGame::create(1, &settings, Rules::default(), &StandardCatalog::new());
        assert!(matches!(err, Err(GameError::InvalidState(_))));
    }

    #[test]
    fn test_snapshot_round_trip_keeps_rng_position() {
        let game = FullGame::create(7, &settings(), Rules::with_seed(5), &StandardCatalog::new())
            .unwrap();
        let bytes = game.to_bytes().unwrap();
        let mut restored = FullGame::from_bytes(&bytes).unwrap();
        let mut original = game.clone();

        assert_eq!(restored.game, original.game);
        assert_eq!(restored.players, original.players);
        assert_eq!(restored.universe.planets, original.universe.planets);
        let a: u64 = original.game.rng.gen();
        let b: u64 = restored.game.rng.gen();
        assert_eq!(a, b);
        // indices are rebuilt on load
        let home = restored
            .universe
            .player_planets(1)
            .find(|p| p.homeworld)
            .unwrap()
            .num;
        assert!(restored.universe.starbase(home).is_some());
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let mut game =
            FullGame::create(3, &settings(), Rules::with_seed(9), &StandardCatalog::new()).unwrap();
        let again =
            FullGame::create(3, &settings(), Rules::with_seed(9), &StandardCatalog::new()).unwrap();
        assert_eq!(game.state_hash().unwrap(), again.state_hash().unwrap());
        game.game.year += 1;
        assert_ne!(game.state_hash().unwrap(), again.state_hash().unwrap());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let err = FullGame::from_bytes(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, GameError::Serialization(_)));
    }
}
