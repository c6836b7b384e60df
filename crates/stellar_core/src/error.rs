//! Error types for universe generation and turn processing.
//!
//! Only data bugs and failed constraints travel through [`GameError`].
//! Rejected orders (bad colonize targets, missing cargo) are reported to the
//! player as [`crate::player::PlayerMessage`]s and never abort a turn.

use thiserror::Error;

use crate::player::PlayerNum;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the simulation core.
#[derive(Debug, Error)]
pub enum GameError {
    /// A spatial constraint could not be satisfied while generating a universe.
    #[error("Universe generation failed ({constraint}): {detail}")]
    GenerationConstraint {
        /// Which constraint failed.
        constraint: &'static str,
        /// Human readable context.
        detail: String,
    },

    /// A planet intel lookup fell outside the player's dense intel array.
    #[error("Planet intel index out of range: player {player}, planet {planet}, intel len {len}")]
    IntelIndexOutOfRange {
        /// Observing player.
        player: PlayerNum,
        /// Planet number that was looked up.
        planet: u32,
        /// Length of the intel array.
        len: usize,
    },

    /// A ship token or starbase refers to a design the player does not have.
    #[error("Unknown design {design} for player {player}")]
    UnknownDesign {
        /// Design owner.
        player: PlayerNum,
        /// Design number.
        design: u32,
    },

    /// Planet number not present in the universe.
    #[error("Planet not found: {0}")]
    UnknownPlanet(u32),

    /// Fleet not present in the universe.
    #[error("Fleet not found: player {player}, fleet {num}")]
    UnknownFleet {
        /// Fleet owner.
        player: PlayerNum,
        /// Fleet number.
        num: u32,
    },

    /// Player number not present in the game.
    #[error("Player not found: {0}")]
    UnknownPlayer(PlayerNum),

    /// A phase of turn generation failed; the turn is aborted.
    #[error("Turn generation failed for game {game_id} in year {year} during {phase}: {source}")]
    TurnPhase {
        /// Game being generated.
        game_id: u64,
        /// Year being generated.
        year: i32,
        /// Name of the failing phase.
        phase: &'static str,
        /// Underlying error.
        #[source]
        source: Box<GameError>,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParse {
        /// Path (or label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Binary snapshot encode/decode failure.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// No saved game with this id.
    #[error("Game not found: {0}")]
    GameNotFound(u64),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Wrap an error with the turn context it occurred in.
    #[must_use]
    pub fn in_phase(self, game_id: u64, year: i32, phase: &'static str) -> Self {
        Self::TurnPhase {
            game_id,
            year,
            phase,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_wrapper_keeps_context() {
        let err = GameError::UnknownPlanet(7).in_phase(3, 2401, "planet_production");
        let text = err.to_string();
        assert!(text.contains("game 3"));
        assert!(text.contains("2401"));
        assert!(text.contains("planet_production"));
        assert!(text.contains("Planet not found: 7"));
    }
}
