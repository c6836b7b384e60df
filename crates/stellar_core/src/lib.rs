//! # Stellar Core
//!
//! Deterministic simulation core for a turn-based 4X space-strategy game.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No network or file IO (persistence goes through [`persistence::GameStore`])
//! - No system randomness (every game carries its own seeded stream)
//! - No floating-point math on the map (positions are fixed-point)
//!
//! A game is created with [`game::FullGame::create`], which runs the
//! [`universe_generator`], and advanced one year at a time with
//! [`turn::TurnGenerator`].
//!
//! ## Crate Structure
//!
//! - [`rules`] - Tunable constants, map tables and the per-game random stream
//! - [`tech`] - Tech levels, hulls, components and the tech catalog
//! - [`race`] - Races and their derived properties
//! - [`design`] - Ship designs and their derived specs
//! - [`planet`], [`fleet`], [`universe`] - Map objects
//! - [`player`], [`intel`] - Players and what they know
//! - [`universe_generator`] - Procedural universe generation
//! - [`production`] - Production queue engine
//! - [`discovery`] - Scanning and fog of war
//! - [`turn`] - Turn generation pipeline
//! - [`ai`] - Built-in AI player
//! - [`persistence`] - Game snapshots and stores

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod cost;
pub mod design;
pub mod discovery;
pub mod error;
pub mod fleet;
pub mod game;
pub mod intel;
pub mod math;
pub mod movement;
pub mod persistence;
pub mod planet;
pub mod planet_names;
pub mod player;
pub mod production;
pub mod race;
pub mod research;
pub mod rules;
pub mod score;
pub mod tech;
pub mod turn;
pub mod universe;
pub mod universe_generator;
pub mod upkeep;
pub mod waypoint_tasks;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cost::{allocate_partial_build, num_buildable, Cargo, Cost, Mineral};
    pub use crate::design::{ShipDesign, ShipDesignSpec};
    pub use crate::discovery::discover;
    pub use crate::error::{GameError, Result};
    pub use crate::fleet::{Fleet, FleetKey, ShipToken, Waypoint, WaypointTask};
    pub use crate::game::{FullGame, Game, GameSettings, GameState, PlayerSetup};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::persistence::{GameStore, MemoryGameStore};
    pub use crate::planet::{Planet, PlanetSpec};
    pub use crate::player::{Player, PlayerMessage, PlayerMessageKind, PlayerNum};
    pub use crate::production::{
        AutoKind, ConcreteKind, ProductionPlan, ProductionQueueEngine, ProductionQueueItem,
        ProductionResult, QueueItemKind,
    };
    pub use crate::race::{Hab, PrimaryRacialTrait, Race};
    pub use crate::rules::{Density, GameRng, Rules, Size};
    pub use crate::score::{VictoryCondition, VictoryConditions};
    pub use crate::tech::{StandardCatalog, TechCatalog, TechField, TechLevel};
    pub use crate::turn::{TurnGenerator, TurnSummary};
    pub use crate::universe::Universe;
    pub use crate::universe_generator::{GeneratedUniverse, UniverseGenerator};
}
