//! Tunable game rules, map size tables and the per-game random stream.
//!
//! A [`Rules`] value is snapshotted into every game at creation and never
//! changes afterwards. It can be written by hand in RON:
//!
//! ```
//! use stellar_core::rules::Rules;
//!
//! let rules = Rules::from_ron_str("(seed: 42, planet_min_distance: 20)").unwrap();
//! assert_eq!(rules.seed, 42);
//! assert_eq!(rules.planet_min_distance, 20);
//! // Everything not mentioned keeps its default.
//! assert_eq!(rules.max_placement_attempts, 1000);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// The per-game random stream. The only source of randomness in the core.
pub type GameRng = ChaCha8Rng;

/// Map size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Size {
    /// 400 x 400.
    Tiny,
    /// 600 x 400.
    TinyWide,
    /// 800 x 800.
    #[default]
    Small,
    /// 1200 x 800.
    SmallWide,
    /// 1200 x 1200.
    Medium,
    /// 1800 x 1200.
    MediumWide,
    /// 1600 x 1600.
    Large,
    /// 2000 x 2000.
    Huge,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Self; 8] = [
        Self::Tiny,
        Self::TinyWide,
        Self::Small,
        Self::SmallWide,
        Self::Medium,
        Self::MediumWide,
        Self::Large,
        Self::Huge,
    ];

    /// Map area (width, height) in light-years.
    #[must_use]
    pub const fn area(self) -> (i32, i32) {
        match self {
            Self::Tiny => (400, 400),
            Self::TinyWide => (600, 400),
            Self::Small => (800, 800),
            Self::SmallWide => (1200, 800),
            Self::Medium => (1200, 1200),
            Self::MediumWide => (1800, 1200),
            Self::Large => (1600, 1600),
            Self::Huge => (2000, 2000),
        }
    }

    /// Number of planets for a density on this map size.
    #[must_use]
    pub const fn num_planets(self, density: Density) -> usize {
        let row: [usize; 4] = match self {
            Self::Tiny => [24, 32, 40, 60],
            Self::TinyWide => [36, 48, 60, 90],
            Self::Small => [96, 128, 160, 240],
            Self::SmallWide => [144, 192, 240, 360],
            Self::Medium => [216, 288, 360, 540],
            Self::MediumWide => [324, 432, 540, 810],
            Self::Large => [384, 512, 640, 960],
            Self::Huge => [600, 800, 1000, 1500],
        };
        row[density as usize]
    }
}

/// Planet density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Density {
    /// Fewest planets.
    Sparse = 0,
    /// Standard.
    #[default]
    Normal = 1,
    /// More planets.
    Dense = 2,
    /// Most planets.
    Packed = 3,
}

impl Density {
    /// Every density, sparsest first.
    pub const ALL: [Self; 4] = [Self::Sparse, Self::Normal, Self::Dense, Self::Packed];
}

/// Tunable constants for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Seed of the game's random stream.
    pub seed: u64,
    /// Year the game starts in.
    pub start_year: i32,

    /// No two planets may be closer than this, in light-years.
    pub planet_min_distance: i32,
    /// Consecutive rejected samples before a placement is abandoned.
    pub max_placement_attempts: u32,
    /// Chance (percent) that a planet draws a low mineral concentration.
    pub low_concentration_chance: i32,
    /// Radiation above which germanium concentration gets a bonus.
    pub germanium_radiation_threshold: i32,
    /// Upper bound on any mineral concentration.
    pub max_mineral_concentration: i32,
    /// Minimum concentration shared by every homeworld.
    pub homeworld_min_concentration: i32,
    /// Range of surface minerals (per mineral) shared by every homeworld.
    pub homeworld_surface_minerals: (i32, i32),
    /// Distance band for secondary starting planets, in light-years.
    pub secondary_planet_distance: (i32, i32),
    /// Concentration floor for homeworlds once mining decays it.
    pub homeworld_min_concentration_floor: i32,
    /// Concentration floor for every other planet.
    pub min_concentration_floor: i32,
    /// Mine-years per point of concentration lost is this divided by conc².
    pub mineral_decay_factor: i32,

    /// Maximum relative error (percent) of scanned population counts.
    pub population_scanner_error: i32,
    /// Smallest max population a habitable planet can have, as a percent.
    pub min_max_population_percent: i32,
    /// Capacity of a 100% planet.
    pub max_population: i32,
    /// Most defenses a planet can hold.
    pub max_defenses: i32,
    /// Highest level in any tech field.
    pub max_tech_level: i32,
    /// Base research cost per level before race multipliers.
    pub tech_base_cost: Vec<i32>,
    /// Research share (percent) a new player starts with.
    pub default_research_percent: i32,
    /// Percent of armor repaired per year while orbiting an own starbase.
    pub starbase_repair_percent: i32,
    /// Percent of armor repaired per year while moving.
    pub moving_repair_percent: i32,
    /// Percent of armor repaired per year while orbiting.
    pub orbiting_repair_percent: i32,
    /// Warp a ship can always reach on ram scoops without spending fuel.
    pub free_warp: i32,
    /// Population every new colony starts with at minimum (colonist kT).
    pub min_colonists: i32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            seed: 0,
            start_year: 2400,
            planet_min_distance: 15,
            max_placement_attempts: 1000,
            low_concentration_chance: 30,
            germanium_radiation_threshold: 80,
            max_mineral_concentration: 200,
            homeworld_min_concentration: 30,
            homeworld_surface_minerals: (300, 1000),
            secondary_planet_distance: (30, 180),
            homeworld_min_concentration_floor: 30,
            min_concentration_floor: 1,
            mineral_decay_factor: 1_500_000,
            population_scanner_error: 20,
            min_max_population_percent: 5,
            max_population: 1_000_000,
            max_defenses: 100,
            max_tech_level: 26,
            tech_base_cost: vec![
                50, 80, 130, 210, 340, 550, 890, 1440, 2330, 3770, 6100, 9870, 13850, 18040,
                22440, 27050, 31870, 36900, 42140, 47590, 53250, 59120, 65200, 71490, 77990,
                84700,
            ],
            default_research_percent: 15,
            starbase_repair_percent: 20,
            moving_repair_percent: 1,
            orbiting_repair_percent: 3,
            free_warp: 1,
            min_colonists: 1,
        }
    }
}

impl Rules {
    /// Default rules with a specific seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse rules from RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParse {
            path: "<rules>".to_string(),
            message: e.to_string(),
        })
    }

    /// A fresh random stream positioned at the start of this game's seed.
    #[must_use]
    pub fn new_rng(&self) -> GameRng {
        GameRng::seed_from_u64(self.seed)
    }

    /// Base research cost of reaching `level` (1-based) in a field.
    #[must_use]
    pub fn base_research_cost(&self, level: i32) -> i32 {
        let index = usize::try_from(level.max(1) - 1).unwrap_or(0);
        self.tech_base_cost
            .get(index)
            .or_else(|| self.tech_base_cost.last())
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_planet_table_corners() {
        assert_eq!(Size::Tiny.num_planets(Density::Sparse), 24);
        assert_eq!(Size::Huge.num_planets(Density::Packed), 1500);
        assert_eq!(Size::MediumWide.num_planets(Density::Normal), 432);
        assert_eq!(Size::SmallWide.area(), (1200, 800));
    }

    #[test]
    fn test_rng_is_seeded() {
        let rules = Rules::with_seed(99);
        let a: u64 = rules.new_rng().gen();
        let b: u64 = rules.new_rng().gen();
        assert_eq!(a, b);
        let c: u64 = Rules::with_seed(100).new_rng().gen();
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_ron_reports_parse_errors() {
        let err = Rules::from_ron_str("(seed: \"nope\")").unwrap_err();
        assert!(matches!(err, GameError::DataParse { .. }));
    }

    #[test]
    fn test_base_research_cost_clamps() {
        let rules = Rules::default();
        assert_eq!(rules.base_research_cost(1), 50);
        assert_eq!(rules.base_research_cost(26), 84700);
        assert_eq!(rules.base_research_cost(40), 84700);
    }
}
