//! Races, racial traits and habitability.
//!
//! A player's [`Race`] is a value copy of the template it was created from;
//! players never share a race instance. [`RaceSpec`] is derived from the race
//! and decides starting tech, starting fleets and a few scanning rules.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_sqrt, Fixed};
use crate::tech::{TechField, TechLevel};

/// Primary racial trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimaryRacialTrait {
    /// Hyper-Expansion.
    HyperExpansion,
    /// Super-Stealth.
    SuperStealth,
    /// War Monger.
    WarMonger,
    /// Claim Adjuster.
    ClaimAdjuster,
    /// Inner-Strength.
    InnerStrength,
    /// Space Demolition.
    SpaceDemolition,
    /// Packet Physics.
    PacketPhysics,
    /// Interstellar Traveler.
    InterstellarTraveler,
    /// Alternate Reality.
    AlternateReality,
    /// Jack of all Trades.
    #[default]
    JackOfAllTrades,
}

/// Lesser racial trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LesserRacialTrait {
    /// Improved fuel efficiency.
    ImprovedFuelEfficiency,
    /// Total terraforming.
    TotalTerraforming,
    /// Advanced remote mining.
    AdvancedRemoteMining,
    /// Improved starbases.
    ImprovedStarbases,
    /// Generalized research.
    GeneralizedResearch,
    /// Ultimate recycling.
    UltimateRecycling,
    /// Mineral alchemy.
    MineralAlchemy,
    /// No ram scoop engines.
    NoRamScoopEngines,
    /// Cheap engines.
    CheapEngines,
    /// Only basic remote mining.
    OnlyBasicRemoteMining,
    /// No advanced scanners.
    NoAdvancedScanners,
    /// Low starting population.
    LowStartingPopulation,
    /// Bleeding edge technology.
    BleedingEdgeTechnology,
    /// Regenerating shields.
    RegeneratingShields,
}

/// Gravity, temperature and radiation, each on a 0..=100 click scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hab {
    /// Gravity.
    pub grav: i32,
    /// Temperature.
    pub temp: i32,
    /// Radiation.
    pub rad: i32,
}

impl Hab {
    /// Create a new hab.
    #[must_use]
    pub const fn new(grav: i32, temp: i32, rad: i32) -> Self {
        Self { grav, temp, rad }
    }

    const fn dims(&self) -> [i32; 3] {
        [self.grav, self.temp, self.rad]
    }
}

/// Research cost class for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResearchCostLevel {
    /// 75% more expensive.
    Extra,
    /// Standard cost.
    #[default]
    Standard,
    /// Half cost.
    Less,
}

impl ResearchCostLevel {
    /// Cost multiplier in percent.
    #[must_use]
    pub const fn percent(self) -> i32 {
        match self {
            Self::Extra => 175,
            Self::Standard => 100,
            Self::Less => 50,
        }
    }
}

/// Research cost class per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResearchCost {
    /// Energy.
    pub energy: ResearchCostLevel,
    /// Weapons.
    pub weapons: ResearchCostLevel,
    /// Propulsion.
    pub propulsion: ResearchCostLevel,
    /// Construction.
    pub construction: ResearchCostLevel,
    /// Electronics.
    pub electronics: ResearchCostLevel,
    /// Biotechnology.
    pub biotechnology: ResearchCostLevel,
}

impl ResearchCost {
    /// Cost class of one field.
    #[must_use]
    pub const fn get(&self, field: TechField) -> ResearchCostLevel {
        match field {
            TechField::Energy => self.energy,
            TechField::Weapons => self.weapons,
            TechField::Propulsion => self.propulsion,
            TechField::Construction => self.construction,
            TechField::Electronics => self.electronics,
            TechField::Biotechnology => self.biotechnology,
        }
    }
}

/// A playable race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Race {
    /// Singular name.
    pub name: String,
    /// Plural name.
    pub plural_name: String,
    /// Primary racial trait.
    pub prt: PrimaryRacialTrait,
    /// Lesser racial traits.
    pub lrts: Vec<LesserRacialTrait>,
    /// Lowest habitable values.
    pub hab_low: Hab,
    /// Highest habitable values.
    pub hab_high: Hab,
    /// Immune to gravity.
    pub immune_grav: bool,
    /// Immune to temperature.
    pub immune_temp: bool,
    /// Immune to radiation.
    pub immune_rad: bool,
    /// Maximum yearly growth in percent.
    pub growth_rate: i32,
    /// Colonists needed to produce one resource.
    pub pop_efficiency: i32,
    /// Resources produced by 10 factories.
    pub factory_output: i32,
    /// Resource cost of one factory.
    pub factory_cost: i32,
    /// Factories operable per 10,000 colonists.
    pub num_factories: i32,
    /// Factories cost one less germanium.
    pub factories_cost_less: bool,
    /// Minerals mined by 10 mines at 100% concentration.
    pub mine_output: i32,
    /// Resource cost of one mine.
    pub mine_cost: i32,
    /// Mines operable per 10,000 colonists.
    pub num_mines: i32,
    /// Research cost classes.
    pub research_cost: ResearchCost,
}

impl Default for Race {
    fn default() -> Self {
        Self {
            name: "Humanoid".into(),
            plural_name: "Humanoids".into(),
            prt: PrimaryRacialTrait::JackOfAllTrades,
            lrts: Vec::new(),
            hab_low: Hab::new(15, 15, 15),
            hab_high: Hab::new(85, 85, 85),
            immune_grav: false,
            immune_temp: false,
            immune_rad: false,
            growth_rate: 15,
            pop_efficiency: 1000,
            factory_output: 10,
            factory_cost: 10,
            num_factories: 10,
            factories_cost_less: false,
            mine_output: 10,
            mine_cost: 5,
            num_mines: 10,
            research_cost: ResearchCost::default(),
        }
    }
}

impl Race {
    /// Whether the race has a lesser trait.
    #[must_use]
    pub fn has_lrt(&self, lrt: LesserRacialTrait) -> bool {
        self.lrts.contains(&lrt)
    }

    /// Midpoint of each habitable range. Immune dimensions report 50.
    #[must_use]
    pub fn hab_center(&self) -> Hab {
        let centre = |low: i32, high: i32, immune: bool| {
            if immune {
                50
            } else {
                (low + high) / 2
            }
        };
        Hab::new(
            centre(self.hab_low.grav, self.hab_high.grav, self.immune_grav),
            centre(self.hab_low.temp, self.hab_high.temp, self.immune_temp),
            centre(self.hab_low.rad, self.hab_high.rad, self.immune_rad),
        )
    }

    /// Habitability of a planet for this race, in percent.
    ///
    /// Positive for green planets (up to 100 for ideal), negative for red
    /// planets: every click outside a range costs one percent, capped at 15
    /// per dimension.
    #[must_use]
    pub fn habitability(&self, hab: Hab) -> i32 {
        let lows = self.hab_low.dims();
        let highs = self.hab_high.dims();
        let values = hab.dims();
        let immune = [self.immune_grav, self.immune_temp, self.immune_rad];
        let centre = self.hab_center().dims();

        let mut value_points: i64 = 0;
        let mut red_value = 0;
        let mut ideality: i64 = 10_000;

        for i in 0..3 {
            if immune[i] {
                value_points += 10_000;
                continue;
            }
            let (low, high, value) = (lows[i], highs[i], values[i]);
            if value >= low && value <= high {
                let radius = (centre[i] - low).max(1);
                let mut from_ideal = i64::from((value - centre[i]).abs()) * 100 / i64::from(radius);
                let poor = (from_ideal - 30).max(0);
                from_ideal = 100 - from_ideal;
                value_points += from_ideal * from_ideal;
                if poor > 0 {
                    ideality = ideality * (i64::from(radius) * 2 - poor) / (i64::from(radius) * 2);
                }
            } else {
                let red = if value < low { low - value } else { value - high };
                red_value += red.min(15);
            }
        }

        if red_value != 0 {
            return -red_value;
        }

        let mean = Fixed::from_num(value_points) / Fixed::from_num(3);
        let root = fixed_sqrt(mean) + Fixed::from_num(0.9);
        let points: i64 = root.to_num::<i64>();
        (points * ideality / 10_000) as i32
    }

    /// Derived race properties.
    #[must_use]
    pub fn spec(&self) -> RaceSpec {
        RaceSpec::compute(self)
    }
}

/// What a starting fleet is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipDesignPurpose {
    /// Long range scout.
    Scout,
    /// Colony ship.
    Colonizer,
    /// Freighter.
    Freighter,
    /// Armed escort.
    Fighter,
    /// Orbital fort.
    Fort,
    /// Full starbase.
    Starbase,
}

/// A fleet a race starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingFleet {
    /// Design name.
    pub name: String,
    /// Hull name.
    pub hull_name: String,
    /// What the design is for.
    pub purpose: ShipDesignPurpose,
}

/// A planet a race starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingPlanet {
    /// Starting population.
    pub population: i32,
    /// Home world (as opposed to a secondary starting planet).
    pub homeworld: bool,
    /// Starbase design built over the planet, if any.
    pub starbase: Option<StartingFleet>,
    /// Mines.
    pub mines: i32,
    /// Factories.
    pub factories: i32,
    /// Defenses.
    pub defenses: i32,
    /// Install a planetary scanner.
    pub scanner: bool,
    /// Fleets orbiting the planet at the start.
    pub fleets: Vec<StartingFleet>,
}

/// Derived race properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSpec {
    /// Tech levels the race starts with.
    pub starting_tech_levels: TechLevel,
    /// Planets (homeworld first) the race starts with.
    pub starting_planets: Vec<StartingPlanet>,
    /// Scanning a fleet reveals the full design of its ships.
    pub discover_design_on_scan: bool,
    /// Cost multiplier per research field in percent.
    pub research_cost_percent: [i32; 6],
    /// Every owned fleet is a scanner of at least this range.
    pub built_in_scanner_range: i32,
}

impl RaceSpec {
    fn compute(race: &Race) -> Self {
        let starting_tech_levels = match race.prt {
            PrimaryRacialTrait::JackOfAllTrades => TechLevel::new(3, 3, 3, 3, 3, 3),
            PrimaryRacialTrait::SuperStealth => TechLevel::new(0, 0, 0, 0, 5, 0),
            PrimaryRacialTrait::WarMonger => TechLevel::new(1, 6, 1, 0, 0, 0),
            PrimaryRacialTrait::ClaimAdjuster => TechLevel::new(1, 0, 1, 2, 0, 6),
            PrimaryRacialTrait::SpaceDemolition => TechLevel::new(0, 0, 2, 0, 0, 2),
            PrimaryRacialTrait::PacketPhysics => TechLevel::new(4, 0, 0, 0, 0, 0),
            PrimaryRacialTrait::InterstellarTraveler => TechLevel::new(0, 0, 5, 5, 0, 0),
            PrimaryRacialTrait::AlternateReality => TechLevel::new(1, 1, 1, 1, 1, 1),
            PrimaryRacialTrait::HyperExpansion | PrimaryRacialTrait::InnerStrength => {
                TechLevel::default()
            }
        };

        let mut research_cost_percent = [100; 6];
        for (slot, field) in research_cost_percent.iter_mut().zip(TechField::ALL) {
            *slot = race.research_cost.get(field).percent();
        }

        let population_factor = if race.has_lrt(LesserRacialTrait::LowStartingPopulation) {
            70
        } else {
            100
        };

        let scout = StartingFleet {
            name: "Long Range Scout".into(),
            hull_name: crate::tech::names::SCOUT.into(),
            purpose: ShipDesignPurpose::Scout,
        };
        let colony_ship = StartingFleet {
            name: "Santa Maria".into(),
            hull_name: crate::tech::names::COLONY_SHIP.into(),
            purpose: ShipDesignPurpose::Colonizer,
        };
        let starbase = StartingFleet {
            name: "Starbase".into(),
            hull_name: crate::tech::names::SPACE_STATION.into(),
            purpose: ShipDesignPurpose::Starbase,
        };

        let mut starting_planets = vec![StartingPlanet {
            population: 25_000 * population_factor / 100,
            homeworld: true,
            starbase: Some(starbase),
            mines: 10,
            factories: 10,
            defenses: 10,
            scanner: true,
            fleets: vec![scout.clone(), colony_ship],
        }];

        if matches!(
            race.prt,
            PrimaryRacialTrait::InterstellarTraveler | PrimaryRacialTrait::PacketPhysics
        ) {
            starting_planets.push(StartingPlanet {
                population: 10_000 * population_factor / 100,
                homeworld: false,
                starbase: Some(StartingFleet {
                    name: "Orbital Fort".into(),
                    hull_name: crate::tech::names::ORBITAL_FORT.into(),
                    purpose: ShipDesignPurpose::Fort,
                }),
                mines: 4,
                factories: 4,
                defenses: 0,
                scanner: true,
                fleets: vec![scout],
            });
        }

        Self {
            starting_tech_levels,
            starting_planets,
            discover_design_on_scan: race.prt == PrimaryRacialTrait::SuperStealth,
            research_cost_percent,
            built_in_scanner_range: 0,
        }
    }

    /// Cost multiplier for one research field, in percent.
    #[must_use]
    pub fn research_cost_percent(&self, field: TechField) -> i32 {
        let index = TechField::ALL.iter().position(|&f| f == field).unwrap_or(0);
        self.research_cost_percent[index]
    }
}
