//! Planets and their derived stats.
//!
//! A planet's [`PlanetSpec`] is a cache. Anything that changes population,
//! installations, ownership or tech must be followed by
//! [`Planet::compute_spec`] before the spec is read again in the same phase.

use serde::{Deserialize, Serialize};

use crate::cost::{Cargo, Mineral, MineralType};
use crate::fleet::Fleet;
use crate::math::Vec2Fixed;
use crate::player::{Player, PlayerNum};
use crate::production::ProductionQueueItem;
use crate::race::{Hab, Race};
use crate::rules::Rules;
use crate::tech::TechCatalog;

/// A planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Global number, starting at 1; never reused.
    pub num: u32,
    /// Display name.
    pub name: String,
    /// Position on the map.
    pub position: Vec2Fixed,
    /// Owner; `None` for unowned planets.
    pub player_num: Option<PlayerNum>,
    /// Current environment.
    pub hab: Hab,
    /// Mineral concentration per mineral.
    pub mineral_concentration: Mineral,
    /// Mine-years accumulated towards the next concentration drop.
    pub mine_years: Mineral,
    /// Surface minerals and colonists.
    pub cargo: Cargo,
    /// Mines.
    pub mines: i32,
    /// Factories.
    pub factories: i32,
    /// Defenses.
    pub defenses: i32,
    /// Home world of its owner.
    pub homeworld: bool,
    /// Has a planetary scanner.
    pub scanner: bool,
    /// Only production leftovers go to research.
    pub contribute_only_leftover_to_research: bool,
    /// Ordered build queue.
    pub production_queue: Vec<ProductionQueueItem>,
    /// Planet that fleets with a route order continue on to.
    pub route_target: Option<u32>,
    /// Derived stats, recomputed each turn.
    #[serde(default)]
    pub spec: PlanetSpec,
}

impl Planet {
    /// Create an unowned, empty planet.
    #[must_use]
    pub fn new(num: u32, name: impl Into<String>, position: Vec2Fixed) -> Self {
        Self {
            num,
            name: name.into(),
            position,
            player_num: None,
            hab: Hab::default(),
            mineral_concentration: Mineral::default(),
            mine_years: Mineral::default(),
            cargo: Cargo::default(),
            mines: 0,
            factories: 0,
            defenses: 0,
            homeworld: false,
            scanner: false,
            contribute_only_leftover_to_research: false,
            production_queue: Vec::new(),
            route_target: None,
            spec: PlanetSpec::default(),
        }
    }

    /// Number of people on the planet.
    #[must_use]
    pub const fn population(&self) -> i32 {
        self.cargo.population()
    }

    /// Set the number of people (stored as colonist kT).
    pub fn set_population(&mut self, population: i32) {
        self.cargo.colonists = population.max(0) / 100;
    }

    /// Owned by `player`.
    #[must_use]
    pub fn owned_by(&self, player: PlayerNum) -> bool {
        self.player_num == Some(player)
    }

    /// Owned by anyone.
    #[must_use]
    pub const fn owned(&self) -> bool {
        self.player_num.is_some()
    }

    /// Strip ownership and everything the owner built.
    pub fn empty(&mut self) {
        self.player_num = None;
        self.cargo.colonists = 0;
        self.mines = 0;
        self.factories = 0;
        self.defenses = 0;
        self.scanner = false;
        self.homeworld = false;
        self.production_queue.clear();
        self.route_target = None;
    }

    /// Recompute the cached spec.
    pub fn compute_spec(
        &mut self,
        player: Option<&Player>,
        starbase: Option<&Fleet>,
        rules: &Rules,
        catalog: &dyn TechCatalog,
    ) {
        self.spec = PlanetSpec::compute(self, player, starbase, rules, catalog);
    }

    /// Population change for this year, rounded to the nearest 100.
    ///
    /// Below a quarter of capacity growth is the race's full rate scaled by
    /// habitability; above it the crowding factor `16/9 (1 - c)²` slows it.
    /// Hostile planets and overcrowded planets lose population.
    #[must_use]
    pub fn growth_amount(&self, race: &Race) -> i32 {
        let pop = i64::from(self.population());
        let max_pop = i64::from(self.spec.max_population.max(1));
        let hab = i64::from(self.spec.hab_value);

        let growth = if pop > max_pop {
            // 4% of the overflow dies, at least 100 people
            -((pop - max_pop) * 4 / 100).max(100)
        } else if hab > 0 {
            let base = i128::from(pop * i64::from(race.growth_rate) * hab / 10_000);
            if pop * 4 > max_pop {
                let free = i128::from(max_pop - pop);
                let max = i128::from(max_pop);
                (base * 16 * free * free / (9 * max * max)) as i64
            } else {
                base as i64
            }
        } else {
            pop * hab / 1000
        };

        round_to_nearest_100(growth) as i32
    }

    /// Surface minerals mined this year.
    #[must_use]
    pub fn mining_output(&self) -> Mineral {
        self.spec.mining_output
    }

    /// Apply a year of mining: add output to cargo and decay concentration.
    pub fn mine(&mut self, rules: &Rules) {
        let output = self.spec.mining_output;
        self.cargo.add_minerals(output);

        let operating = self.spec.operating_mines;
        let floor = if self.homeworld {
            rules.homeworld_min_concentration_floor
        } else {
            rules.min_concentration_floor
        };
        for mineral in MineralType::ALL {
            *self.mine_years.get_mut(mineral) += operating;
            let conc = self.mineral_concentration.get(mineral);
            if conc <= floor {
                continue;
            }
            let threshold = (rules.mineral_decay_factor / (conc * conc)).max(1);
            let years = self.mine_years.get(mineral);
            if years > threshold {
                *self.mineral_concentration.get_mut(mineral) = (conc - 1).max(floor);
                *self.mine_years.get_mut(mineral) = years - threshold;
            }
        }
    }
}

/// Round to the nearest 100, halves away from zero.
#[must_use]
pub fn round_to_nearest_100(value: i64) -> i64 {
    let rounded = (value.abs() + 50) / 100 * 100;
    rounded * value.signum()
}

/// Derived planet stats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetSpec {
    /// Habitability for the owner (or 0 when unowned).
    pub hab_value: i32,
    /// Capacity for the owner.
    pub max_population: i32,
    /// Expected population change this year.
    pub growth_amount: i32,
    /// Mines that have enough people to run them.
    pub operating_mines: i32,
    /// Factories that have enough people to run them.
    pub operating_factories: i32,
    /// Most mines the planet can ever operate.
    pub max_mines: i32,
    /// Most factories the planet can ever operate.
    pub max_factories: i32,
    /// Most defenses the planet can hold.
    pub max_defenses: i32,
    /// Minerals mined per year.
    pub mining_output: Mineral,
    /// Total resources per year.
    pub resources_per_year: i32,
    /// Share of resources going to research.
    pub resources_per_year_research: i32,
    /// Resources left for production.
    pub resources_per_year_available: i32,
    /// Name of the installed planetary scanner.
    pub scanner: Option<String>,
    /// Normal scanner range.
    pub scan_range: i32,
    /// Penetrating scanner range.
    pub scan_range_pen: i32,
    /// A starbase orbits the planet.
    pub has_starbase: bool,
    /// Design number of the starbase.
    pub starbase_design_num: Option<u32>,
    /// Space dock size; 0 means ships cannot be built here.
    pub dock_capacity: i32,
    /// The starbase carries a stargate.
    pub has_stargate: bool,
}

impl PlanetSpec {
    /// Compute the spec for a planet.
    #[must_use]
    pub fn compute(
        planet: &Planet,
        player: Option<&Player>,
        starbase: Option<&Fleet>,
        rules: &Rules,
        catalog: &dyn TechCatalog,
    ) -> Self {
        let mut spec = Self {
            max_defenses: rules.max_defenses,
            ..Self::default()
        };

        if let Some(starbase) = starbase {
            spec.has_starbase = true;
            spec.starbase_design_num = starbase.tokens.first().map(|t| t.design_num);
            spec.dock_capacity = starbase.spec.space_dock;
            spec.has_stargate = starbase.spec.stargate.is_some();
        }

        let Some(player) = player else {
            return spec;
        };
        let race = &player.race;

        spec.hab_value = race.habitability(planet.hab);
        let hab_percent = spec.hab_value.max(rules.min_max_population_percent);
        spec.max_population = (i64::from(rules.max_population) * i64::from(hab_percent) / 100) as i32;

        let pop = i64::from(planet.population());
        let runnable = |per_10k: i32| (pop * i64::from(per_10k) / 10_000) as i32;
        spec.max_mines =
            (i64::from(spec.max_population) * i64::from(race.num_mines) / 10_000) as i32;
        spec.max_factories =
            (i64::from(spec.max_population) * i64::from(race.num_factories) / 10_000) as i32;
        spec.operating_mines = planet.mines.min(runnable(race.num_mines));
        spec.operating_factories = planet.factories.min(runnable(race.num_factories));

        let mine = |conc: i32| spec.operating_mines * conc * race.mine_output / 1000;
        spec.mining_output = Mineral::new(
            mine(planet.mineral_concentration.ironium),
            mine(planet.mineral_concentration.boranium),
            mine(planet.mineral_concentration.germanium),
        );

        let from_people = planet.population() / race.pop_efficiency.max(1);
        let from_factories = spec.operating_factories * race.factory_output / 10;
        spec.resources_per_year = from_people + from_factories;
        spec.resources_per_year_research = if planet.contribute_only_leftover_to_research {
            0
        } else {
            spec.resources_per_year * player.research_amount / 100
        };
        spec.resources_per_year_available =
            spec.resources_per_year - spec.resources_per_year_research;

        if planet.scanner {
            if let Some(scanner) = catalog.best_planetary_scanner(race, &player.tech_levels) {
                spec.scanner = Some(scanner.name.clone());
                spec.scan_range = scanner.scan_range;
                spec.scan_range_pen = scanner.scan_range_pen;
            }
        }

        // growth needs the fields above
        let mut probe = planet.clone();
        probe.spec = spec.clone();
        spec.growth_amount = probe.growth_amount(race);

        spec
    }
}
