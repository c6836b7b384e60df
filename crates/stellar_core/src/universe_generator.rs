//! Procedural universe generation.
//!
//! Generates a new map with:
//! - Planets placed by rejection sampling, never closer than the minimum
//!   planet distance
//! - Centre-weighted environments and two-tier mineral concentrations
//! - One homeworld per player, spread out by first fit over a shuffled
//!   planet list, all sharing the same minerals
//! - Secondary starting planets inside a distance band of the homeworld
//! - Starting designs, fleets and starbases with their specs computed
//!
//! Every random draw comes from the game's stream, so the same seed and
//! settings always produce the same universe.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cost::{Cargo, Mineral, MineralType};
use crate::design::ShipDesign;
use crate::discovery::discover;
use crate::error::{GameError, Result};
use crate::fleet::{Fleet, ShipToken};
use crate::game::GameSettings;
use crate::math::{Fixed, Vec2Fixed};
use crate::planet::Planet;
use crate::planet_names::random_names;
use crate::player::Player;
use crate::production::ProductionPlan;
use crate::race::{Hab, StartingFleet, StartingPlanet};
use crate::rules::{GameRng, Rules};
use crate::tech::TechCatalog;
use crate::universe::Universe;

/// Output of a successful generation.
#[derive(Debug, Clone)]
pub struct GeneratedUniverse {
    /// Planets and starting fleets, indices built.
    pub universe: Universe,
    /// Players with designs and initial intel.
    pub players: Vec<Player>,
    /// Map width and height.
    pub area: (i32, i32),
}

/// Builds the starting universe for a new game.
pub struct UniverseGenerator<'a> {
    settings: &'a GameSettings,
    rules: &'a Rules,
    catalog: &'a dyn TechCatalog,
}

impl<'a> UniverseGenerator<'a> {
    /// Create a generator.
    #[must_use]
    pub fn new(settings: &'a GameSettings, rules: &'a Rules, catalog: &'a dyn TechCatalog) -> Self {
        Self {
            settings,
            rules,
            catalog,
        }
    }

    /// Smallest allowed distance between two homeworlds.
    #[must_use]
    pub fn min_player_distance(&self, num_players: usize) -> i32 {
        let (width, height) = self.settings.size.area();
        let divisor = i32::try_from(num_players + 1).unwrap_or(i32::MAX);
        (width + height) / 2 / divisor
    }

    /// Generate planets, homeworlds and starting fleets for `players`, then
    /// run one discovery pass and one AI step for each of them.
    ///
    /// Fails with [`GameError::GenerationConstraint`] if planets or
    /// homeworlds cannot be placed; nothing is returned in that case.
    pub fn generate(
        &self,
        mut players: Vec<Player>,
        rng: &mut GameRng,
    ) -> Result<GeneratedUniverse> {
        let area = self.settings.size.area();
        let count = self.settings.size.num_planets(self.settings.density);
        let needed: usize = players
            .iter()
            .map(|p| p.race_spec.starting_planets.len())
            .sum();
        if needed > count {
            return Err(GameError::GenerationConstraint {
                constraint: "planet count",
                detail: format!("{needed} starting planets needed, map has {count}"),
            });
        }

        let mut planets = self.generate_planets(count, area, rng)?;
        self.assign_homeworlds(&mut planets, &players, rng)?;

        for player in &mut players {
            self.create_starting_designs(player)?;
        }

        let mut universe = Universe::new(planets);
        for player in &players {
            self.create_starting_fleets(&mut universe, player)?;
        }
        universe.compute_fleet_specs(&players)?;
        for fleet in &mut universe.fleets {
            fleet.fuel = fleet.spec.fuel_capacity;
        }
        universe.build_maps();
        universe.compute_planet_specs(&players, self.rules, self.catalog);

        for player in &mut players {
            player.init_planet_intels(&universe.planets);
        }
        let nums: Vec<u32> = players.iter().map(|p| p.num).collect();
        for &num in &nums {
            discover(num, &mut players, &universe, self.rules, self.rules.start_year)?;
        }
        for player in players.iter_mut().filter(|p| p.ai_controlled) {
            crate::ai::process_turn(player, &mut universe, self.rules, self.catalog)?;
        }

        tracing::debug!(
            planets = universe.planets.len(),
            fleets = universe.fleets.len(),
            players = players.len(),
            "universe generated"
        );

        Ok(GeneratedUniverse {
            universe,
            players,
            area,
        })
    }

    fn generate_planets(
        &self,
        count: usize,
        (width, height): (i32, i32),
        rng: &mut GameRng,
    ) -> Result<Vec<Planet>> {
        let names = random_names(count, rng);
        let min_distance = Fixed::from_num(self.rules.planet_min_distance);
        let min_distance_sq = min_distance * min_distance;
        let mut planets: Vec<Planet> = Vec::with_capacity(count);

        for (index, name) in names.into_iter().enumerate() {
            let mut rejections = 0;
            let position = loop {
                let candidate =
                    Vec2Fixed::from_ints(rng.gen_range(0..=width), rng.gen_range(0..=height));
                if planets
                    .iter()
                    .all(|p| p.position.distance_squared(candidate) > min_distance_sq)
                {
                    break candidate;
                }
                rejections += 1;
                if rejections >= self.rules.max_placement_attempts {
                    return Err(GameError::GenerationConstraint {
                        constraint: "planet placement",
                        detail: format!(
                            "no room for planet {} of {count} after {rejections} attempts",
                            index + 1
                        ),
                    });
                }
            };

            let num = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let mut planet = Planet::new(num, name, position);
            planet.hab = random_hab(rng);
            planet.mineral_concentration = self.random_concentration(planet.hab, rng);
            planets.push(planet);
        }

        Ok(planets)
    }

    /// Two-tier concentration with a germanium bonus on radioactive planets.
    fn random_concentration(&self, hab: Hab, rng: &mut GameRng) -> Mineral {
        let rules = self.rules;
        let mut conc = Mineral::default();
        for mineral in MineralType::ALL {
            let mut value = if rng.gen_range(0..100) < rules.low_concentration_chance {
                rng.gen_range(1..=30)
            } else {
                rng.gen_range(1..=50)
                    + rng.gen_range(0..50)
                    + rng.gen_range(0..50)
                    + rng.gen_range(0..50)
            };
            if mineral == MineralType::Germanium && hab.rad > rules.germanium_radiation_threshold {
                value += 2 * (hab.rad - rules.germanium_radiation_threshold);
            }
            *conc.get_mut(mineral) = value.min(rules.max_mineral_concentration);
        }
        conc
    }

    fn assign_homeworlds(
        &self,
        planets: &mut [Planet],
        players: &[Player],
        rng: &mut GameRng,
    ) -> Result<()> {
        let rules = self.rules;
        let min_distance = Fixed::from_num(self.min_player_distance(players.len()));
        let min_distance_sq = min_distance * min_distance;

        // every homeworld gets the same minerals
        let mut concentration = Mineral::default();
        let mut surface = Mineral::default();
        let (surface_low, surface_high) = rules.homeworld_surface_minerals;
        for mineral in MineralType::ALL {
            *concentration.get_mut(mineral) = rng.gen_range(rules.homeworld_min_concentration..=100);
            *surface.get_mut(mineral) = rng.gen_range(surface_low..=surface_high);
        }

        let mut order: Vec<usize> = (0..planets.len()).collect();
        order.shuffle(rng);

        let mut homeworlds: Vec<Vec2Fixed> = Vec::with_capacity(players.len());
        for player in players {
            let Some(&home_index) = order.iter().find(|&&i| {
                let planet = &planets[i];
                !planet.owned()
                    && homeworlds
                        .iter()
                        .all(|&h| h.distance_squared(planet.position) >= min_distance_sq)
            }) else {
                return Err(GameError::GenerationConstraint {
                    constraint: "homeworld spacing",
                    detail: format!(
                        "player {}: no free planet {min_distance} ly from every homeworld",
                        player.num
                    ),
                });
            };

            let mut starting = player.race_spec.starting_planets.iter();
            let Some(home_setup) = starting.next() else {
                continue;
            };
            let home = &mut planets[home_index];
            home.mineral_concentration = concentration;
            home.cargo = Cargo::new(surface.ironium, surface.boranium, surface.germanium, 0);
            self.settle(home, player, home_setup);
            let home_position = home.position;
            homeworlds.push(home_position);

            for setup in starting {
                let index = self.secondary_planet(planets, &order, home_position, player)?;
                let planet = &mut planets[index];
                planet.cargo = Cargo::default();
                self.settle(planet, player, setup);
            }
        }
        Ok(())
    }

    /// First unowned planet in the secondary distance band around `home`.
    fn secondary_planet(
        &self,
        planets: &[Planet],
        order: &[usize],
        home: Vec2Fixed,
        player: &Player,
    ) -> Result<usize> {
        let (low, high) = self.rules.secondary_planet_distance;
        let low_sq = Fixed::from_num(low) * Fixed::from_num(low);
        let high_sq = Fixed::from_num(high) * Fixed::from_num(high);
        order
            .iter()
            .copied()
            .find(|&i| {
                let planet = &planets[i];
                let dist_sq = planet.position.distance_squared(home);
                !planet.owned() && dist_sq >= low_sq && dist_sq <= high_sq
            })
            .ok_or_else(|| GameError::GenerationConstraint {
                constraint: "secondary planet band",
                detail: format!(
                    "no free planet {low}-{high} ly from player {}'s homeworld",
                    player.num
                ),
            })
    }

    /// Give a planet to a player with the race's starting installations.
    fn settle(&self, planet: &mut Planet, player: &Player, setup: &StartingPlanet) {
        planet.player_num = Some(player.num);
        planet.homeworld = setup.homeworld;
        planet.hab = player.race.hab_center();
        planet.set_population(setup.population);
        planet.mines = setup.mines;
        planet.factories = setup.factories;
        planet.defenses = setup.defenses;
        planet.scanner = setup.scanner;
        ProductionPlan::default().apply(planet);
    }

    /// One design per distinct starting fleet and starbase of the race.
    fn create_starting_designs(&self, player: &mut Player) -> Result<()> {
        let fleets: Vec<StartingFleet> = player
            .race_spec
            .starting_planets
            .iter()
            .flat_map(|p| p.starbase.iter().chain(p.fleets.iter()))
            .cloned()
            .collect();

        for fleet in fleets {
            if player.design_by_name(&fleet.name).is_some() {
                continue;
            }
            let design = ShipDesign::for_purpose(
                player.next_design_num(),
                player.num,
                &fleet.name,
                &fleet.hull_name,
                fleet.purpose,
                &player.race,
                &player.tech_levels,
                self.catalog,
            )?;
            player.designs.push(design);
        }
        Ok(())
    }

    fn create_starting_fleets(&self, universe: &mut Universe, player: &Player) -> Result<()> {
        let settled: Vec<(u32, Vec2Fixed, bool)> = universe
            .player_planets(player.num)
            .map(|p| (p.num, p.position, p.homeworld))
            .collect();

        for setup in &player.race_spec.starting_planets {
            let Some(&(planet_num, position, _)) =
                settled.iter().find(|(_, _, home)| *home == setup.homeworld)
            else {
                continue;
            };

            if let Some(starbase) = &setup.starbase {
                let design = self.starting_design(player, starbase)?;
                let mut fleet = Fleet::new(
                    universe.next_fleet_num(player.num),
                    player.num,
                    starbase.name.clone(),
                    position,
                    vec![ShipToken::new(design, 1)],
                );
                fleet.starbase = true;
                fleet.orbiting_planet_num = Some(planet_num);
                fleet.purpose = Some(starbase.purpose);
                universe.add_fleet(fleet);
            }

            for starting in &setup.fleets {
                let design = self.starting_design(player, starting)?;
                let num = universe.next_fleet_num(player.num);
                let mut fleet = Fleet::new(
                    num,
                    player.num,
                    format!("{} #{num}", starting.name),
                    position,
                    vec![ShipToken::new(design, 1)],
                );
                fleet.orbiting_planet_num = Some(planet_num);
                fleet.purpose = Some(starting.purpose);
                universe.add_fleet(fleet);
            }
        }
        Ok(())
    }

    fn starting_design(&self, player: &Player, fleet: &StartingFleet) -> Result<u32> {
        player
            .design_by_name(&fleet.name)
            .map(|d| d.num)
            .ok_or_else(|| GameError::InvalidState(format!("missing design '{}'", fleet.name)))
    }
}

/// Centre-weighted environment: each axis is the sum of two uniform draws.
fn random_hab(rng: &mut GameRng) -> Hab {
    let mut axis = || rng.gen_range(1..=50) + rng.gen_range(0..50);
    Hab::new(axis(), axis(), axis())
}
