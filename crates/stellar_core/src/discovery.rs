//! Scanning and fog of war.
//!
//! Once per player per year, [`discover`] ages the player's planet intel and
//! re-derives what the player can see from the true state of the universe.
//! Planet intel is updated in place; fleet intel is rebuilt from scratch and
//! design intel only ever grows.
//!
//! The result depends only on the universe, the player's scanners and the
//! game seed, so a second call in the same year sees the same things.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, SeedableRng};

use crate::error::{GameError, Result};
use crate::fleet::{Fleet, FleetKey};
use crate::intel::{DesignKey, FleetIntel, PlanetIntel, PlayerIntel, ShipDesignIntel};
use crate::math::{Fixed, Vec2Fixed};
use crate::planet::Planet;
use crate::player::{Player, PlayerNum};
use crate::rules::{GameRng, Rules};
use crate::universe::Universe;

/// Denominator of cloak factors.
const CLOAK_SCALE: i64 = 10_000;

/// Scanner coverage from one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanner {
    /// Where the scanner sits.
    pub position: Vec2Fixed,
    /// Normal range in ly.
    pub range: i32,
    /// Penetrating range in ly.
    pub range_pen: i32,
    /// Percent of enemy cloaking ignored.
    pub reduce_cloaking: i32,
}

/// A scanner that sees cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CargoScanner {
    /// Where the scanner sits.
    pub position: Vec2Fixed,
    /// Normal range in ly.
    pub range: i32,
    /// Sees fleet cargo.
    pub fleet_cargo: bool,
    /// Sees planet surface minerals.
    pub planet_cargo: bool,
}

/// `true` if `dist_sq <= range² * cloak_factor / CLOAK_SCALE`, exactly.
fn within(dist_sq: Fixed, range: i32, cloak_factor: i64) -> bool {
    let range = i128::from(range.max(0));
    let lhs = i128::from(dist_sq.to_bits()) * i128::from(CLOAK_SCALE);
    let rhs = (range * range) << 32;
    lhs <= rhs * i128::from(cloak_factor)
}

/// `1 - cloak * (1 - reduction) / 100`, scaled by [`CLOAK_SCALE`].
#[must_use]
pub fn cloak_factor(cloak_percent: i32, reduce_cloaking: i32) -> i64 {
    let cloak = i64::from(cloak_percent.clamp(0, 100));
    let reduce = i64::from(reduce_cloaking.clamp(0, 100));
    CLOAK_SCALE - cloak * (100 - reduce)
}

/// Scanners of a player, merged per exact position.
#[must_use]
pub fn player_scanners(player: &Player, universe: &Universe) -> Vec<Scanner> {
    let mut merged: BTreeMap<Vec2Fixed, Scanner> = BTreeMap::new();
    let mut add = |scanner: Scanner| {
        merged
            .entry(scanner.position)
            .and_modify(|s| {
                s.range = s.range.max(scanner.range);
                s.range_pen = s.range_pen.max(scanner.range_pen);
                s.reduce_cloaking = s.reduce_cloaking.max(scanner.reduce_cloaking);
            })
            .or_insert(scanner);
    };

    for planet in universe.player_planets(player.num) {
        if planet.spec.scanner.is_some() {
            add(Scanner {
                position: planet.position,
                range: planet.spec.scan_range,
                range_pen: planet.spec.scan_range_pen,
                reduce_cloaking: 0,
            });
        }
    }

    // every fleet sees at least its own position
    let built_in = player.race_spec.built_in_scanner_range;
    for fleet in universe.player_fleets(player.num) {
        add(Scanner {
            position: fleet.position,
            range: fleet.spec.scan_range.max(built_in),
            range_pen: fleet.spec.scan_range_pen,
            reduce_cloaking: fleet.spec.reduce_cloaking,
        });
    }

    merged.into_values().collect()
}

/// Fleets of a player whose scanners see cargo.
#[must_use]
pub fn cargo_scanners(player: &Player, universe: &Universe) -> Vec<CargoScanner> {
    universe
        .player_fleets(player.num)
        .filter(|f| f.spec.can_steal_fleet_cargo || f.spec.can_steal_planet_cargo)
        .map(|f| CargoScanner {
            position: f.position,
            range: f.spec.scan_range,
            fleet_cargo: f.spec.can_steal_fleet_cargo,
            planet_cargo: f.spec.can_steal_planet_cargo,
        })
        .collect()
}

/// Seed of the population-error stream for one observation.
fn observation_seed(seed: u64, year: i32, observer: PlayerNum, planet: u32) -> u64 {
    let mut h = seed ^ 0x9E37_79B9_7F4A_7C15;
    for part in [u64::from(year as u32), u64::from(observer), u64::from(planet)] {
        h = (h ^ part).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h ^= h >> 31;
    }
    h
}

/// Intel gathered by one discovery pass, applied to the observer at the end.
#[derive(Debug, Clone, Default)]
struct Discovery {
    planet_intels: Vec<PlanetIntel>,
    fleet_intels: BTreeMap<FleetKey, FleetIntel>,
    design_intels: BTreeMap<DesignKey, ShipDesignIntel>,
    seen: BTreeSet<PlayerNum>,
}

struct Discoverer<'a> {
    observer: &'a Player,
    players: &'a [Player],
    universe: &'a Universe,
    rules: &'a Rules,
    year: i32,
}

impl Discoverer<'_> {
    fn run(&self) -> Result<Discovery> {
        let mut discovery = Discovery {
            planet_intels: self.observer.planet_intels.clone(),
            fleet_intels: BTreeMap::new(),
            design_intels: self.observer.design_intels.clone(),
            seen: BTreeSet::new(),
        };

        // owned planets are reset to 0 below
        for intel in &mut discovery.planet_intels {
            if intel.explored() {
                intel.report_age += 1;
            }
        }

        let scanners = player_scanners(self.observer, self.universe);
        let cargo_scanners = cargo_scanners(self.observer, self.universe);

        for planet in &self.universe.planets {
            if planet.owned_by(self.observer.num) {
                let intel = self.intel_slot(&mut discovery.planet_intels, planet.num)?;
                self.reveal_owned_planet(intel, planet);
                continue;
            }

            let scanned = scanners.iter().any(|s| {
                within(
                    s.position.distance_squared(planet.position),
                    s.range_pen,
                    CLOAK_SCALE,
                )
            });
            let cargo_seen = cargo_scanners.iter().any(|s| {
                s.planet_cargo
                    && within(s.position.distance_squared(planet.position), s.range, CLOAK_SCALE)
            });
            if !scanned && !cargo_seen {
                continue;
            }

            let intel = self.intel_slot(&mut discovery.planet_intels, planet.num)?;
            if scanned {
                self.reveal_planet(intel, planet);
                if let Some(owner) = planet.player_num {
                    discovery.seen.insert(owner);
                }
            }
            if cargo_seen {
                intel.surface_minerals = Some(planet.cargo.minerals());
            }
        }

        for fleet in &self.universe.fleets {
            if fleet.deleted || fleet.player_num == self.observer.num {
                continue;
            }
            if !self.fleet_detected(fleet, &scanners) {
                continue;
            }
            let cargo_seen = cargo_scanners.iter().any(|s| {
                s.fleet_cargo
                    && within(s.position.distance_squared(fleet.position), s.range, CLOAK_SCALE)
            });
            discovery
                .fleet_intels
                .insert(fleet.key(), fleet_intel(fleet, cargo_seen));
            self.discover_designs(fleet, &mut discovery.design_intels)?;
            discovery.seen.insert(fleet.player_num);
        }

        Ok(discovery)
    }

    fn intel_slot<'i>(
        &self,
        intels: &'i mut [PlanetIntel],
        planet_num: u32,
    ) -> Result<&'i mut PlanetIntel> {
        let len = intels.len();
        planet_num
            .checked_sub(1)
            .and_then(|i| intels.get_mut(i as usize))
            .ok_or(GameError::IntelIndexOutOfRange {
                player: self.observer.num,
                planet: planet_num,
                len,
            })
    }

    fn reveal_owned_planet(&self, intel: &mut PlanetIntel, planet: &Planet) {
        intel.report_age = 0;
        intel.player_num = planet.player_num;
        intel.hab = Some(planet.hab);
        intel.mineral_concentration = Some(planet.mineral_concentration);
        intel.population = Some(planet.population());
        intel.surface_minerals = Some(planet.cargo.minerals());
        intel.has_starbase = planet.spec.has_starbase;
        intel.defenses = Some(planet.defenses);
    }

    fn reveal_planet(&self, intel: &mut PlanetIntel, planet: &Planet) {
        intel.report_age = 0;
        intel.player_num = planet.player_num;
        intel.hab = Some(planet.hab);
        intel.mineral_concentration = Some(planet.mineral_concentration);
        intel.has_starbase = self.universe.starbase(planet.num).is_some();
        intel.defenses = None;
        intel.population = planet
            .owned()
            .then(|| self.estimate_population(planet.num, planet.population()));
    }

    /// Population as seen through a scanner, off by up to the scanner error.
    fn estimate_population(&self, planet_num: u32, population: i32) -> i32 {
        let error = self.rules.population_scanner_error.max(0);
        if error == 0 {
            return population;
        }
        let mut rng = GameRng::seed_from_u64(observation_seed(
            self.rules.seed,
            self.year,
            self.observer.num,
            planet_num,
        ));
        let percent = rng.gen_range(-error..=error);
        let delta = i64::from(population) * i64::from(percent) / 100;
        (i64::from(population) + delta).max(0) as i32
    }

    fn fleet_detected(&self, fleet: &Fleet, scanners: &[Scanner]) -> bool {
        let orbiting = fleet.orbiting_planet_num.is_some();
        scanners.iter().any(|s| {
            let factor = cloak_factor(fleet.spec.cloak_percent, s.reduce_cloaking);
            let dist_sq = s.position.distance_squared(fleet.position);
            within(dist_sq, s.range_pen, factor) || (!orbiting && within(dist_sq, s.range, factor))
        })
    }

    fn discover_designs(
        &self,
        fleet: &Fleet,
        design_intels: &mut BTreeMap<DesignKey, ShipDesignIntel>,
    ) -> Result<()> {
        let owner = self
            .players
            .iter()
            .find(|p| p.num == fleet.player_num)
            .ok_or(GameError::UnknownPlayer(fleet.player_num))?;
        let reveal = self.observer.race_spec.discover_design_on_scan;

        for token in &fleet.tokens {
            let design = owner.require_design(token.design_num)?;
            let key = DesignKey::new(owner.num, design.num);
            let intel = design_intels.entry(key).or_insert_with(|| ShipDesignIntel {
                key,
                name: design.name.clone(),
                hull: design.hull.clone(),
                slots: Vec::new(),
                armor: None,
                shield: None,
                slots_discovered: false,
            });
            if reveal && !intel.slots_discovered {
                intel.slots = design.slots.clone();
                intel.armor = Some(design.spec.armor);
                intel.shield = Some(design.spec.shield);
                intel.slots_discovered = true;
            }
        }
        Ok(())
    }
}

fn fleet_intel(fleet: &Fleet, cargo_seen: bool) -> FleetIntel {
    let next = fleet.waypoints.get(1);
    FleetIntel {
        key: fleet.key(),
        name: fleet.name.clone(),
        position: fleet.position,
        report_age: 0,
        orbiting_planet_num: fleet.orbiting_planet_num,
        warp_speed: next.map_or(0, |wp| wp.warp_speed),
        destination: next.map(|wp| wp.position),
        tokens: fleet.tokens.clone(),
        mass: fleet.spec.mass,
        cargo: cargo_seen.then_some(fleet.cargo),
        starbase: fleet.starbase,
    }
}

/// Run one discovery pass for `observer`.
///
/// Ages the observer's explored planet intel by one year, refreshes every
/// planet the observer owns or scans, rebuilds fleet intel and records newly
/// seen designs and players. Fails if planet intel does not cover every
/// planet or a scanned fleet references a missing design.
pub fn discover(
    observer: PlayerNum,
    players: &mut [Player],
    universe: &Universe,
    rules: &Rules,
    year: i32,
) -> Result<()> {
    let index = players
        .iter()
        .position(|p| p.num == observer)
        .ok_or(GameError::UnknownPlayer(observer))?;

    let discovery = Discoverer {
        observer: &players[index],
        players: &*players,
        universe,
        rules,
        year,
    }
    .run()?;

    let names: Vec<(PlayerNum, String, String)> = players
        .iter()
        .map(|p| (p.num, p.name.clone(), p.race.plural_name.clone()))
        .collect();

    let player = &mut players[index];
    tracing::trace!(
        player = observer,
        fleets = discovery.fleet_intels.len(),
        designs = discovery.design_intels.len(),
        "discovery"
    );
    player.planet_intels = discovery.planet_intels;
    player.fleet_intels = discovery.fleet_intels;
    player.design_intels = discovery.design_intels;

    for (num, name, race_name) in names {
        if num == observer {
            continue;
        }
        if !player.player_intels.iter().any(|p| p.num == num) {
            player.player_intels.push(PlayerIntel {
                num,
                name,
                race_name: None,
                seen: false,
            });
        }
        if discovery.seen.contains(&num) {
            if let Some(intel) = player.player_intels.iter_mut().find(|p| p.num == num) {
                intel.seen = true;
                intel.race_name = Some(race_name);
            }
        }
    }
    player.player_intels.sort_by_key(|p| p.num);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ShipDesign;
    use crate::fleet::ShipToken;
    use crate::intel::REPORT_AGE_UNEXPLORED;
    use crate::race::{PrimaryRacialTrait, Race, ShipDesignPurpose};
    use crate::tech::{names, StandardCatalog};

    fn player(num: PlayerNum, race: Race, rules: &Rules) -> Player {
        let catalog = StandardCatalog::new();
        let mut player = Player::new(num, format!("P{num}"), race, rules);
        let scout = ShipDesign::for_purpose(
            1,
            num,
            "Scout",
            names::SCOUT,
            ShipDesignPurpose::Scout,
            &player.race,
            &player.tech_levels,
            &catalog,
        )
        .unwrap();
        player.designs.push(scout);
        player
    }

    /// Three planets on a line, 100 ly apart; player 1 owns the first.
    fn setup() -> (Vec<Player>, Universe, Rules) {
        let rules = Rules::default();
        let mut planets = vec![
            Planet::new(1, "Home", Vec2Fixed::from_ints(0, 0)),
            Planet::new(2, "Near", Vec2Fixed::from_ints(100, 0)),
            Planet::new(3, "Far", Vec2Fixed::from_ints(200, 0)),
        ];
        planets[0].player_num = Some(1);
        planets[0].set_population(25_000);
        planets[1].player_num = Some(2);
        planets[1].set_population(10_000);

        let mut players = vec![
            player(1, Race::default(), &rules),
            player(2, Race::default(), &rules),
        ];
        for p in &mut players {
            p.init_planet_intels(&planets);
        }
        let universe = Universe::new(planets);
        (players, universe, rules)
    }

    fn add_fleet(
        universe: &mut Universe,
        players: &[Player],
        owner: PlayerNum,
        at: (i32, i32),
    ) -> FleetKey {
        let num = universe.next_fleet_num(owner);
        let mut fleet = Fleet::new(
            num,
            owner,
            "Scout",
            Vec2Fixed::from_ints(at.0, at.1),
            vec![ShipToken::new(1, 1)],
        );
        fleet.compute_spec(&players[(owner - 1) as usize].designs).unwrap();
        universe.add_fleet(fleet)
    }

    #[test]
    fn test_owned_planets_fresh_and_unscanned_unexplored() {
        let (mut players, universe, rules) = setup();
        discover(1, &mut players, &universe, &rules, 2400).unwrap();

        let intels = &players[0].planet_intels;
        assert_eq!(intels.len(), universe.planets.len());
        assert_eq!(intels[0].report_age, 0);
        assert_eq!(intels[0].population, Some(25_000));
        assert_eq!(intels[1].report_age, REPORT_AGE_UNEXPLORED);
        assert_eq!(intels[2].report_age, REPORT_AGE_UNEXPLORED);
    }

    #[test]
    fn test_orbiting_fleet_explores_planet_with_population_error() {
        let (mut players, mut universe, rules) = setup();
        add_fleet(&mut universe, &players, 1, (100, 0));
        discover(1, &mut players, &universe, &rules, 2400).unwrap();

        let intel = &players[0].planet_intels[1];
        assert_eq!(intel.report_age, 0);
        assert_eq!(intel.player_num, Some(2));
        let population = intel.population.unwrap();
        assert!((8_000..=12_000).contains(&population));
        assert!(intel.surface_minerals.is_none());
        assert!(players[0].player_intels.iter().any(|p| p.num == 2 && p.seen));
    }

    #[test]
    fn test_explored_intel_ages() {
        let (mut players, mut universe, rules) = setup();
        let key = add_fleet(&mut universe, &players, 1, (200, 0));
        discover(1, &mut players, &universe, &rules, 2400).unwrap();
        assert_eq!(players[0].planet_intels[2].report_age, 0);

        universe.move_fleet(key, Vec2Fixed::from_ints(0, 0));
        discover(1, &mut players, &universe, &rules, 2401).unwrap();
        assert_eq!(players[0].planet_intels[2].report_age, 1);
        assert_eq!(players[0].planet_intels[0].report_age, 0);
    }

    #[test]
    fn test_rediscovery_is_stable() {
        let (mut players, mut universe, rules) = setup();
        add_fleet(&mut universe, &players, 1, (100, 0));
        add_fleet(&mut universe, &players, 2, (0, 0));
        discover(1, &mut players, &universe, &rules, 2400).unwrap();
        let first = players[0].clone();
        discover(1, &mut players, &universe, &rules, 2400).unwrap();

        assert_eq!(first.planet_intels, players[0].planet_intels);
        assert_eq!(first.fleet_intels, players[0].fleet_intels);
        assert_eq!(first.design_intels, players[0].design_intels);
    }

    #[test]
    fn test_cloak_factor() {
        assert_eq!(cloak_factor(0, 0), 10_000);
        assert_eq!(cloak_factor(50, 0), 5_000);
        assert_eq!(cloak_factor(50, 50), 7_500);
        assert_eq!(cloak_factor(100, 100), 10_000);
    }

    #[test]
    fn test_cloaked_fleet_needs_closer_scanner() {
        let scanner = Scanner {
            position: Vec2Fixed::ZERO,
            range: 100,
            range_pen: 60,
            reduce_cloaking: 0,
        };
        // 50% cloak shrinks the effective squared range by half
        let factor = cloak_factor(50, 0);
        let at_75 = Vec2Fixed::from_ints(75, 0).distance_squared(scanner.position);
        let at_40 = Vec2Fixed::from_ints(40, 0).distance_squared(scanner.position);
        assert!(within(at_75, scanner.range, CLOAK_SCALE));
        assert!(!within(at_75, scanner.range, factor));
        assert!(within(at_40, scanner.range_pen, factor));
    }

    #[test]
    fn test_fleet_detection_and_orbit_hiding() {
        let (mut players, mut universe, rules) = setup();
        // player 1 gets a 50 ly planetary scanner on its homeworld
        {
            let home = universe.planet_mut(1).unwrap();
            home.spec.scanner = Some("Viewer 50".into());
            home.spec.scan_range = 50;
        }
        let in_space = add_fleet(&mut universe, &players, 2, (30, 0));
        let orbiting = add_fleet(&mut universe, &players, 2, (40, 0));
        universe.fleet_mut(orbiting).unwrap().orbiting_planet_num = Some(2);

        discover(1, &mut players, &universe, &rules, 2400).unwrap();

        let seen = &players[0].fleet_intels;
        assert!(seen.contains_key(&in_space));
        assert!(!seen.contains_key(&orbiting));
        let design = DesignKey::new(2, 1);
        assert!(!players[0].design_intels[&design].slots_discovered);
    }

    #[test]
    fn test_super_stealth_reveals_design_slots() {
        let rules = Rules::default();
        let (mut players, mut universe, _) = setup();
        players[0] = {
            let race = Race {
                prt: PrimaryRacialTrait::SuperStealth,
                ..Race::default()
            };
            let mut p = player(1, race, &rules);
            p.init_planet_intels(&universe.planets);
            p
        };
        add_fleet(&mut universe, &players, 1, (0, 0));
        add_fleet(&mut universe, &players, 2, (0, 0));

        discover(1, &mut players, &universe, &rules, 2400).unwrap();

        let intel = &players[0].design_intels[&DesignKey::new(2, 1)];
        assert!(intel.slots_discovered);
        assert!(!intel.slots.is_empty());
        assert!(intel.armor.is_some());
    }

    #[test]
    fn test_cargo_scanner_reveals_minerals_without_pen_scan() {
        let (mut players, mut universe, rules) = setup();
        universe.planet_mut(2).unwrap().cargo.ironium = 77;
        let key = add_fleet(&mut universe, &players, 1, (0, 0));
        {
            let spec = &mut universe.fleet_mut(key).unwrap().spec;
            spec.scan_range = 150;
            spec.scan_range_pen = 0;
            spec.can_steal_planet_cargo = true;
        }

        discover(1, &mut players, &universe, &rules, 2400).unwrap();

        let intel = &players[0].planet_intels[1];
        assert_eq!(intel.surface_minerals.map(|m| m.ironium), Some(77));
        // cargo alone does not explore the planet
        assert_eq!(intel.report_age, REPORT_AGE_UNEXPLORED);
        assert!(intel.hab.is_none());
        assert!(players[0].planet_intels[2].surface_minerals.is_none());
    }

    #[test]
    fn test_lost_colony_intel_ages() {
        let (mut players, mut universe, rules) = setup();
        discover(1, &mut players, &universe, &rules, 2400).unwrap();
        assert_eq!(players[0].planet_intels[0].report_age, 0);

        universe.planet_mut(1).unwrap().empty();
        discover(1, &mut players, &universe, &rules, 2401).unwrap();
        discover(1, &mut players, &universe, &rules, 2402).unwrap();

        let intel = &players[0].planet_intels[0];
        assert_eq!(intel.report_age, 2);
        assert_eq!(intel.player_num, Some(1));
    }

    #[test]
    fn test_cloaked_fleet_seen_only_by_pen_scanner() {
        let (mut players, mut universe, rules) = setup();
        let watcher = add_fleet(&mut universe, &players, 1, (0, 0));
        {
            let spec = &mut universe.fleet_mut(watcher).unwrap().spec;
            spec.scan_range = 100;
            spec.scan_range_pen = 0;
            spec.reduce_cloaking = 0;
        }
        let cloaked = add_fleet(&mut universe, &players, 2, (0, 75));
        universe.fleet_mut(cloaked).unwrap().spec.cloak_percent = 50;

        discover(1, &mut players, &universe, &rules, 2400).unwrap();
        assert!(!players[0].fleet_intels.contains_key(&cloaked));

        universe.fleet_mut(watcher).unwrap().spec.scan_range_pen = 60;
        universe.move_fleet(cloaked, Vec2Fixed::from_ints(0, 40));
        discover(1, &mut players, &universe, &rules, 2400).unwrap();
        assert!(players[0].fleet_intels.contains_key(&cloaked));
    }

    #[test]
    fn test_short_intel_is_an_error() {
        let (mut players, universe, rules) = setup();
        players[0].planet_intels.clear();
        let err = discover(1, &mut players, &universe, &rules, 2400).unwrap_err();
        assert!(matches!(
            err,
            GameError::IntelIndexOutOfRange {
                player: 1,
                planet: 1,
                len: 0
            }
        ));
    }
}
