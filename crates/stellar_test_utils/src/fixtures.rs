//! Test fixtures and helpers.
//!
//! Pre-built games, players and universes for consistent testing.

use fixed::types::I32F32;
use stellar_core::design::ShipDesign;
use stellar_core::fleet::{Fleet, FleetKey, ShipToken, Waypoint, WaypointTask};
use stellar_core::game::{FullGame, GameSettings, PlayerSetup};
use stellar_core::math::Vec2Fixed;
use stellar_core::planet::Planet;
use stellar_core::player::{Player, PlayerNum};
use stellar_core::race::{Race, ShipDesignPurpose};
use stellar_core::rules::{Density, Rules, Size};
use stellar_core::tech::{names, StandardCatalog};
use stellar_core::universe::Universe;

/// Design number of the scout made by [`player_with_designs`].
pub const SCOUT_DESIGN: u32 = 1;

/// Design number of the colony ship made by [`player_with_designs`].
pub const COLONY_SHIP_DESIGN: u32 = 2;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Map position from whole light-years.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// Settings for a tiny, sparse map with `ai_players` AI seats.
#[must_use]
pub fn tiny_settings(ai_players: usize) -> GameSettings {
    GameSettings {
        size: Size::Tiny,
        density: Density::Sparse,
        players: (1..=ai_players)
            .map(|i| PlayerSetup::ai(format!("AI {i}"), Race::default()))
            .collect(),
        ..GameSettings::default()
    }
}

/// A freshly created game on a tiny map.
///
/// # Panics
///
/// Panics if generation fails, which the tiny map never should.
#[must_use]
pub fn tiny_game(seed: u64, ai_players: usize) -> FullGame {
    FullGame::create(
        1,
        &tiny_settings(ai_players),
        Rules::with_seed(seed),
        &StandardCatalog::new(),
    )
    .unwrap()
}

/// A player with a scout ([`SCOUT_DESIGN`]) and a colony ship
/// ([`COLONY_SHIP_DESIGN`]) designed from starting tech.
///
/// # Panics
///
/// Panics if the standard catalog lacks the starting hulls.
#[must_use]
pub fn player_with_designs(num: PlayerNum, name: &str) -> Player {
    let catalog = StandardCatalog::new();
    let mut player = Player::new(num, name, Race::default(), &Rules::default());
    for (design_num, design_name, hull, purpose) in [
        (SCOUT_DESIGN, "Scout", names::SCOUT, ShipDesignPurpose::Scout),
        (
            COLONY_SHIP_DESIGN,
            "Colony Ship",
            names::COLONY_SHIP,
            ShipDesignPurpose::Colonizer,
        ),
    ] {
        let design = ShipDesign::for_purpose(
            design_num,
            num,
            design_name,
            hull,
            purpose,
            &player.race,
            &player.tech_levels,
            &catalog,
        )
        .unwrap();
        player.designs.push(design);
    }
    player
}

/// Planets in a row along the x axis, `spacing` light-years apart,
/// numbered from 1. None are owned.
#[must_use]
pub fn planet_row(count: u32, spacing: i32) -> Vec<Planet> {
    (1..=count)
        .zip(0..)
        .map(|(num, i)| Planet::new(num, format!("Planet {num}"), pos(i * spacing, 0)))
        .collect()
}

/// A universe of planets in a row with planet 1 owned by `owner`.
#[must_use]
pub fn home_and_neighbours(owner: PlayerNum, count: u32, spacing: i32) -> Universe {
    let mut planets = planet_row(count, spacing);
    if let Some(home) = planets.first_mut() {
        home.player_num = Some(owner);
        home.homeworld = true;
        home.set_population(25_000);
    }
    Universe::new(planets)
}

/// Add a one-ship fleet orbiting `planet` with `task` on its only waypoint.
///
/// # Panics
///
/// Panics if the planet or design does not exist.
pub fn add_orbiting_fleet(
    universe: &mut Universe,
    player: &Player,
    design_num: u32,
    planet: u32,
    task: WaypointTask,
) -> FleetKey {
    let position = universe.planet(planet).unwrap().position;
    let num = universe.next_fleet_num(player.num);
    let mut fleet = Fleet::new(
        num,
        player.num,
        format!("Fleet #{num}"),
        position,
        vec![ShipToken::new(design_num, 1)],
    );
    fleet.orbiting_planet_num = Some(planet);
    fleet.waypoints = vec![Waypoint::planet(planet, position, 5).with_task(task)];
    fleet.compute_spec(&player.designs).unwrap();
    fleet.fuel = fleet.spec.fuel_capacity;
    universe.add_fleet(fleet)
}
