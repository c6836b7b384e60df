//! Fleet movement.
//!
//! A fleet travels `warp²` light-years per year towards waypoint 1. Fuel is
//! burned by the thirstiest engine in the fleet. A fleet that cannot afford
//! its ordered warp falls back to the fastest warp it can pay for, and to
//! the free warp when the tanks are dry. Fleets ordered to
//! [`STARGATE_WARP_SPEED`] jump instantly between gate-equipped starbases.

use crate::error::{GameError, Result};
use crate::fleet::{FleetKey, FleetSpec, Waypoint, WaypointTarget, STARGATE_WARP_SPEED};
use crate::math::{Fixed, Vec2Fixed};
use crate::player::{Player, PlayerMessage, PlayerMessageKind};
use crate::rules::Rules;
use crate::universe::Universe;

/// Highest warp with an entry in engine fuel tables.
pub const MAX_WARP: i32 = 10;

/// Fuel (mg) a fleet burns travelling `distance` ly at `warp`.
///
/// Returns `None` if the fleet has no engines.
#[must_use]
pub fn fuel_usage(spec: &FleetSpec, warp: i32, distance: Fixed) -> Option<i32> {
    let warp = warp.clamp(0, MAX_WARP);
    let usage = spec
        .engines
        .iter()
        .flatten()
        .map(|engine| {
            if warp <= engine.free_speed {
                0
            } else {
                engine.fuel_usage[warp as usize]
            }
        })
        .max()?;

    let numerator = i128::from(spec.mass.max(0))
        * i128::from(usage)
        * i128::from(distance.max(Fixed::ZERO).to_bits());
    let denominator = 20_000_i128 << 32;
    let fuel = (numerator + denominator - 1) / denominator;
    Some(i32::try_from(fuel).unwrap_or(i32::MAX))
}

/// Light-years covered in one year at `warp`.
#[must_use]
pub fn distance_per_year(warp: i32) -> Fixed {
    let warp = warp.clamp(0, MAX_WARP);
    Fixed::from_num(warp * warp)
}

/// Move every fleet with somewhere to go.
pub fn move_fleets(universe: &mut Universe, players: &mut [Player], rules: &Rules) -> Result<()> {
    for key in universe.fleet_keys() {
        let player = players
            .iter_mut()
            .find(|p| p.num == key.owner)
            .ok_or(GameError::UnknownPlayer(key.owner))?;
        move_fleet(universe, key, player, rules);
    }
    Ok(())
}

/// Move one fleet towards its next waypoint.
pub fn move_fleet(universe: &mut Universe, key: FleetKey, player: &mut Player, rules: &Rules) {
    let Some(fleet) = universe.fleet(key) else {
        return;
    };
    if fleet.starbase {
        return;
    }
    let Some(mut next) = fleet.waypoints.get(1).copied() else {
        return;
    };
    if let WaypointTarget::Fleet(target) = next.target {
        if let Some(target) = universe.fleet(target) {
            next.position = target.position;
        }
    }

    if next.warp_speed == STARGATE_WARP_SPEED {
        jump(universe, key, next, player);
        return;
    }

    let ordered_warp = next.warp_speed.clamp(0, MAX_WARP);
    if ordered_warp == 0 {
        return;
    }

    let origin = fleet.position;
    let distance = origin.distance(next.position);

    // fastest affordable warp, down to the free warp
    let mut chosen = None;
    for warp in (1..=ordered_warp).rev() {
        let travel = distance.min(distance_per_year(warp));
        match fuel_usage(&fleet.spec, warp, travel) {
            Some(fuel) if fuel <= fleet.fuel => {
                chosen = Some((warp, fuel));
                break;
            }
            Some(_) => {}
            None => return,
        }
    }
    let (warp, fuel) = chosen.unwrap_or((rules.free_warp.clamp(0, ordered_warp), 0));
    if warp == 0 {
        return;
    }
    if warp < ordered_warp {
        player.message(PlayerMessage::fleet(
            PlayerMessageKind::FleetOutOfFuel,
            key,
            format!("{} is short of fuel and slowed to warp {warp}", fleet.name),
        ));
    }

    let travel = distance.min(distance_per_year(warp));
    let position = origin.step_towards(next.position, travel);
    let arrived = position == next.position;
    let orbiting = if arrived {
        universe.planet_at(position).map(|p| p.num)
    } else {
        None
    };
    let name = fleet.name.clone();

    let Some(fleet) = universe.fleet_mut(key) else {
        return;
    };
    fleet.previous_position = Some(origin);
    fleet.fuel -= fuel;
    fleet.orbiting_planet_num = orbiting;
    if arrived {
        fleet.waypoints.remove(0);
        if let Some(first) = fleet.waypoints.first_mut() {
            first.position = position;
            first.task_complete = false;
        }
    } else if let Some(first) = fleet.waypoints.first_mut() {
        *first = Waypoint::position(position, warp);
    }
    universe.move_fleet(key, position);

    tracing::trace!(fleet = %key, warp, fuel, arrived, "moved");
    if arrived {
        player.message(PlayerMessage::fleet(
            PlayerMessageKind::FleetArrived,
            key,
            format!("{name} has arrived"),
        ));
    }
}

/// Instant jump between two stargates.
fn jump(universe: &mut Universe, key: FleetKey, next: Waypoint, player: &mut Player) {
    let Some(fleet) = universe.fleet(key) else {
        return;
    };
    let name = fleet.name.clone();
    let reject = |player: &mut Player, reason: &str| {
        tracing::debug!(fleet = %key, reason, "stargate jump rejected");
        player.message(PlayerMessage::fleet(
            PlayerMessageKind::FleetStargateJump,
            key,
            format!("{name} could not jump: {reason}"),
        ));
    };

    let gate_at = |planet: Option<u32>| {
        let planet = planet?;
        let owned = universe.planet(planet).ok()?.owned_by(key.owner);
        let gate = universe.starbase(planet)?.spec.stargate?;
        owned.then_some(gate)
    };
    let (Some(source), Some(dest)) = (
        gate_at(fleet.orbiting_planet_num),
        gate_at(next.target_planet()),
    ) else {
        reject(player, "both ends need an own stargate");
        return;
    };

    let distance = fleet.position.distance(next.position);
    let safe_range = Fixed::from_num(source.safe_range.min(dest.safe_range));
    if distance > safe_range {
        reject(player, "destination out of range");
        return;
    }
    let safe_mass = source.safe_hull_mass.min(dest.safe_hull_mass);
    let too_heavy = fleet.tokens.iter().any(|t| {
        player
            .design(t.design_num)
            .map_or(true, |d| d.spec.mass > safe_mass)
    });
    if too_heavy {
        reject(player, "ships too heavy for the gate");
        return;
    }

    let origin = fleet.position;
    let position: Vec2Fixed = next.position;
    let orbiting = next.target_planet();
    let Some(fleet) = universe.fleet_mut(key) else {
        return;
    };
    fleet.previous_position = Some(origin);
    fleet.orbiting_planet_num = orbiting;
    fleet.waypoints.remove(0);
    if let Some(first) = fleet.waypoints.first_mut() {
        first.task_complete = false;
    }
    universe.move_fleet(key, position);

    tracing::debug!(fleet = %key, "stargate jump");
    player.message(PlayerMessage::fleet(
        PlayerMessageKind::FleetStargateJump,
        key,
        format!("{name} jumped through the stargate"),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ShipDesign;
    use crate::fleet::{Fleet, ShipToken, WaypointTask};
    use crate::planet::Planet;
    use crate::race::{Race, ShipDesignPurpose};
    use crate::tech::{names, StandardCatalog, TechCatalog, TechLevel};

    fn setup() -> (Universe, Player, FleetKey) {
        let rules = Rules::default();
        let catalog = StandardCatalog::new();
        let mut player = Player::new(1, "Mover", Race::default(), &rules);
        let scout = ShipDesign::for_purpose(
            1,
            1,
            "Scout",
            names::SCOUT,
            ShipDesignPurpose::Scout,
            &player.race,
            &player.tech_levels,
            &catalog,
        )
        .unwrap();
        player.designs.push(scout);

        let mut universe = Universe::new(vec![
            Planet::new(1, "Start", Vec2Fixed::from_ints(0, 0)),
            Planet::new(2, "Goal", Vec2Fixed::from_ints(100, 0)),
        ]);
        let mut fleet = Fleet::new(1, 1, "Scout #1", Vec2Fixed::ZERO, vec![ShipToken::new(1, 1)]);
        fleet.compute_spec(&player.designs).unwrap();
        fleet.fuel = fleet.spec.fuel_capacity;
        fleet.orbiting_planet_num = Some(1);
        let key = universe.add_fleet(fleet);
        (universe, player, key)
    }

    #[test]
    fn test_moves_warp_squared() {
        let (mut universe, mut player, key) = setup();
        universe.fleet_mut(key).unwrap().send_to_planet(
            2,
            Vec2Fixed::from_ints(100, 0),
            5,
            WaypointTask::None,
        );

        move_fleet(&mut universe, key, &mut player, &Rules::default());

        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.position, Vec2Fixed::from_ints(25, 0));
        assert_eq!(fleet.orbiting_planet_num, None);
        assert!(fleet.fuel < fleet.spec.fuel_capacity);
        assert_eq!(fleet.waypoints.len(), 2);
        assert_eq!(universe.fleets_at(Vec2Fixed::from_ints(25, 0)).count(), 1);
    }

    #[test]
    fn test_arrival_pops_waypoint_and_orbits() {
        let (mut universe, mut player, key) = setup();
        universe.fleet_mut(key).unwrap().send_to_planet(
            2,
            Vec2Fixed::from_ints(100, 0),
            10,
            WaypointTask::Colonize,
        );
        universe.fleet_mut(key).unwrap().fuel = 10_000;

        move_fleet(&mut universe, key, &mut player, &Rules::default());

        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.position, Vec2Fixed::from_ints(100, 0));
        assert_eq!(fleet.orbiting_planet_num, Some(2));
        assert_eq!(fleet.waypoints.len(), 1);
        assert_eq!(fleet.waypoints[0].task, WaypointTask::Colonize);
        assert!(!fleet.waypoints[0].task_complete);
        assert!(player
            .messages
            .iter()
            .any(|m| m.kind == PlayerMessageKind::FleetArrived));
    }

    #[test]
    fn test_empty_tanks_fall_back_to_free_warp() {
        let (mut universe, mut player, key) = setup();
        {
            let fleet = universe.fleet_mut(key).unwrap();
            fleet.fuel = 0;
            fleet.send_to_planet(2, Vec2Fixed::from_ints(100, 0), 9, WaypointTask::None);
        }

        move_fleet(&mut universe, key, &mut player, &Rules::default());

        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.fuel, 0);
        assert_eq!(fleet.position, Vec2Fixed::from_ints(1, 0));
        assert!(player
            .messages
            .iter()
            .any(|m| m.kind == PlayerMessageKind::FleetOutOfFuel));
    }

    #[test]
    fn test_fuel_usage_rounds_up() {
        let catalog = StandardCatalog::new();
        let race = Race::default();
        let engine = *catalog
            .best_engine(&race, &TechLevel::default())
            .unwrap()
            .engine
            .as_ref()
            .unwrap();
        let spec = FleetSpec {
            mass: 100,
            engines: vec![Some(engine)],
            ..FleetSpec::default()
        };
        // 100 kT over 200 ly burns exactly the table value
        assert_eq!(
            fuel_usage(&spec, 6, Fixed::from_num(200)),
            Some(engine.fuel_usage[6])
        );
        // a sliver of distance still costs 1 mg
        assert_eq!(fuel_usage(&spec, 6, Fixed::from_num(0.01)), Some(1));
        assert_eq!(fuel_usage(&FleetSpec::default(), 6, Fixed::from_num(10)), None);
    }

    #[test]
    fn test_jump_needs_gates() {
        let (mut universe, mut player, key) = setup();
        universe.fleet_mut(key).unwrap().send_to_planet(
            2,
            Vec2Fixed::from_ints(100, 0),
            STARGATE_WARP_SPEED,
            WaypointTask::None,
        );

        move_fleet(&mut universe, key, &mut player, &Rules::default());

        assert_eq!(universe.fleet(key).unwrap().position, Vec2Fixed::ZERO);
        assert!(player
            .messages
            .iter()
            .any(|m| m.kind == PlayerMessageKind::FleetStargateJump));
    }
}
