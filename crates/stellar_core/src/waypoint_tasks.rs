//! Tasks fleets perform at their current waypoint.
//!
//! Tasks run in passes so that every fleet's scrapping happens before any
//! unloading, every unload before any colonization, and so on:
//! scrap, unload, colonize, load, merge, route. A task runs at most once per
//! waypoint; arrival at a new waypoint re-arms it.

use crate::cost::{Cargo, CargoType, Mineral};
use crate::error::Result;
use crate::fleet::{
    FleetKey, TransportAction, TransportTasks, Waypoint, WaypointTarget, WaypointTask,
};
use crate::math::Vec2Fixed;
use crate::player::{player_mut, Player, PlayerMessage, PlayerMessageKind};
use crate::production::ProductionPlan;
use crate::rules::Rules;
use crate::universe::{Salvage, Universe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Scrap,
    Unload,
    Colonize,
    Load,
    Merge,
    Route,
}

impl Pass {
    const ORDER: [Self; 6] = [
        Self::Scrap,
        Self::Unload,
        Self::Colonize,
        Self::Load,
        Self::Merge,
        Self::Route,
    ];

    fn handles(self, task: WaypointTask) -> bool {
        match (self, task) {
            (Self::Scrap, WaypointTask::ScrapFleet)
            | (Self::Colonize, WaypointTask::Colonize)
            | (Self::Merge, WaypointTask::MergeWithFleet)
            | (Self::Route, WaypointTask::Route) => true,
            (Self::Unload, WaypointTask::Transport(t)) => {
                CargoType::ALL.iter().any(|&k| t.get(k).is_unload())
            }
            (Self::Load, WaypointTask::Transport(t)) => {
                CargoType::ALL.iter().any(|&k| t.get(k).is_load())
            }
            _ => false,
        }
    }
}

/// Pending task at a fleet's current waypoint.
fn pending_task(universe: &Universe, key: FleetKey) -> Option<Waypoint> {
    let fleet = universe.fleet(key)?;
    if fleet.starbase {
        return None;
    }
    let waypoint = *fleet.waypoints.first()?;
    (waypoint.task != WaypointTask::None && !waypoint.task_complete).then_some(waypoint)
}

/// Run the pending task of every fleet, then drop fleets that were consumed.
pub fn process_waypoint_tasks(
    universe: &mut Universe,
    players: &mut [Player],
    rules: &Rules,
) -> Result<()> {
    let keys: Vec<FleetKey> = universe
        .fleet_keys()
        .into_iter()
        .filter(|&key| pending_task(universe, key).is_some())
        .collect();

    for pass in Pass::ORDER {
        for &key in &keys {
            let Some(waypoint) = pending_task(universe, key) else {
                continue;
            };
            if !pass.handles(waypoint.task) {
                continue;
            }
            let player = player_mut(players, key.owner)?;
            match pass {
                Pass::Scrap => scrap(universe, key, player)?,
                Pass::Unload => transport(universe, key, waypoint, player, false)?,
                Pass::Colonize => colonize(universe, key, waypoint, player, rules)?,
                Pass::Load => transport(universe, key, waypoint, player, true)?,
                Pass::Merge => merge(universe, key, waypoint, player)?,
                Pass::Route => route(universe, key, waypoint)?,
            }
        }
    }

    for key in keys {
        let Some(fleet) = universe.fleet_mut(key) else {
            continue;
        };
        if let Some(first) = fleet.waypoints.first_mut() {
            match first.task {
                WaypointTask::RemoteMining | WaypointTask::LayMineField | WaypointTask::Patrol => {
                    tracing::trace!(fleet = %key, task = ?first.task, "task has no effect");
                }
                _ => {}
            }
            first.task_complete = true;
        }
    }

    universe.purge_deleted_fleets();
    Ok(())
}

fn colonize(
    universe: &mut Universe,
    key: FleetKey,
    waypoint: Waypoint,
    player: &mut Player,
    rules: &Rules,
) -> Result<()> {
    let Some(fleet) = universe.fleet(key) else {
        return Ok(());
    };
    let mut reject = |kind: PlayerMessageKind, text: String| -> Result<()> {
        tracing::debug!(fleet = %key, ?kind, "colonize rejected");
        player.message(PlayerMessage::fleet(kind, key, text));
        Ok(())
    };

    let Some(planet_num) = waypoint
        .target_planet()
        .filter(|&num| fleet.orbiting_planet_num == Some(num))
    else {
        return reject(
            PlayerMessageKind::ColonizeNotPlanet,
            format!("{} is not orbiting a planet to colonize", fleet.name),
        );
    };
    let planet = universe.planet(planet_num)?;
    if planet.owned() {
        return reject(
            PlayerMessageKind::ColonizeOwnedPlanet,
            format!("{} is already inhabited", planet.name),
        );
    }
    if !fleet.spec.colonizer {
        return reject(
            PlayerMessageKind::ColonizeNoModule,
            format!("{} has no colonization module", fleet.name),
        );
    }
    if fleet.cargo.colonists < rules.min_colonists {
        return reject(
            PlayerMessageKind::ColonizeNoColonists,
            format!("{} carries no colonists", fleet.name),
        );
    }

    let colonists = fleet.cargo.colonists;
    let minerals = fleet.cargo.minerals() + fleet.spec.cost.minerals();
    let owner = fleet.player_num;

    let planet = universe.planet_mut(planet_num)?;
    planet.player_num = Some(owner);
    planet.cargo.colonists = colonists;
    planet.cargo.add_minerals(minerals);
    ProductionPlan::default().apply(planet);
    let planet_name = planet.name.clone();

    universe.mark_fleet_deleted(key);
    tracing::debug!(fleet = %key, planet = planet_num, colonists, "planet colonized");
    player.message(PlayerMessage::planet(
        PlayerMessageKind::PlanetColonized,
        planet_num,
        format!("Your colonists have settled {planet_name}"),
    ));
    Ok(())
}

/// Amount an action moves given what the source has and the destination can
/// take.
fn transfer_amount(action: TransportAction, available: i32, space: i32) -> i32 {
    let wanted = match action {
        TransportAction::None => 0,
        TransportAction::LoadAll | TransportAction::UnloadAll => available,
        TransportAction::LoadAmount(n) | TransportAction::UnloadAmount(n) => n,
    };
    wanted.min(available).min(space).max(0)
}

fn transport(
    universe: &mut Universe,
    key: FleetKey,
    waypoint: Waypoint,
    player: &mut Player,
    load: bool,
) -> Result<()> {
    let WaypointTask::Transport(tasks) = waypoint.task else {
        return Ok(());
    };
    let Some(fleet) = universe.fleet(key) else {
        return Ok(());
    };
    let name = fleet.name.clone();
    let planet_num = waypoint
        .target_planet()
        .filter(|&num| fleet.orbiting_planet_num == Some(num));

    let Some(planet_num) = planet_num else {
        if load {
            player.message(PlayerMessage::fleet(
                PlayerMessageKind::LoadInvalid,
                key,
                format!("{name} has nothing to load from"),
            ));
        } else {
            jettison(universe, key, tasks)?;
        }
        return Ok(());
    };

    let own_planet = universe.planet(planet_num)?.owned_by(key.owner);
    if load && !own_planet {
        player.message(PlayerMessage::fleet(
            PlayerMessageKind::LoadInvalid,
            key,
            format!("{name} can only load cargo from your own planets"),
        ));
        return Ok(());
    }

    for kind in CargoType::ALL {
        let action = tasks.get(kind);
        if action.is_load() != load || action == TransportAction::None {
            continue;
        }
        if !load && kind == CargoType::Colonists && !own_planet {
            player.message(PlayerMessage::fleet(
                PlayerMessageKind::UnloadColonistsForeignPlanet,
                key,
                format!("{name} cannot drop colonists on a planet you do not own"),
            ));
            continue;
        }

        let (fleet_has, space) = match universe.fleet(key) {
            Some(fleet) => (fleet.cargo.get(kind), fleet.available_cargo_space()),
            None => return Ok(()),
        };
        let planet = universe.planet_mut(planet_num)?;
        let amount = if load {
            // a kiloton of colonists always stays behind
            let reserve = i32::from(kind == CargoType::Colonists);
            transfer_amount(action, planet.cargo.get(kind) - reserve, space)
        } else {
            transfer_amount(action, fleet_has, i32::MAX)
        };
        if amount == 0 {
            continue;
        }
        let signed = if load { amount } else { -amount };
        *planet.cargo.get_mut(kind) -= signed;
        if let Some(fleet) = universe.fleet_mut(key) {
            *fleet.cargo.get_mut(kind) += signed;
            fleet.refresh_mass();
        }
        tracing::trace!(fleet = %key, ?kind, amount = signed, "cargo transferred");
    }
    Ok(())
}

/// Unloading in deep space leaves minerals floating as salvage.
fn jettison(universe: &mut Universe, key: FleetKey, tasks: TransportTasks) -> Result<()> {
    let Some(fleet) = universe.fleet_mut(key) else {
        return Ok(());
    };
    let mut dropped = Cargo::default();
    for kind in [CargoType::Ironium, CargoType::Boranium, CargoType::Germanium] {
        let action = tasks.get(kind);
        if !action.is_unload() {
            continue;
        }
        let amount = transfer_amount(action, fleet.cargo.get(kind), i32::MAX);
        *fleet.cargo.get_mut(kind) -= amount;
        *dropped.get_mut(kind) += amount;
    }
    fleet.refresh_mass();
    let (player_num, position) = (fleet.player_num, fleet.position);
    if dropped.total() > 0 {
        add_salvage(universe, player_num, position, dropped);
    }
    Ok(())
}

fn add_salvage(universe: &mut Universe, player_num: u32, position: Vec2Fixed, cargo: Cargo) {
    let num = universe.salvages.iter().map(|s| s.num).max().unwrap_or(0) + 1;
    universe.salvages.push(Salvage {
        num,
        player_num,
        position,
        cargo,
    });
}

fn merge(universe: &mut Universe, key: FleetKey, waypoint: Waypoint, player: &mut Player) -> Result<()> {
    let WaypointTarget::Fleet(target_key) = waypoint.target else {
        return Ok(());
    };
    let Some(source) = universe.fleet(key) else {
        return Ok(());
    };
    let valid = target_key != key
        && target_key.owner == key.owner
        && universe
            .fleet(target_key)
            .is_some_and(|t| !t.starbase && t.position == source.position);
    if !valid {
        tracing::debug!(fleet = %key, target = %target_key, "merge target not here");
        return Ok(());
    }

    let tokens = source.tokens.clone();
    let (cargo, fuel, name) = (source.cargo, source.fuel, source.name.clone());
    universe.mark_fleet_deleted(key);

    let Some(target) = universe.fleet_mut(target_key) else {
        return Ok(());
    };
    for token in tokens {
        match target
            .tokens
            .iter_mut()
            .find(|t| t.design_num == token.design_num && t.quantity_damaged == 0)
        {
            Some(existing) if token.quantity_damaged == 0 => existing.quantity += token.quantity,
            _ => target.tokens.push(token),
        }
    }
    target.cargo += cargo;
    target.fuel += fuel;
    target.compute_spec(&player.designs)?;
    let target_name = target.name.clone();

    player.message(PlayerMessage::fleet(
        PlayerMessageKind::FleetMerged,
        target_key,
        format!("{name} merged into {target_name}"),
    ));
    Ok(())
}

fn route(universe: &mut Universe, key: FleetKey, waypoint: Waypoint) -> Result<()> {
    let Some(planet_num) = waypoint.target_planet() else {
        return Ok(());
    };
    let planet = universe.planet(planet_num)?;
    let Some(dest_num) = planet.route_target.filter(|_| planet.owned_by(key.owner)) else {
        return Ok(());
    };
    let dest = universe.planet(dest_num)?.position;
    let Some(fleet) = universe.fleet_mut(key) else {
        return Ok(());
    };
    let warp = if waypoint.warp_speed > 0 {
        waypoint.warp_speed
    } else {
        fleet.spec.ideal_speed
    };
    fleet.waypoints.push(Waypoint::planet(dest_num, dest, warp));
    Ok(())
}

fn scrap(universe: &mut Universe, key: FleetKey, player: &mut Player) -> Result<()> {
    let Some(fleet) = universe.fleet(key) else {
        return Ok(());
    };
    let cost = fleet.spec.cost.minerals();
    let recovered = Mineral::new(cost.ironium / 3, cost.boranium / 3, cost.germanium / 3)
        + fleet.cargo.minerals();
    let (name, position, orbiting) = (fleet.name.clone(), fleet.position, fleet.orbiting_planet_num);

    match orbiting {
        Some(num) => universe.planet_mut(num)?.cargo.add_minerals(recovered),
        None => {
            let mut cargo = Cargo::default();
            cargo.add_minerals(recovered);
            add_salvage(universe, key.owner, position, cargo);
        }
    }
    universe.mark_fleet_deleted(key);
    player.message(PlayerMessage::fleet(
        PlayerMessageKind::FleetScrapped,
        key,
        format!("{name} has been scrapped"),
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ShipDesign;
    use crate::fleet::{Fleet, ShipToken};
    use crate::planet::Planet;
    use crate::race::{Race, ShipDesignPurpose};
    use crate::tech::{names, StandardCatalog};

    fn player() -> Player {
        let rules = Rules::default();
        let catalog = StandardCatalog::new();
        let mut player = Player::new(1, "Settler", Race::default(), &rules);
        for (num, name, hull, purpose) in [
            (1, "Scout", names::SCOUT, ShipDesignPurpose::Scout),
            (2, "Colony Ship", names::COLONY_SHIP, ShipDesignPurpose::Colonizer),
        ] {
            let design = ShipDesign::for_purpose(
                num,
                1,
                name,
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

    /// Home (owned, 1) at the origin and Target (unowned, 2) 50 ly east.
    fn universe() -> Universe {
        let mut home = Planet::new(1, "Home", Vec2Fixed::ZERO);
        home.player_num = Some(1);
        home.cargo = Cargo::new(100, 100, 100, 500);
        Universe::new(vec![home, Planet::new(2, "Target", Vec2Fixed::from_ints(50, 0))])
    }

    fn add_fleet(
        universe: &mut Universe,
        player: &Player,
        design_num: u32,
        planet: u32,
        task: WaypointTask,
    ) -> FleetKey {
        let position = universe.planet(planet).unwrap().position;
        let num = universe.next_fleet_num(1);
        let mut fleet = Fleet::new(num, 1, format!("Fleet #{num}"), position, vec![ShipToken::new(design_num, 1)]);
        fleet.orbiting_planet_num = Some(planet);
        fleet.waypoints = vec![Waypoint::planet(planet, position, 5).with_task(task)];
        fleet.compute_spec(&player.designs).unwrap();
        universe.add_fleet(fleet)
    }

    fn run(universe: &mut Universe, player: Player) -> Player {
        let mut players = vec![player];
        process_waypoint_tasks(universe, &mut players, &Rules::default()).unwrap();
        players.remove(0)
    }

    #[test]
    fn test_colonize_founds_colony_and_consumes_fleet() {
        let player = player();
        let mut universe = universe();
        let key = add_fleet(&mut universe, &player, 2, 2, WaypointTask::Colonize);
        universe.fleet_mut(key).unwrap().cargo = Cargo::new(5, 0, 0, 25);
        let ship_cost = universe.fleet(key).unwrap().spec.cost;

        let player = run(&mut universe, player);

        let planet = universe.planet(2).unwrap();
        assert_eq!(planet.player_num, Some(1));
        assert_eq!(planet.population(), 2_500);
        assert_eq!(planet.cargo.ironium, 5 + ship_cost.ironium);
        assert!(!planet.production_queue.is_empty());
        assert!(universe.fleet(key).is_none());
        assert!(player
            .messages
            .iter()
            .any(|m| m.kind == PlayerMessageKind::PlanetColonized));
    }

    #[test]
    fn test_colonize_rejections_leave_state_alone() {
        let player = player();
        let mut universe = universe();
        // scout has no module; colony ship without colonists; colony ship at an owned planet
        let scout = add_fleet(&mut universe, &player, 1, 2, WaypointTask::Colonize);
        let empty = add_fleet(&mut universe, &player, 2, 2, WaypointTask::Colonize);
        let home = add_fleet(&mut universe, &player, 2, 1, WaypointTask::Colonize);
        universe.fleet_mut(home).unwrap().cargo.colonists = 10;

        let player = run(&mut universe, player);

        assert!(!universe.planet(2).unwrap().owned());
        for key in [scout, empty, home] {
            assert!(universe.fleet(key).is_some());
            assert!(universe.fleet(key).unwrap().waypoints[0].task_complete);
        }
        let kinds: Vec<_> = player.messages.iter().map(|m| m.kind).collect();
        assert!(kinds.contains(&PlayerMessageKind::ColonizeNoModule));
        assert!(kinds.contains(&PlayerMessageKind::ColonizeNoColonists));
        assert!(kinds.contains(&PlayerMessageKind::ColonizeOwnedPlanet));
    }

    #[test]
    fn test_colonize_in_deep_space_is_rejected() {
        let player = player();
        let mut universe = universe();
        let key = add_fleet(&mut universe, &player, 2, 2, WaypointTask::Colonize);
        {
            let fleet = universe.fleet_mut(key).unwrap();
            fleet.orbiting_planet_num = None;
            fleet.cargo.colonists = 10;
        }
        let player = run(&mut universe, player);
        assert_eq!(player.messages[0].kind, PlayerMessageKind::ColonizeNotPlanet);
    }

    #[test]
    fn test_load_colonists_leaves_one_behind() {
        let player = player();
        let mut universe = universe();
        universe.planet_mut(1).unwrap().cargo.colonists = 10;
        let load = TransportTasks {
            colonists: TransportAction::LoadAll,
            ..TransportTasks::default()
        };
        let key = add_fleet(&mut universe, &player, 2, 1, WaypointTask::Transport(load));

        run(&mut universe, player);

        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.cargo.colonists, 9);
        assert_eq!(fleet.spec.mass, fleet.spec.base_mass + 9);
        assert_eq!(universe.planet(1).unwrap().cargo.colonists, 1);
    }

    #[test]
    fn test_load_capped_by_cargo_space() {
        let player = player();
        let mut universe = universe();
        let load = TransportTasks {
            colonists: TransportAction::LoadAll,
            ..TransportTasks::default()
        };
        let key = add_fleet(&mut universe, &player, 2, 1, WaypointTask::Transport(load));
        run(&mut universe, player);
        // colony ship hull holds 25 kT
        assert_eq!(universe.fleet(key).unwrap().cargo.colonists, 25);
        assert_eq!(universe.planet(1).unwrap().cargo.colonists, 475);
    }

    #[test]
    fn test_unload_colonists_on_foreign_planet_rejected() {
        let player = player();
        let mut universe = universe();
        let unload = TransportTasks {
            colonists: TransportAction::UnloadAll,
            ironium: TransportAction::UnloadAll,
            ..TransportTasks::default()
        };
        let key = add_fleet(&mut universe, &player, 2, 2, WaypointTask::Transport(unload));
        universe.fleet_mut(key).unwrap().cargo = Cargo::new(4, 0, 0, 10);

        let player = run(&mut universe, player);

        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.cargo.colonists, 10);
        assert_eq!(fleet.cargo.ironium, 0);
        assert_eq!(universe.planet(2).unwrap().cargo.ironium, 4);
        assert_eq!(
            player.messages[0].kind,
            PlayerMessageKind::UnloadColonistsForeignPlanet
        );
    }

    #[test]
    fn test_load_from_foreign_planet_rejected() {
        let player = player();
        let mut universe = universe();
        universe.planet_mut(2).unwrap().cargo.ironium = 50;
        let load = TransportTasks {
            ironium: TransportAction::LoadAmount(10),
            ..TransportTasks::default()
        };
        let key = add_fleet(&mut universe, &player, 2, 2, WaypointTask::Transport(load));
        let player = run(&mut universe, player);
        assert_eq!(universe.fleet(key).unwrap().cargo.ironium, 0);
        assert_eq!(player.messages[0].kind, PlayerMessageKind::LoadInvalid);
    }

    #[test]
    fn test_unload_then_colonize_same_turn() {
        // unload runs before colonize, so the colony receives the cargo too
        let player = player();
        let mut universe = universe();
        let unloader = TransportTasks {
            ironium: TransportAction::UnloadAll,
            ..TransportTasks::default()
        };
        let a = add_fleet(&mut universe, &player, 2, 2, WaypointTask::Transport(unloader));
        universe.fleet_mut(a).unwrap().cargo.ironium = 7;
        let b = add_fleet(&mut universe, &player, 2, 2, WaypointTask::Colonize);
        universe.fleet_mut(b).unwrap().cargo.colonists = 5;

        run(&mut universe, player);

        let planet = universe.planet(2).unwrap();
        assert!(planet.owned_by(1));
        assert!(planet.cargo.ironium >= 7);
    }

    #[test]
    fn test_merge_combines_tokens() {
        let player = player();
        let mut universe = universe();
        let target = add_fleet(&mut universe, &player, 1, 1, WaypointTask::None);
        let source = add_fleet(&mut universe, &player, 1, 1, WaypointTask::MergeWithFleet);
        let single_capacity = universe.fleet(target).unwrap().spec.fuel_capacity;
        {
            let fleet = universe.fleet_mut(source).unwrap();
            fleet.waypoints[0].target = WaypointTarget::Fleet(target);
            fleet.fuel = 30;
        }

        let player = run(&mut universe, player);

        assert!(universe.fleet(source).is_none());
        let merged = universe.fleet(target).unwrap();
        assert_eq!(merged.ship_count(), 2);
        assert_eq!(merged.tokens.len(), 1);
        assert_eq!(merged.fuel, 30);
        assert_eq!(merged.spec.fuel_capacity, 2 * single_capacity);
        assert_eq!(player.messages[0].kind, PlayerMessageKind::FleetMerged);
    }

    #[test]
    fn test_route_appends_waypoint() {
        let player = player();
        let mut universe = universe();
        universe.planet_mut(1).unwrap().route_target = Some(2);
        let key = add_fleet(&mut universe, &player, 1, 1, WaypointTask::Route);
        run(&mut universe, player);
        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.waypoints.len(), 2);
        assert_eq!(fleet.waypoints[1].target_planet(), Some(2));
    }

    #[test]
    fn test_scrap_returns_a_third_of_minerals() {
        let player = player();
        let mut universe = universe();
        let key = add_fleet(&mut universe, &player, 1, 1, WaypointTask::ScrapFleet);
        let cost = universe.fleet(key).unwrap().spec.cost;
        let before = universe.planet(1).unwrap().cargo.ironium;

        let player = run(&mut universe, player);

        assert!(universe.fleet(key).is_none());
        assert_eq!(
            universe.planet(1).unwrap().cargo.ironium,
            before + cost.ironium / 3
        );
        assert_eq!(player.messages[0].kind, PlayerMessageKind::FleetScrapped);
    }

    #[test]
    fn test_scrap_in_deep_space_leaves_salvage() {
        let player = player();
        let mut universe = universe();
        let key = add_fleet(&mut universe, &player, 2, 1, WaypointTask::ScrapFleet);
        {
            let fleet = universe.fleet_mut(key).unwrap();
            fleet.orbiting_planet_num = None;
            fleet.cargo.germanium = 9;
        }
        run(&mut universe, player);
        assert_eq!(universe.salvages.len(), 1);
        assert!(universe.salvages[0].cargo.germanium >= 9);
    }

    #[test]
    fn test_task_runs_once() {
        let player = player();
        let mut universe = universe();
        let load = TransportTasks {
            ironium: TransportAction::LoadAmount(10),
            ..TransportTasks::default()
        };
        let key = add_fleet(&mut universe, &player, 2, 1, WaypointTask::Transport(load));
        let player = run(&mut universe, player);
        run(&mut universe, player);
        assert_eq!(universe.fleet(key).unwrap().cargo.ironium, 10);
    }
}
