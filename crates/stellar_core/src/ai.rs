//! Heuristic AI player.
//!
//! Runs once per year after discovery. The AI only issues orders (fleet
//! routes, production queue entries, new designs); the turn pipeline carries
//! them out like any human player's orders.
//!
//! - Idle scouts head for the nearest unexplored planet nobody else is
//!   heading for.
//! - Idle colony ships load colonists at home and fly to the most habitable
//!   unowned planet they know of.
//! - Planets with a dock queue more scouts and colony ships while there is
//!   something left to explore or settle.

use std::collections::BTreeSet;

use crate::design::ShipDesign;
use crate::error::Result;
use crate::fleet::{FleetKey, TransportAction, TransportTasks, Waypoint, WaypointTask};
use crate::math::Vec2Fixed;
use crate::player::Player;
use crate::production::{AutoKind, ConcreteKind, ProductionQueueItem, QueueItemKind};
use crate::race::ShipDesignPurpose;
use crate::rules::Rules;
use crate::tech::{names, TechCatalog};
use crate::universe::Universe;

/// Most scouts the AI keeps in service.
const MAX_SCOUTS: usize = 3;

/// Most colony ships the AI keeps in service.
const MAX_COLONIZERS: usize = 2;

/// Planets below this population do not send out colonists.
const MIN_SOURCE_POPULATION: i32 = 5_000;

/// Issue this year's orders for an AI player.
pub fn process_turn(
    player: &mut Player,
    universe: &mut Universe,
    rules: &Rules,
    catalog: &dyn TechCatalog,
) -> Result<()> {
    let scout = ensure_design(player, ShipDesignPurpose::Scout, names::SCOUT, catalog)?;
    let colonizer = ensure_design(
        player,
        ShipDesignPurpose::Colonizer,
        names::COLONY_SHIP,
        catalog,
    )?;

    let mut claimed = claimed_planets(player, universe);
    dispatch_scouts(player, universe, &mut claimed);
    dispatch_colonizers(player, universe, rules, &mut claimed);
    queue_ships(player, universe, scout, colonizer, &claimed);
    keep_auto_items(player, universe);

    tracing::trace!(player = player.num, "ai orders issued");
    Ok(())
}

/// Number of the player's design for a purpose, designing one if needed.
fn ensure_design(
    player: &mut Player,
    purpose: ShipDesignPurpose,
    hull: &str,
    catalog: &dyn TechCatalog,
) -> Result<u32> {
    if let Some(design) = player.designs.iter().find(|d| d.purpose == Some(purpose)) {
        return Ok(design.num);
    }
    let num = player.next_design_num();
    let design = ShipDesign::for_purpose(
        num,
        player.num,
        hull,
        hull,
        purpose,
        &player.race,
        &player.tech_levels,
        catalog,
    )?;
    tracing::debug!(player = player.num, design = num, ?purpose, "ai designed ship");
    player.designs.push(design);
    Ok(num)
}

/// Planets some fleet of the player is already heading for.
fn claimed_planets(player: &Player, universe: &Universe) -> BTreeSet<u32> {
    universe
        .player_fleets(player.num)
        .filter(|f| f.has_orders())
        .filter_map(|f| f.waypoints.last().and_then(Waypoint::target_planet))
        .collect()
}

/// Idle, non-starbase fleets of the player built for `purpose`.
fn idle_fleets(player: &Player, universe: &Universe, purpose: ShipDesignPurpose) -> Vec<FleetKey> {
    universe
        .player_fleets(player.num)
        .filter(|f| !f.starbase && !f.has_orders() && f.purpose == Some(purpose))
        .map(|f| f.key())
        .collect()
}

fn nearest<I>(from: Vec2Fixed, candidates: I) -> Option<(u32, Vec2Fixed)>
where
    I: Iterator<Item = (u32, Vec2Fixed)>,
{
    candidates.min_by_key(|&(num, pos)| (from.distance_squared(pos), num))
}

fn dispatch_scouts(player: &Player, universe: &mut Universe, claimed: &mut BTreeSet<u32>) {
    for key in idle_fleets(player, universe, ShipDesignPurpose::Scout) {
        let Some(fleet) = universe.fleet(key) else {
            continue;
        };
        let target = nearest(
            fleet.position,
            player
                .planet_intels
                .iter()
                .filter(|p| !p.explored() && !claimed.contains(&p.num))
                .map(|p| (p.num, p.position)),
        );
        let Some((num, position)) = target else {
            continue;
        };
        let warp = fleet.spec.ideal_speed;
        claimed.insert(num);
        if let Some(fleet) = universe.fleet_mut(key) {
            fleet.send_to_planet(num, position, warp, WaypointTask::None);
            tracing::debug!(fleet = %key, planet = num, "ai scout dispatched");
        }
    }
}

/// Explored, unowned planets the player's race can live on, best first.
fn colony_targets(player: &Player, claimed: &BTreeSet<u32>) -> Vec<(u32, Vec2Fixed, i32)> {
    let mut targets: Vec<_> = player
        .planet_intels
        .iter()
        .filter(|p| p.explored() && p.player_num.is_none() && !claimed.contains(&p.num))
        .filter_map(|p| {
            let hab = player.race.habitability(p.hab?);
            (hab > 0).then_some((p.num, p.position, hab))
        })
        .collect();
    targets.sort_by_key(|&(num, _, hab)| (std::cmp::Reverse(hab), num));
    targets
}

fn dispatch_colonizers(
    player: &Player,
    universe: &mut Universe,
    rules: &Rules,
    claimed: &mut BTreeSet<u32>,
) {
    for key in idle_fleets(player, universe, ShipDesignPurpose::Colonizer) {
        let Some(fleet) = universe.fleet(key) else {
            continue;
        };
        let targets = colony_targets(player, claimed);
        let Some(&(target, position, _)) = targets.first() else {
            return;
        };

        // load colonists first if the fleet sits at a populous planet of ours
        let has_colonists = fleet.cargo.colonists >= rules.min_colonists;
        let source = fleet.orbiting_planet_num.filter(|&num| {
            universe.planet(num).is_ok_and(|p| {
                p.owned_by(player.num) && p.population() >= MIN_SOURCE_POPULATION
            })
        });
        if !has_colonists && source.is_none() {
            continue;
        }

        let warp = fleet.spec.ideal_speed;
        let here = fleet.position;
        claimed.insert(target);
        let Some(fleet) = universe.fleet_mut(key) else {
            continue;
        };
        fleet.send_to_planet(target, position, warp, WaypointTask::Colonize);
        if let (false, Some(source)) = (has_colonists, source) {
            let load = TransportTasks {
                colonists: TransportAction::LoadAll,
                ..TransportTasks::default()
            };
            if let Some(first) = fleet.waypoints.first_mut() {
                *first = Waypoint::planet(source, here, 0).with_task(WaypointTask::Transport(load));
            }
        }
        tracing::debug!(fleet = %key, planet = target, "ai colonizer dispatched");
    }
}

fn queued(universe: &Universe, player: &Player, design_num: u32) -> usize {
    let kind = QueueItemKind::Concrete(ConcreteKind::ShipToken { design_num });
    universe
        .player_planets(player.num)
        .flat_map(|p| p.production_queue.iter())
        .filter(|item| item.kind == kind)
        .map(|item| usize::try_from(item.quantity).unwrap_or(0))
        .sum()
}

fn in_service(universe: &Universe, player: &Player, purpose: ShipDesignPurpose) -> usize {
    universe
        .player_fleets(player.num)
        .filter(|f| f.purpose == Some(purpose))
        .map(|f| usize::try_from(f.ship_count()).unwrap_or(0))
        .sum()
}

fn queue_ships(
    player: &Player,
    universe: &mut Universe,
    scout: u32,
    colonizer: u32,
    claimed: &BTreeSet<u32>,
) {
    let unexplored = player
        .planet_intels
        .iter()
        .filter(|p| !p.explored() && !claimed.contains(&p.num))
        .count();
    let targets = colony_targets(player, claimed).len();

    let scouts = in_service(universe, player, ShipDesignPurpose::Scout);
    let colonizers = in_service(universe, player, ShipDesignPurpose::Colonizer);

    // one of each in the queue at a time
    let mut wanted = Vec::new();
    if unexplored > 0 && queued(universe, player, scout) == 0 && scouts < MAX_SCOUTS {
        wanted.push(scout);
    }
    if targets > 0 && queued(universe, player, colonizer) == 0 && colonizers < MAX_COLONIZERS {
        wanted.push(colonizer);
    }
    if wanted.is_empty() {
        return;
    }

    let Some(yard) = universe
        .player_planets(player.num)
        .filter(|p| p.spec.dock_capacity != 0 && p.population() >= MIN_SOURCE_POPULATION)
        .max_by_key(|p| (p.spec.resources_per_year, std::cmp::Reverse(p.num)))
        .map(|p| p.num)
    else {
        return;
    };
    let Ok(planet) = universe.planet_mut(yard) else {
        return;
    };
    // scouts end up first in line
    for design_num in wanted.into_iter().rev() {
        planet.production_queue.insert(
            0,
            ProductionQueueItem::concrete(ConcreteKind::ShipToken { design_num }, 1),
        );
        tracing::debug!(planet = yard, design = design_num, "ai queued ship");
    }
}

/// Every owned planet keeps building mines and factories.
fn keep_auto_items(player: &Player, universe: &mut Universe) {
    for planet in universe
        .planets
        .iter_mut()
        .filter(|p| p.owned_by(player.num))
    {
        for auto in [AutoKind::Factories, AutoKind::Mines] {
            let kind = QueueItemKind::Auto(auto);
            if !planet.production_queue.iter().any(|item| item.kind == kind) {
                planet
                    .production_queue
                    .push(ProductionQueueItem::auto(auto, 100));
            }
        }
    }
}
