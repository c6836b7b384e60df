//! Planet production queues.
//!
//! Each year a planet spends its surface minerals and the resources left
//! after research on its queue, front to back. An item ends the year fully
//! built (removed), partially funded (kept with more `allocated`), or
//! untouched.
//!
//! Auto items never leave the queue. When an auto item runs out of funds
//! part way through a unit, the partial funding is parked in a one-shot
//! concrete item inserted in front of it, so the money is never lost and the
//! auto item keeps regenerating.
//!
//! All calculations use integer math.

use serde::{Deserialize, Serialize};

use crate::cost::{allocate_partial_build, num_buildable, Cost, Mineral};
use crate::error::Result;
use crate::planet::Planet;
use crate::player::{Player, PlayerMessage, PlayerMessageKind};
use crate::race::LesserRacialTrait;
use crate::tech::UNLIMITED_SPACE_DOCK;

/// Policy items that stay in the queue and rebuild every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutoKind {
    /// Build mines up to the planet's maximum.
    Mines,
    /// Build factories up to the planet's maximum.
    Factories,
    /// Build defenses up to the planet's maximum.
    Defenses,
    /// Turn leftover resources into minerals.
    MineralAlchemy,
}

impl AutoKind {
    /// The one-shot item this policy builds.
    #[must_use]
    pub const fn resolve(self) -> ConcreteKind {
        match self {
            Self::Mines => ConcreteKind::Mine,
            Self::Factories => ConcreteKind::Factory,
            Self::Defenses => ConcreteKind::Defenses,
            Self::MineralAlchemy => ConcreteKind::MineralAlchemy,
        }
    }
}

/// One-shot build orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcreteKind {
    /// Mines.
    Mine,
    /// Factories.
    Factory,
    /// Defenses.
    Defenses,
    /// One kT of each mineral per unit.
    MineralAlchemy,
    /// A planetary scanner.
    PlanetaryScanner,
    /// Ships of one of the owner's designs.
    ShipToken {
        /// Design number.
        design_num: u32,
    },
    /// A starbase, replacing the current one.
    Starbase {
        /// Design number.
        design_num: u32,
    },
}

/// An item in a production queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueItemKind {
    /// Policy item.
    Auto(AutoKind),
    /// One-shot item.
    Concrete(ConcreteKind),
}

impl QueueItemKind {
    /// What this item builds this year.
    #[must_use]
    pub const fn resolve(self) -> ConcreteKind {
        match self {
            Self::Auto(auto) => auto.resolve(),
            Self::Concrete(concrete) => concrete,
        }
    }

    /// Policy item.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto(_))
    }
}

/// An entry in a planet's production queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductionQueueItem {
    /// What to build.
    pub kind: QueueItemKind,
    /// Units to build (per year for auto items).
    pub quantity: i32,
    /// Already committed towards the next unit; always less than its cost.
    pub allocated: Cost,
}

impl ProductionQueueItem {
    /// A one-shot item.
    #[must_use]
    pub const fn concrete(kind: ConcreteKind, quantity: i32) -> Self {
        Self {
            kind: QueueItemKind::Concrete(kind),
            quantity,
            allocated: Cost::ZERO,
        }
    }

    /// A policy item.
    #[must_use]
    pub const fn auto(kind: AutoKind, quantity: i32) -> Self {
        Self {
            kind: QueueItemKind::Auto(kind),
            quantity,
            allocated: Cost::ZERO,
        }
    }
}

/// Named queue template applied to newly founded colonies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionPlan {
    /// Display name.
    pub name: String,
    /// Items copied into the queue.
    pub items: Vec<ProductionQueueItem>,
    /// New colonies only send leftovers to research.
    pub contributes_only_leftover_to_research: bool,
}

impl Default for ProductionPlan {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            items: vec![
                ProductionQueueItem::auto(AutoKind::Factories, 100),
                ProductionQueueItem::auto(AutoKind::Mines, 100),
            ],
            contributes_only_leftover_to_research: false,
        }
    }
}

impl ProductionPlan {
    /// Replace a planet's queue with this plan.
    pub fn apply(&self, planet: &mut Planet) {
        planet.production_queue = self.items.clone();
        planet.contribute_only_leftover_to_research = self.contributes_only_leftover_to_research;
    }
}

/// Ships finished this year, to be turned into a fleet by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltShips {
    /// Design number.
    pub design_num: u32,
    /// Ships built.
    pub quantity: i32,
}

/// Outcome of one planet's production year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionResult {
    /// Planet number.
    pub planet_num: u32,
    /// Mines built.
    pub mines: i32,
    /// Factories built.
    pub factories: i32,
    /// Defenses built.
    pub defenses: i32,
    /// Minerals made by alchemy.
    pub alchemy: Mineral,
    /// A planetary scanner was installed.
    pub scanner: bool,
    /// Ships built, one entry per queue item.
    pub ships: Vec<BuiltShips>,
    /// New starbase design.
    pub starbase: Option<u32>,
    /// Resources nobody spent; they go to research.
    pub leftover_resources: i32,
    /// Messages for the owner.
    pub messages: Vec<PlayerMessage>,
}

/// Runs a planet's production queue for a year.
pub struct ProductionQueueEngine<'a> {
    player: &'a Player,
}

impl<'a> ProductionQueueEngine<'a> {
    /// Engine for one player's planets.
    #[must_use]
    pub const fn new(player: &'a Player) -> Self {
        Self { player }
    }

    /// Spend this year's resources on the planet's queue.
    ///
    /// Mines, factories, defenses, scanners and alchemy are applied to the
    /// planet directly. Ships and starbases are returned for the caller to
    /// materialize. The planet's spec must be current.
    pub fn produce(&self, planet: &mut Planet) -> Result<ProductionResult> {
        let mut result = ProductionResult {
            planet_num: planet.num,
            ..ProductionResult::default()
        };
        let mut available = Cost::from_minerals(
            planet.cargo.minerals(),
            planet.spec.resources_per_year_available,
        );

        let items = std::mem::take(&mut planet.production_queue);
        let mut queue = Vec::with_capacity(items.len() + 1);

        for mut item in items {
            if available.resources <= 0 {
                queue.push(item);
                continue;
            }

            let concrete = item.kind.resolve();
            let unit_cost = self.cost_of(concrete, planet)?;
            let capacity = self.capacity(concrete, planet);
            let want = item.quantity.min(capacity - pending(&result, concrete));

            if want <= 0 {
                if capacity == 0 {
                    if let ConcreteKind::ShipToken { .. } = concrete {
                        result.messages.push(PlayerMessage::planet(
                            PlayerMessageKind::NoDockForShip,
                            planet.num,
                            format!("{} has no dock able to build ships", planet.name),
                        ));
                    }
                }
                queue.push(item);
                continue;
            }

            let mut built = 0;
            let mut allocated = item.allocated;

            // finish the unit already in progress
            if !allocated.is_zero() {
                let needed = (unit_cost - allocated).clamp_non_negative();
                if num_buildable(available, needed) >= 1 {
                    available -= needed;
                    allocated = Cost::ZERO;
                    built = 1;
                } else {
                    let funded = allocate_partial_build(needed, available);
                    available -= funded;
                    item.allocated = allocated + funded;
                    queue.push(item);
                    continue;
                }
            }

            let affordable = num_buildable(available, unit_cost);
            let more = affordable.min(want - built).max(0);
            available -= unit_cost * more;
            built += more;

            if built > 0 {
                self.apply_built(concrete, built, planet, &mut result);
            }

            let short = want - built;
            let partial = if short > 0 {
                allocate_partial_build(unit_cost, available)
            } else {
                Cost::ZERO
            };
            available -= partial;

            match item.kind {
                QueueItemKind::Auto(_) => {
                    if !partial.is_zero() {
                        queue.push(ProductionQueueItem {
                            kind: QueueItemKind::Concrete(concrete),
                            quantity: 1,
                            allocated: partial,
                        });
                    }
                    item.allocated = Cost::ZERO;
                    queue.push(item);
                }
                QueueItemKind::Concrete(_) => {
                    item.quantity -= built;
                    item.allocated = allocated + partial;
                    if item.quantity > 0 {
                        queue.push(item);
                    }
                }
            }
        }

        planet.production_queue = queue;
        planet.cargo.ironium = available.ironium;
        planet.cargo.boranium = available.boranium;
        planet.cargo.germanium = available.germanium;
        planet.cargo.add_minerals(result.alchemy);
        result.leftover_resources = available.resources.max(0);

        if planet.production_queue.is_empty() {
            result.messages.push(PlayerMessage::planet(
                PlayerMessageKind::QueueEmpty,
                planet.num,
                format!("{} has nothing left to build", planet.name),
            ));
        }

        Ok(result)
    }

    /// Cost of one unit of a concrete item on this planet.
    pub fn cost_of(&self, kind: ConcreteKind, planet: &Planet) -> Result<Cost> {
        let race = &self.player.race;
        Ok(match kind {
            ConcreteKind::Mine => Cost::new(0, 0, 0, race.mine_cost),
            ConcreteKind::Factory => {
                let germanium = if race.factories_cost_less { 3 } else { 4 };
                Cost::new(0, 0, germanium, race.factory_cost)
            }
            ConcreteKind::Defenses => Cost::new(5, 5, 5, 15),
            ConcreteKind::MineralAlchemy => {
                if race.has_lrt(LesserRacialTrait::MineralAlchemy) {
                    Cost::new(0, 0, 0, 25)
                } else {
                    Cost::new(0, 0, 0, 100)
                }
            }
            ConcreteKind::PlanetaryScanner => Cost::new(10, 10, 70, 100),
            ConcreteKind::ShipToken { design_num } => {
                self.player.require_design(design_num)?.spec.cost
            }
            ConcreteKind::Starbase { design_num } => {
                let cost = self.player.require_design(design_num)?.spec.cost;
                // upgrading credits the current starbase
                let credit = planet
                    .spec
                    .starbase_design_num
                    .and_then(|num| self.player.design(num))
                    .map_or(Cost::ZERO, |d| d.spec.cost);
                (cost - credit).clamp_non_negative()
            }
        })
    }

    /// How many more units of an item the planet can take.
    fn capacity(&self, kind: ConcreteKind, planet: &Planet) -> i32 {
        match kind {
            ConcreteKind::Mine => (planet.spec.max_mines - planet.mines).max(0),
            ConcreteKind::Factory => (planet.spec.max_factories - planet.factories).max(0),
            ConcreteKind::Defenses => (planet.spec.max_defenses - planet.defenses).max(0),
            ConcreteKind::MineralAlchemy => i32::MAX,
            ConcreteKind::PlanetaryScanner => i32::from(!planet.scanner),
            ConcreteKind::ShipToken { design_num } => {
                let dock = planet.spec.dock_capacity;
                let mass = self.player.design(design_num).map_or(0, |d| d.spec.mass);
                if dock == UNLIMITED_SPACE_DOCK || (dock > 0 && mass <= dock) {
                    i32::MAX
                } else {
                    0
                }
            }
            ConcreteKind::Starbase { .. } => 1,
        }
    }

    fn apply_built(
        &self,
        kind: ConcreteKind,
        count: i32,
        planet: &mut Planet,
        result: &mut ProductionResult,
    ) {
        let (message_kind, text) = match kind {
            ConcreteKind::Mine => {
                planet.mines += count;
                result.mines += count;
                (PlayerMessageKind::BuiltMine, format!("{count} mine(s)"))
            }
            ConcreteKind::Factory => {
                planet.factories += count;
                result.factories += count;
                (PlayerMessageKind::BuiltFactory, format!("{count} factory(ies)"))
            }
            ConcreteKind::Defenses => {
                planet.defenses += count;
                result.defenses += count;
                (PlayerMessageKind::BuiltDefense, format!("{count} defense(s)"))
            }
            ConcreteKind::MineralAlchemy => {
                result.alchemy += Mineral::splat(count);
                (
                    PlayerMessageKind::BuiltMineralAlchemy,
                    format!("{count}kT of each mineral by alchemy"),
                )
            }
            ConcreteKind::PlanetaryScanner => {
                planet.scanner = true;
                result.scanner = true;
                (
                    PlayerMessageKind::BuiltScanner,
                    "a planetary scanner".to_string(),
                )
            }
            ConcreteKind::ShipToken { design_num } => {
                result.ships.push(BuiltShips {
                    design_num,
                    quantity: count,
                });
                let name = self
                    .player
                    .design(design_num)
                    .map_or("ship", |d| d.name.as_str());
                (PlayerMessageKind::BuiltShip, format!("{count} {name}"))
            }
            ConcreteKind::Starbase { design_num } => {
                result.starbase = Some(design_num);
                let name = self
                    .player
                    .design(design_num)
                    .map_or("starbase", |d| d.name.as_str());
                (PlayerMessageKind::BuiltStarbase, format!("starbase {name}"))
            }
        };

        tracing::debug!(planet = planet.num, ?kind, count, "built");
        result.messages.push(PlayerMessage::planet(
            message_kind,
            planet.num,
            format!("{} has built {text}", planet.name),
        ));
    }
}

/// Units of a kind already built this year by earlier queue items.
fn pending(result: &ProductionResult, kind: ConcreteKind) -> i32 {
    match kind {
        ConcreteKind::Starbase { .. } => i32::from(result.starbase.is_some()),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ShipDesign;
    use crate::math::Vec2Fixed;
    use crate::race::{Race, ShipDesignPurpose};
    use crate::rules::Rules;
    use crate::tech::{names, StandardCatalog};

    fn player() -> Player {
        let rules = Rules::default();
        let catalog = StandardCatalog::new();
        let mut player = Player::new(1, "Builder", Race::default(), &rules);
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
        player
    }

    fn planet(resources: i32, minerals: i32) -> Planet {
        let mut planet = Planet::new(1, "Forge", Vec2Fixed::ZERO);
        planet.player_num = Some(1);
        planet.cargo.ironium = minerals;
        planet.cargo.boranium = minerals;
        planet.cargo.germanium = minerals;
        planet.spec.resources_per_year_available = resources;
        planet.spec.max_mines = 250;
        planet.spec.max_factories = 250;
        planet.spec.max_defenses = 100;
        planet
    }

    fn engine_run(planet: &mut Planet, player: &Player) -> ProductionResult {
        ProductionQueueEngine::new(player).produce(planet).unwrap()
    }

    #[test]
    fn test_builds_whole_units_and_keeps_auto_item() {
        let player = player();
        let mut planet = planet(25, 0);
        planet.production_queue = vec![ProductionQueueItem::auto(AutoKind::Mines, 10)];

        let result = engine_run(&mut planet, &player);

        assert_eq!(result.mines, 5);
        assert_eq!(planet.mines, 5);
        assert_eq!(result.leftover_resources, 0);
        assert_eq!(planet.production_queue.len(), 1);
        assert!(planet.production_queue[0].kind.is_auto());
    }

    #[test]
    fn test_auto_item_parks_partial_progress_in_front() {
        let player = player();
        // 12 resources: 1 factory (10r + 4g) then 2 of the next 10 resources
        let mut planet = planet(12, 100);
        planet.production_queue = vec![ProductionQueueItem::auto(AutoKind::Factories, 5)];

        let result = engine_run(&mut planet, &player);

        assert_eq!(result.factories, 1);
        assert_eq!(planet.production_queue.len(), 2);
        let parked = planet.production_queue[0];
        assert_eq!(parked.kind, QueueItemKind::Concrete(ConcreteKind::Factory));
        assert_eq!(parked.quantity, 1);
        // 2 of 10 resources funded, germanium scaled to the same fraction
        assert_eq!(parked.allocated, Cost::new(0, 0, 0, 2));
        assert!(planet.production_queue[1].kind.is_auto());
        assert_eq!(planet.cargo.germanium, 96);
    }

    #[test]
    fn test_partial_item_finishes_next_year() {
        let player = player();
        let mut planet = planet(3, 0);
        planet.production_queue = vec![ProductionQueueItem::concrete(ConcreteKind::Mine, 1)];

        engine_run(&mut planet, &player);
        assert_eq!(planet.production_queue[0].allocated, Cost::new(0, 0, 0, 3));
        assert_eq!(planet.mines, 0);

        planet.spec.resources_per_year_available = 2;
        let result = engine_run(&mut planet, &player);
        assert_eq!(result.mines, 1);
        assert!(planet.production_queue.is_empty());
        assert_eq!(result.leftover_resources, 0);
    }

    #[test]
    fn test_stops_when_resources_run_out() {
        let player = player();
        let mut planet = planet(10, 0);
        planet.production_queue = vec![
            ProductionQueueItem::concrete(ConcreteKind::Mine, 2),
            ProductionQueueItem::concrete(ConcreteKind::Defenses, 4),
            ProductionQueueItem::auto(AutoKind::Mines, 5),
        ];

        let result = engine_run(&mut planet, &player);

        assert_eq!(result.mines, 2);
        assert_eq!(planet.production_queue.len(), 2);
        assert_eq!(
            planet.production_queue[0],
            ProductionQueueItem::concrete(ConcreteKind::Defenses, 4)
        );
    }

    #[test]
    fn test_capacity_limits_mines() {
        let player = player();
        let mut planet = planet(100, 0);
        planet.spec.max_mines = 3;
        planet.production_queue = vec![ProductionQueueItem::auto(AutoKind::Mines, 10)];

        let result = engine_run(&mut planet, &player);

        assert_eq!(result.mines, 3);
        assert_eq!(result.leftover_resources, 85);
    }

    #[test]
    fn test_ship_without_dock_is_untouched() {
        let player = player();
        let mut planet = planet(100, 100);
        let item = ProductionQueueItem::concrete(ConcreteKind::ShipToken { design_num: 1 }, 1);
        planet.production_queue = vec![item];

        let result = engine_run(&mut planet, &player);

        assert!(result.ships.is_empty());
        assert_eq!(planet.production_queue, vec![item]);
        assert!(result
            .messages
            .iter()
            .any(|m| m.kind == PlayerMessageKind::NoDockForShip));
    }

    #[test]
    fn test_ship_with_dock_is_returned_to_caller() {
        let player = player();
        let mut planet = planet(1000, 1000);
        planet.spec.dock_capacity = UNLIMITED_SPACE_DOCK;
        planet.production_queue = vec![ProductionQueueItem::concrete(
            ConcreteKind::ShipToken { design_num: 1 },
            2,
        )];

        let result = engine_run(&mut planet, &player);

        assert_eq!(
            result.ships,
            vec![BuiltShips {
                design_num: 1,
                quantity: 2
            }]
        );
        let cost = player.design(1).unwrap().spec.cost;
        assert_eq!(result.leftover_resources, 1000 - 2 * cost.resources);
        assert_eq!(planet.cargo.ironium, 1000 - 2 * cost.ironium);
    }

    #[test]
    fn test_unknown_design_aborts() {
        let player = player();
        let mut planet = planet(100, 100);
        planet.production_queue = vec![ProductionQueueItem::concrete(
            ConcreteKind::ShipToken { design_num: 42 },
            1,
        )];
        let err = ProductionQueueEngine::new(&player)
            .produce(&mut planet)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::GameError::UnknownDesign { design: 42, .. }
        ));
    }

    #[test]
    fn test_scanner_only_once() {
        let player = player();
        let mut planet = planet(500, 500);
        planet.production_queue = vec![ProductionQueueItem::concrete(
            ConcreteKind::PlanetaryScanner,
            3,
        )];

        let result = engine_run(&mut planet, &player);

        assert!(result.scanner);
        assert!(planet.scanner);
        // capacity was one; the rest stays queued
        assert_eq!(planet.production_queue[0].quantity, 2);
    }
}
