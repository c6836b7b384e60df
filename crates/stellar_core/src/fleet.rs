//! Fleets, ship tokens and waypoints.
//!
//! Starbases are fleets too: they have a single token with a starbase hull,
//! sit on their planet's position and never move.

use serde::{Deserialize, Serialize};

use crate::cost::{Cargo, CargoType, Cost};
use crate::design::ShipDesign;
use crate::error::{GameError, Result};
use crate::math::Vec2Fixed;
use crate::player::PlayerNum;
use crate::race::ShipDesignPurpose;
use crate::tech::{Engine, Stargate};

/// Identifies a fleet across players: fleet numbers are per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FleetKey {
    /// Owner.
    pub owner: PlayerNum,
    /// Fleet number within the owner's fleets.
    pub num: u32,
}

impl FleetKey {
    /// Create a new key.
    #[must_use]
    pub const fn new(owner: PlayerNum, num: u32) -> Self {
        Self { owner, num }
    }
}

impl std::fmt::Display for FleetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.owner, self.num)
    }
}

/// A stack of identical ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipToken {
    /// Design number (per owner).
    pub design_num: u32,
    /// Number of ships.
    pub quantity: i32,
    /// Damage per damaged ship.
    pub damage: i32,
    /// How many of the ships are damaged.
    pub quantity_damaged: i32,
}

impl ShipToken {
    /// Undamaged ships of one design.
    #[must_use]
    pub const fn new(design_num: u32, quantity: i32) -> Self {
        Self {
            design_num,
            quantity,
            damage: 0,
            quantity_damaged: 0,
        }
    }
}

/// Warp speed meaning "jump through the stargate".
pub const STARGATE_WARP_SPEED: i32 = 11;

/// What a waypoint points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaypointTarget {
    /// A bare position in space.
    #[default]
    Position,
    /// A planet, by number.
    Planet(u32),
    /// Another fleet.
    Fleet(FleetKey),
}

/// Cargo instruction for one cargo type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportAction {
    /// Leave this cargo alone.
    #[default]
    None,
    /// Load as much as fits.
    LoadAll,
    /// Unload everything.
    UnloadAll,
    /// Load up to this many kT.
    LoadAmount(i32),
    /// Unload up to this many kT.
    UnloadAmount(i32),
}

impl TransportAction {
    /// True for load instructions.
    #[must_use]
    pub const fn is_load(self) -> bool {
        matches!(self, Self::LoadAll | Self::LoadAmount(_))
    }

    /// True for unload instructions.
    #[must_use]
    pub const fn is_unload(self) -> bool {
        matches!(self, Self::UnloadAll | Self::UnloadAmount(_))
    }
}

/// Per-cargo transport instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportTasks {
    /// Ironium.
    pub ironium: TransportAction,
    /// Boranium.
    pub boranium: TransportAction,
    /// Germanium.
    pub germanium: TransportAction,
    /// Colonists.
    pub colonists: TransportAction,
}

impl TransportTasks {
    /// Instruction for one cargo type.
    #[must_use]
    pub const fn get(&self, kind: CargoType) -> TransportAction {
        match kind {
            CargoType::Ironium => self.ironium,
            CargoType::Boranium => self.boranium,
            CargoType::Germanium => self.germanium,
            CargoType::Colonists => self.colonists,
        }
    }
}

/// Task performed when a fleet reaches a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaypointTask {
    /// Nothing.
    #[default]
    None,
    /// Load and unload cargo.
    Transport(TransportTasks),
    /// Found a colony on the target planet.
    Colonize,
    /// Merge into the target fleet.
    MergeWithFleet,
    /// Continue to the target planet's route destination.
    Route,
    /// Scrap the fleet, returning some minerals to the planet.
    ScrapFleet,
    /// Remote mine the target planet (hook).
    RemoteMining,
    /// Lay mines (hook).
    LayMineField,
    /// Patrol for enemies (hook).
    Patrol,
}

/// One leg of a fleet's route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Destination.
    pub position: Vec2Fixed,
    /// What is at the destination.
    pub target: WaypointTarget,
    /// Warp factor to travel at.
    pub warp_speed: i32,
    /// Task at the destination.
    pub task: WaypointTask,
    /// Set once the task has run, so it does not run twice in a turn.
    pub task_complete: bool,
}

impl Waypoint {
    /// Waypoint at a planet.
    #[must_use]
    pub const fn planet(num: u32, position: Vec2Fixed, warp_speed: i32) -> Self {
        Self {
            position,
            target: WaypointTarget::Planet(num),
            warp_speed,
            task: WaypointTask::None,
            task_complete: false,
        }
    }

    /// Waypoint at a bare position.
    #[must_use]
    pub const fn position(position: Vec2Fixed, warp_speed: i32) -> Self {
        Self {
            position,
            target: WaypointTarget::Position,
            warp_speed,
            task: WaypointTask::None,
            task_complete: false,
        }
    }

    /// Same waypoint with a task.
    #[must_use]
    pub const fn with_task(mut self, task: WaypointTask) -> Self {
        self.task = task;
        self
    }

    /// Target planet number, if any.
    #[must_use]
    pub const fn target_planet(&self) -> Option<u32> {
        match self.target {
            WaypointTarget::Planet(num) => Some(num),
            _ => None,
        }
    }
}

/// A fleet (or starbase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    /// Number, unique per owner.
    pub num: u32,
    /// Owner.
    pub player_num: PlayerNum,
    /// Display name.
    pub name: String,
    /// Position on the map.
    pub position: Vec2Fixed,
    /// Ships.
    pub tokens: Vec<ShipToken>,
    /// Route; index 0 is the current position or leg.
    pub waypoints: Vec<Waypoint>,
    /// Fuel in mg.
    pub fuel: i32,
    /// Cargo aboard.
    pub cargo: Cargo,
    /// Planet the fleet orbits.
    pub orbiting_planet_num: Option<u32>,
    /// Starbase over `orbiting_planet_num`.
    pub starbase: bool,
    /// Years since the fleet was built.
    pub age: i32,
    /// Position at the start of the year.
    pub previous_position: Option<Vec2Fixed>,
    /// Why the fleet was built.
    pub purpose: Option<ShipDesignPurpose>,
    /// Scheduled for removal at the end of the phase.
    #[serde(skip)]
    pub deleted: bool,
    /// Derived stats.
    #[serde(default)]
    pub spec: FleetSpec,
}

impl Fleet {
    /// A new fleet at a position with a single "stay here" waypoint.
    #[must_use]
    pub fn new(
        num: u32,
        player_num: PlayerNum,
        name: impl Into<String>,
        position: Vec2Fixed,
        tokens: Vec<ShipToken>,
    ) -> Self {
        Self {
            num,
            player_num,
            name: name.into(),
            position,
            tokens,
            waypoints: vec![Waypoint::position(position, 0)],
            fuel: 0,
            cargo: Cargo::default(),
            orbiting_planet_num: None,
            starbase: false,
            age: 0,
            previous_position: None,
            purpose: None,
            deleted: false,
            spec: FleetSpec::default(),
        }
    }

    /// Key of this fleet.
    #[must_use]
    pub const fn key(&self) -> FleetKey {
        FleetKey::new(self.player_num, self.num)
    }

    /// Total ships in the fleet.
    #[must_use]
    pub fn ship_count(&self) -> i32 {
        self.tokens.iter().map(|t| t.quantity).sum()
    }

    /// Has somewhere to go beyond its current position.
    #[must_use]
    pub fn has_orders(&self) -> bool {
        self.waypoints.len() > 1
    }

    /// Remaining cargo space.
    #[must_use]
    pub fn available_cargo_space(&self) -> i32 {
        (self.spec.cargo_capacity - self.cargo.total()).max(0)
    }

    /// Refresh the cached total mass after cargo changed.
    pub fn refresh_mass(&mut self) {
        self.spec.mass = self.spec.base_mass + self.cargo.total();
    }

    /// Recompute the cached spec from the owner's designs.
    pub fn compute_spec(&mut self, designs: &[ShipDesign]) -> Result<()> {
        self.spec = FleetSpec::compute(self, designs)?;
        Ok(())
    }

    /// Replace the route with a single leg to a planet.
    pub fn send_to_planet(&mut self, num: u32, position: Vec2Fixed, warp: i32, task: WaypointTask) {
        self.waypoints.truncate(1);
        if let Some(first) = self.waypoints.first_mut() {
            first.task = WaypointTask::None;
            first.task_complete = false;
        }
        self.waypoints
            .push(Waypoint::planet(num, position, warp).with_task(task));
    }
}

/// Derived fleet stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSpec {
    /// Cost of every ship.
    pub cost: Cost,
    /// Mass of the ships without cargo.
    pub base_mass: i32,
    /// Mass including cargo.
    pub mass: i32,
    /// Armor of every ship.
    pub armor: i32,
    /// Shields of every ship.
    pub shield: i32,
    /// Fuel capacity.
    pub fuel_capacity: i32,
    /// Cargo capacity.
    pub cargo_capacity: i32,
    /// Slowest engine's ideal warp.
    pub ideal_speed: i32,
    /// Engine of each token, in token order.
    pub engines: Vec<Option<Engine>>,
    /// Carries at least one scanner part.
    pub scanner: bool,
    /// Best normal range.
    pub scan_range: i32,
    /// Best penetrating range.
    pub scan_range_pen: i32,
    /// Least cloaked ship decides.
    pub cloak_percent: i32,
    /// Best cloak reduction.
    pub reduce_cloaking: i32,
    /// Has a colonization module.
    pub colonizer: bool,
    /// Scanners see fleet cargo.
    pub can_steal_fleet_cargo: bool,
    /// Scanners see planet cargo.
    pub can_steal_planet_cargo: bool,
    /// A starbase.
    pub starbase: bool,
    /// Space dock of a starbase.
    pub space_dock: i32,
    /// Stargate of a starbase.
    pub stargate: Option<Stargate>,
}

impl FleetSpec {
    /// Aggregate the specs of the fleet's designs.
    pub fn compute(fleet: &Fleet, designs: &[ShipDesign]) -> Result<Self> {
        let mut spec = Self {
            cloak_percent: if fleet.tokens.is_empty() { 0 } else { 100 },
            ideal_speed: i32::MAX,
            ..Self::default()
        };

        for token in &fleet.tokens {
            let design = designs
                .iter()
                .find(|d| d.num == token.design_num)
                .ok_or(GameError::UnknownDesign {
                    player: fleet.player_num,
                    design: token.design_num,
                })?;
            let ds = &design.spec;
            let qty = token.quantity;

            spec.cost += ds.cost * qty;
            spec.base_mass += ds.mass * qty;
            spec.armor += ds.armor * qty;
            spec.shield += ds.shield * qty;
            spec.fuel_capacity += ds.fuel_capacity * qty;
            spec.cargo_capacity += ds.cargo_capacity * qty;
            spec.engines.push(ds.engine);
            if let Some(engine) = ds.engine {
                spec.ideal_speed = spec.ideal_speed.min(engine.ideal_speed);
            }
            if ds.scanner {
                spec.scanner = true;
                spec.scan_range = spec.scan_range.max(ds.scan_range);
                spec.scan_range_pen = spec.scan_range_pen.max(ds.scan_range_pen);
            }
            spec.cloak_percent = spec.cloak_percent.min(ds.cloak_percent);
            spec.reduce_cloaking = spec.reduce_cloaking.max(ds.reduce_cloaking);
            spec.colonizer |= ds.colonizer;
            spec.can_steal_fleet_cargo |= ds.can_steal_fleet_cargo;
            spec.can_steal_planet_cargo |= ds.can_steal_planet_cargo;
            if ds.starbase {
                spec.starbase = true;
                spec.space_dock = ds.space_dock;
                spec.stargate = ds.stargate;
            }
        }

        if spec.ideal_speed == i32::MAX {
            spec.ideal_speed = 0;
        }
        spec.mass = spec.base_mass + fleet.cargo.total();
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::Race;
    use crate::tech::{names, StandardCatalog, TechLevel};

    fn designs() -> Vec<ShipDesign> {
        let catalog = StandardCatalog::new();
        let race = Race::default();
        let levels = TechLevel::new(3, 3, 3, 3, 3, 3);
        vec![
            ShipDesign::for_purpose(
                1,
                1,
                "Scout",
                names::SCOUT,
                ShipDesignPurpose::Scout,
                &race,
                &levels,
                &catalog,
            )
            .unwrap(),
            ShipDesign::for_purpose(
                2,
                1,
                "Colony",
                names::COLONY_SHIP,
                ShipDesignPurpose::Colonizer,
                &race,
                &levels,
                &catalog,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_spec_aggregates_tokens() {
        let designs = designs();
        let mut fleet = Fleet::new(
            1,
            1,
            "Mixed",
            Vec2Fixed::ZERO,
            vec![ShipToken::new(1, 2), ShipToken::new(2, 1)],
        );
        fleet.cargo = Cargo::with_colonists(10);
        fleet.compute_spec(&designs).unwrap();

        assert_eq!(
            fleet.spec.fuel_capacity,
            2 * designs[0].spec.fuel_capacity + designs[1].spec.fuel_capacity
        );
        assert_eq!(fleet.spec.mass, fleet.spec.base_mass + 10);
        assert!(fleet.spec.colonizer);
        assert!(fleet.spec.scanner);
        assert_eq!(fleet.spec.cargo_capacity, 25);
        assert_eq!(fleet.spec.ideal_speed, 6);
    }

    #[test]
    fn test_unknown_design_is_reported() {
        let mut fleet = Fleet::new(4, 2, "Ghost", Vec2Fixed::ZERO, vec![ShipToken::new(9, 1)]);
        let err = fleet.compute_spec(&designs()).unwrap_err();
        assert!(matches!(
            err,
            GameError::UnknownDesign {
                player: 2,
                design: 9
            }
        ));
    }

    #[test]
    fn test_send_to_planet_replaces_route() {
        let mut fleet = Fleet::new(1, 1, "Scout", Vec2Fixed::ZERO, vec![ShipToken::new(1, 1)]);
        fleet
            .waypoints
            .push(Waypoint::position(Vec2Fixed::from_ints(5, 5), 5));
        fleet.send_to_planet(3, Vec2Fixed::from_ints(40, 0), 6, WaypointTask::Colonize);
        assert_eq!(fleet.waypoints.len(), 2);
        assert_eq!(fleet.waypoints[1].target_planet(), Some(3));
        assert_eq!(fleet.waypoints[1].task, WaypointTask::Colonize);
    }
}
