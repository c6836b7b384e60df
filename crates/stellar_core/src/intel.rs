//! A player's private, possibly stale knowledge of the universe.
//!
//! Planet intel is dense: one entry per planet, created at generation and
//! indexed by `planet.num - 1`. Fleet and design intel are sparse maps keyed
//! by the owner and number of the object, rebuilt or extended by discovery.

use serde::{Deserialize, Serialize};

use crate::cost::{Cargo, Mineral};
use crate::design::ShipDesignSlot;
use crate::fleet::{FleetKey, ShipToken};
use crate::math::Vec2Fixed;
use crate::planet::Planet;
use crate::player::PlayerNum;
use crate::race::Hab;

/// Report age of something never seen.
pub const REPORT_AGE_UNEXPLORED: i32 = -1;

/// Identifies a design across players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DesignKey {
    /// Owner.
    pub owner: PlayerNum,
    /// Design number within the owner's designs.
    pub num: u32,
}

impl DesignKey {
    /// Create a new key.
    #[must_use]
    pub const fn new(owner: PlayerNum, num: u32) -> Self {
        Self { owner, num }
    }
}

/// What a player knows about one planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetIntel {
    /// Planet number.
    pub num: u32,
    /// Planet name (always known).
    pub name: String,
    /// Planet position (always known).
    pub position: Vec2Fixed,
    /// Years since last scan; [`REPORT_AGE_UNEXPLORED`] if never.
    pub report_age: i32,
    /// Owner when last seen.
    pub player_num: Option<PlayerNum>,
    /// Environment when last seen.
    pub hab: Option<Hab>,
    /// Mineral concentration when last seen.
    pub mineral_concentration: Option<Mineral>,
    /// Population when last seen; exact only for the owner.
    pub population: Option<i32>,
    /// Surface minerals, only known to the owner or a cargo scanner.
    pub surface_minerals: Option<Mineral>,
    /// A starbase orbited the planet when last seen.
    pub has_starbase: bool,
    /// Defenses when last seen (owner only).
    pub defenses: Option<i32>,
}

impl PlanetIntel {
    /// Intel for a planet nobody has scanned yet: name and position only.
    #[must_use]
    pub fn unexplored(planet: &Planet) -> Self {
        Self {
            num: planet.num,
            name: planet.name.clone(),
            position: planet.position,
            report_age: REPORT_AGE_UNEXPLORED,
            player_num: None,
            hab: None,
            mineral_concentration: None,
            population: None,
            surface_minerals: None,
            has_starbase: false,
            defenses: None,
        }
    }

    /// Scanned at least once.
    #[must_use]
    pub const fn explored(&self) -> bool {
        self.report_age != REPORT_AGE_UNEXPLORED
    }
}

/// What a player knows about a fleet seen this year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetIntel {
    /// Owner and number.
    pub key: FleetKey,
    /// Fleet name.
    pub name: String,
    /// Position.
    pub position: Vec2Fixed,
    /// Always 0; fleet intel is rebuilt every year.
    pub report_age: i32,
    /// Planet it orbits.
    pub orbiting_planet_num: Option<u32>,
    /// Warp it is travelling at.
    pub warp_speed: i32,
    /// Next destination, if moving.
    pub destination: Option<Vec2Fixed>,
    /// Ships.
    pub tokens: Vec<ShipToken>,
    /// Total mass.
    pub mass: i32,
    /// Cargo, only known to a cargo scanner.
    pub cargo: Option<Cargo>,
    /// Starbase.
    pub starbase: bool,
}

/// What a player knows about another player's design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipDesignIntel {
    /// Owner and number.
    pub key: DesignKey,
    /// Design name.
    pub name: String,
    /// Hull name.
    pub hull: String,
    /// Slots, once discovered.
    pub slots: Vec<ShipDesignSlot>,
    /// Armor, once discovered.
    pub armor: Option<i32>,
    /// Shields, once discovered.
    pub shield: Option<i32>,
    /// Slots, armor and shields have been revealed.
    pub slots_discovered: bool,
}

/// What a player knows about another player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIntel {
    /// Player number.
    pub num: PlayerNum,
    /// Player name.
    pub name: String,
    /// Race name, once seen.
    pub race_name: Option<String>,
    /// Any planet or fleet of this player has been seen.
    pub seen: bool,
}
