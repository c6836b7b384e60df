//! The universe: every planet, fleet and map object of a game.
//!
//! The universe owns all objects. Cross references (a planet's starbase, a
//! waypoint's target fleet) are numbers resolved through the lookup indices
//! here. Indices are not persisted; call [`Universe::build_maps`] after
//! loading or after adding or removing fleets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cost::Cargo;
use crate::error::{GameError, Result};
use crate::fleet::{Fleet, FleetKey};
use crate::math::Vec2Fixed;
use crate::planet::Planet;
use crate::player::{Player, PlayerNum};
use crate::rules::Rules;
use crate::tech::TechCatalog;

/// A wormhole end point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wormhole {
    /// Number.
    pub num: u32,
    /// Position.
    pub position: Vec2Fixed,
    /// Number of the wormhole at the other end.
    pub destination_num: u32,
    /// Years since the last jiggle.
    pub years_at_position: i32,
}

/// Debris left behind by scrapped or destroyed ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salvage {
    /// Number.
    pub num: u32,
    /// Player whose ships left it.
    pub player_num: PlayerNum,
    /// Position.
    pub position: Vec2Fixed,
    /// Minerals.
    pub cargo: Cargo,
}

/// A mineral packet flung from a mass driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineralPacket {
    /// Number.
    pub num: u32,
    /// Owner.
    pub player_num: PlayerNum,
    /// Position.
    pub position: Vec2Fixed,
    /// Destination planet.
    pub target_planet_num: u32,
    /// Warp speed.
    pub warp_speed: i32,
    /// Minerals.
    pub cargo: Cargo,
}

/// Every map object of a game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Universe {
    /// Planets, in number order (`planets[i].num == i + 1`).
    pub planets: Vec<Planet>,
    /// Fleets and starbases of every player.
    pub fleets: Vec<Fleet>,
    /// Wormholes.
    pub wormholes: Vec<Wormhole>,
    /// Salvage.
    pub salvages: Vec<Salvage>,
    /// Mineral packets.
    pub mineral_packets: Vec<MineralPacket>,

    #[serde(skip)]
    fleet_index: HashMap<FleetKey, usize>,
    #[serde(skip)]
    fleets_by_position: HashMap<Vec2Fixed, Vec<usize>>,
    #[serde(skip)]
    planet_by_position: HashMap<Vec2Fixed, usize>,
    #[serde(skip)]
    starbase_by_planet: HashMap<u32, usize>,
}

impl Universe {
    /// A universe from generated planets, with indices built.
    #[must_use]
    pub fn new(planets: Vec<Planet>) -> Self {
        let mut universe = Self {
            planets,
            ..Self::default()
        };
        universe.build_maps();
        universe
    }

    /// Rebuild every lookup index.
    pub fn build_maps(&mut self) {
        self.fleet_index.clear();
        self.fleets_by_position.clear();
        self.planet_by_position.clear();
        self.starbase_by_planet.clear();

        for (i, planet) in self.planets.iter().enumerate() {
            self.planet_by_position.insert(planet.position, i);
        }
        for (i, fleet) in self.fleets.iter().enumerate() {
            if fleet.deleted {
                continue;
            }
            self.fleet_index.insert(fleet.key(), i);
            self.fleets_by_position
                .entry(fleet.position)
                .or_default()
                .push(i);
            if fleet.starbase {
                if let Some(planet_num) = fleet.orbiting_planet_num {
                    self.starbase_by_planet.insert(planet_num, i);
                }
            }
        }
    }

    /// Planet by number.
    pub fn planet(&self, num: u32) -> Result<&Planet> {
        num.checked_sub(1)
            .and_then(|i| self.planets.get(i as usize))
            .filter(|p| p.num == num)
            .ok_or(GameError::UnknownPlanet(num))
    }

    /// Mutable planet by number.
    pub fn planet_mut(&mut self, num: u32) -> Result<&mut Planet> {
        num.checked_sub(1)
            .and_then(|i| self.planets.get_mut(i as usize))
            .filter(|p| p.num == num)
            .ok_or(GameError::UnknownPlanet(num))
    }

    /// Planet at an exact position.
    #[must_use]
    pub fn planet_at(&self, position: Vec2Fixed) -> Option<&Planet> {
        self.planet_by_position
            .get(&position)
            .and_then(|&i| self.planets.get(i))
    }

    /// Fleet by key, ignoring deleted fleets.
    #[must_use]
    pub fn fleet(&self, key: FleetKey) -> Option<&Fleet> {
        self.fleet_index
            .get(&key)
            .and_then(|&i| self.fleets.get(i))
            .filter(|f| !f.deleted)
    }

    /// Mutable fleet by key, ignoring deleted fleets.
    pub fn fleet_mut(&mut self, key: FleetKey) -> Option<&mut Fleet> {
        let index = *self.fleet_index.get(&key)?;
        self.fleets.get_mut(index).filter(|f| !f.deleted)
    }

    /// Fleet by key, or an error.
    pub fn require_fleet(&self, key: FleetKey) -> Result<&Fleet> {
        self.fleet(key).ok_or(GameError::UnknownFleet {
            player: key.owner,
            num: key.num,
        })
    }

    /// Starbase orbiting a planet.
    #[must_use]
    pub fn starbase(&self, planet_num: u32) -> Option<&Fleet> {
        self.starbase_by_planet
            .get(&planet_num)
            .and_then(|&i| self.fleets.get(i))
            .filter(|f| !f.deleted)
    }

    /// Live fleets at an exact position.
    pub fn fleets_at(&self, position: Vec2Fixed) -> impl Iterator<Item = &Fleet> {
        self.fleets_by_position
            .get(&position)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.fleets.get(i))
            .filter(|f| !f.deleted)
    }

    /// Keys of every live fleet, in storage order.
    #[must_use]
    pub fn fleet_keys(&self) -> Vec<FleetKey> {
        self.fleets
            .iter()
            .filter(|f| !f.deleted)
            .map(Fleet::key)
            .collect()
    }

    /// Live fleets of one player.
    pub fn player_fleets(&self, player: PlayerNum) -> impl Iterator<Item = &Fleet> {
        self.fleets
            .iter()
            .filter(move |f| f.player_num == player && !f.deleted)
    }

    /// Planets owned by one player.
    pub fn player_planets(&self, player: PlayerNum) -> impl Iterator<Item = &Planet> {
        self.planets.iter().filter(move |p| p.owned_by(player))
    }

    /// Next free fleet number for a player. Numbers are never reused within a year.
    #[must_use]
    pub fn next_fleet_num(&self, player: PlayerNum) -> u32 {
        self.fleets
            .iter()
            .filter(|f| f.player_num == player)
            .map(|f| f.num)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Add a fleet and index it.
    pub fn add_fleet(&mut self, fleet: Fleet) -> FleetKey {
        let key = fleet.key();
        let index = self.fleets.len();
        self.fleet_index.insert(key, index);
        self.fleets_by_position
            .entry(fleet.position)
            .or_default()
            .push(index);
        if fleet.starbase {
            if let Some(planet_num) = fleet.orbiting_planet_num {
                self.starbase_by_planet.insert(planet_num, index);
            }
        }
        self.fleets.push(fleet);
        key
    }

    /// Mark a fleet for removal; it disappears from lookups immediately.
    pub fn mark_fleet_deleted(&mut self, key: FleetKey) {
        if let Some(fleet) = self.fleet_mut(key) {
            fleet.deleted = true;
        }
    }

    /// Drop deleted fleets and rebuild indices.
    pub fn purge_deleted_fleets(&mut self) {
        let before = self.fleets.len();
        self.fleets.retain(|f| !f.deleted);
        if self.fleets.len() != before {
            tracing::trace!(removed = before - self.fleets.len(), "purged fleets");
        }
        self.build_maps();
    }

    /// Recompute every planet's spec.
    pub fn compute_planet_specs(
        &mut self,
        players: &[Player],
        rules: &Rules,
        catalog: &dyn TechCatalog,
    ) {
        let Self {
            planets,
            fleets,
            starbase_by_planet,
            ..
        } = self;
        for planet in planets.iter_mut() {
            let player = planet
                .player_num
                .and_then(|num| players.iter().find(|p| p.num == num));
            let starbase = starbase_by_planet
                .get(&planet.num)
                .and_then(|&i| fleets.get(i))
                .filter(|f| !f.deleted);
            planet.compute_spec(player, starbase, rules, catalog);
        }
    }

    /// Recompute one planet's spec.
    pub fn compute_planet_spec(
        &mut self,
        num: u32,
        players: &[Player],
        rules: &Rules,
        catalog: &dyn TechCatalog,
    ) -> Result<()> {
        let starbase = self.starbase(num).cloned();
        let planet = self.planet_mut(num)?;
        let player = planet
            .player_num
            .and_then(|owner| players.iter().find(|p| p.num == owner));
        planet.compute_spec(player, starbase.as_ref(), rules, catalog);
        Ok(())
    }

    /// Recompute every live fleet's spec from its owner's designs.
    pub fn compute_fleet_specs(&mut self, players: &[Player]) -> Result<()> {
        for fleet in self.fleets.iter_mut().filter(|f| !f.deleted) {
            let owner = players
                .iter()
                .find(|p| p.num == fleet.player_num)
                .ok_or(GameError::UnknownPlayer(fleet.player_num))?;
            fleet.compute_spec(&owner.designs)?;
        }
        Ok(())
    }

    /// Move a fleet and keep the position index in step.
    pub fn move_fleet(&mut self, key: FleetKey, position: Vec2Fixed) {
        let Some(&index) = self.fleet_index.get(&key) else {
            return;
        };
        let Some(fleet) = self.fleets.get_mut(index) else {
            return;
        };
        let old = fleet.position;
        fleet.position = position;
        if let Some(list) = self.fleets_by_position.get_mut(&old) {
            list.retain(|&i| i != index);
        }
        self.fleets_by_position
            .entry(position)
            .or_default()
            .push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::ShipToken;

    fn universe() -> Universe {
        Universe::new(vec![
            Planet::new(1, "One", Vec2Fixed::from_ints(0, 0)),
            Planet::new(2, "Two", Vec2Fixed::from_ints(50, 0)),
        ])
    }

    #[test]
    fn test_planet_lookup() {
        let u = universe();
        assert_eq!(u.planet(2).unwrap().name, "Two");
        assert!(matches!(u.planet(3), Err(GameError::UnknownPlanet(3))));
        assert!(u.planet(0).is_err());
        assert_eq!(u.planet_at(Vec2Fixed::from_ints(50, 0)).unwrap().num, 2);
    }

    #[test]
    fn test_fleet_index_follows_add_move_delete() {
        let mut u = universe();
        let key = u.add_fleet(Fleet::new(
            1,
            1,
            "Scout",
            Vec2Fixed::ZERO,
            vec![ShipToken::new(1, 1)],
        ));
        assert_eq!(u.fleets_at(Vec2Fixed::ZERO).count(), 1);
        assert_eq!(u.next_fleet_num(1), 2);
        assert_eq!(u.next_fleet_num(2), 1);

        u.move_fleet(key, Vec2Fixed::from_ints(10, 0));
        assert_eq!(u.fleets_at(Vec2Fixed::ZERO).count(), 0);
        assert_eq!(u.fleets_at(Vec2Fixed::from_ints(10, 0)).count(), 1);

        u.mark_fleet_deleted(key);
        assert!(u.fleet(key).is_none());
        u.purge_deleted_fleets();
        assert!(u.fleets.is_empty());
    }

    #[test]
    fn test_starbase_lookup() {
        let mut u = universe();
        let mut starbase = Fleet::new(1, 1, "Starbase", Vec2Fixed::ZERO, vec![ShipToken::new(3, 1)]);
        starbase.starbase = true;
        starbase.orbiting_planet_num = Some(1);
        u.add_fleet(starbase);
        assert!(u.starbase(1).is_some());
        assert!(u.starbase(2).is_none());
    }

    #[test]
    fn test_indices_rebuilt_after_deserialize() {
        let mut u = universe();
        u.add_fleet(Fleet::new(1, 1, "Scout", Vec2Fixed::ZERO, vec![]));
        let bytes = bincode::serialize(&u).unwrap();
        let mut loaded: Universe = bincode::deserialize(&bytes).unwrap();
        assert!(loaded.fleet(FleetKey::new(1, 1)).is_none());
        loaded.build_maps();
        assert!(loaded.fleet(FleetKey::new(1, 1)).is_some());
    }
}
