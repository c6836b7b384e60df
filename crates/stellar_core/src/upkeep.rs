//! Fleet aging, refuelling and repair.

use crate::error::{GameError, Result};
use crate::player::Player;
use crate::rules::Rules;
use crate::universe::Universe;

/// Every live fleet grows a year older.
pub fn age_fleets(universe: &mut Universe) {
    for fleet in universe.fleets.iter_mut().filter(|f| !f.deleted) {
        fleet.age += 1;
    }
}

/// Fleets orbiting a planet of their owner with a docked starbase refuel.
pub fn refuel_fleets(universe: &mut Universe) {
    let refuel: Vec<_> = universe
        .fleets
        .iter()
        .filter(|f| !f.deleted && !f.starbase)
        .filter(|f| {
            f.orbiting_planet_num.is_some_and(|num| {
                universe.planet(num).is_ok_and(|p| p.owned_by(f.player_num))
                    && universe
                        .starbase(num)
                        .is_some_and(|s| s.spec.space_dock != 0)
            })
        })
        .map(|f| f.key())
        .collect();

    for key in refuel {
        if let Some(fleet) = universe.fleet_mut(key) {
            fleet.fuel = fleet.fuel.max(fleet.spec.fuel_capacity);
        }
    }
}

/// Repair damaged ships: most at an own starbase, a little in orbit, least
/// in deep space.
pub fn repair_fleets(universe: &mut Universe, players: &[Player], rules: &Rules) -> Result<()> {
    let percents: Vec<i32> = universe
        .fleets
        .iter()
        .map(|f| {
            let Some(num) = f.orbiting_planet_num else {
                return rules.moving_repair_percent;
            };
            let own_starbase = universe.planet(num).is_ok_and(|p| p.owned_by(f.player_num))
                && universe.starbase(num).is_some();
            if own_starbase {
                rules.starbase_repair_percent
            } else {
                rules.orbiting_repair_percent
            }
        })
        .collect();

    for (fleet, percent) in universe.fleets.iter_mut().zip(percents) {
        if fleet.deleted {
            continue;
        }
        let owner = players
            .iter()
            .find(|p| p.num == fleet.player_num)
            .ok_or(GameError::UnknownPlayer(fleet.player_num))?;
        for token in fleet.tokens.iter_mut().filter(|t| t.quantity_damaged > 0) {
            let design = owner.require_design(token.design_num)?;
            let repaired = (design.spec.armor * percent / 100).max(1);
            token.damage -= repaired;
            if token.damage <= 0 {
                token.damage = 0;
                token.quantity_damaged = 0;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ShipDesign;
    use crate::fleet::{Fleet, ShipToken};
    use crate::math::Vec2Fixed;
    use crate::planet::Planet;
    use crate::race::{Race, ShipDesignPurpose};
    use crate::tech::{names, StandardCatalog};

    fn player() -> Player {
        let rules = Rules::default();
        let catalog = StandardCatalog::new();
        let mut player = Player::new(1, "Fixer", Race::default(), &rules);
        for (num, name, hull, purpose) in [
            (1, "Scout", names::SCOUT, ShipDesignPurpose::Scout),
            (2, "Starbase", names::SPACE_STATION, ShipDesignPurpose::Starbase),
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

    fn universe(player: &Player) -> (Universe, crate::fleet::FleetKey) {
        let mut home = Planet::new(1, "Home", Vec2Fixed::ZERO);
        home.player_num = Some(1);
        let mut universe = Universe::new(vec![home]);

        let mut starbase = Fleet::new(1, 1, "Starbase", Vec2Fixed::ZERO, vec![ShipToken::new(2, 1)]);
        starbase.starbase = true;
        starbase.orbiting_planet_num = Some(1);
        starbase.compute_spec(&player.designs).unwrap();
        universe.add_fleet(starbase);

        let mut scout = Fleet::new(2, 1, "Scout", Vec2Fixed::ZERO, vec![ShipToken::new(1, 1)]);
        scout.orbiting_planet_num = Some(1);
        scout.compute_spec(&player.designs).unwrap();
        let key = universe.add_fleet(scout);
        (universe, key)
    }

    #[test]
    fn test_refuel_at_own_starbase() {
        let player = player();
        let (mut universe, key) = universe(&player);
        refuel_fleets(&mut universe);
        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.fuel, fleet.spec.fuel_capacity);
    }

    #[test]
    fn test_no_refuel_in_deep_space() {
        let player = player();
        let (mut universe, key) = universe(&player);
        universe.fleet_mut(key).unwrap().orbiting_planet_num = None;
        refuel_fleets(&mut universe);
        assert_eq!(universe.fleet(key).unwrap().fuel, 0);
    }

    #[test]
    fn test_repair_and_age() {
        let player = player();
        let (mut universe, key) = universe(&player);
        {
            let token = &mut universe.fleet_mut(key).unwrap().tokens[0];
            token.damage = 1;
            token.quantity_damaged = 1;
        }
        repair_fleets(&mut universe, &[player], &Rules::default()).unwrap();
        age_fleets(&mut universe);

        let fleet = universe.fleet(key).unwrap();
        assert_eq!(fleet.tokens[0].damage, 0);
        assert_eq!(fleet.tokens[0].quantity_damaged, 0);
        assert_eq!(fleet.age, 1);
    }
}
