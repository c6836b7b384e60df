//! Universe generation tests.
//!
//! Spacing and fairness properties of generated maps, checked over many
//! seeds.

use proptest::prelude::*;
use stellar_core::intel::REPORT_AGE_UNEXPLORED;
use stellar_core::prelude::*;
use stellar_test_utils::determinism::strategies::{arb_seed, arb_small_size};
use stellar_test_utils::fixtures::tiny_settings;
use stellar_test_utils::init_test_logging;

fn generate(settings: &GameSettings, seed: u64) -> Result<GeneratedUniverse> {
    let rules = Rules::with_seed(seed);
    let catalog = StandardCatalog::new();
    let players = settings
        .players
        .iter()
        .zip(1u32..)
        .map(|(seat, num)| Player::new(num, seat.name.clone(), seat.race.clone(), &rules))
        .collect();
    let mut rng = rules.new_rng();
    UniverseGenerator::new(settings, &rules, &catalog).generate(players, &mut rng)
}

// =============================================================================
// Fixed seeds
// =============================================================================

#[test]
fn test_same_seed_same_universe() {
    init_test_logging();
    let settings = tiny_settings(2);
    let first = generate(&settings, 1234).unwrap();
    let second = generate(&settings, 1234).unwrap();

    assert_eq!(first.universe.planets, second.universe.planets);
    assert_eq!(first.universe.fleets, second.universe.fleets);
    assert_eq!(first.players, second.players);
}

#[test]
fn test_too_many_players_for_the_map() {
    // a tiny sparse map has 24 planets
    let settings = tiny_settings(25);
    let err = generate(&settings, 1).unwrap_err();
    assert!(matches!(
        err,
        GameError::GenerationConstraint {
            constraint: "planet count",
            ..
        }
    ));
}

#[test]
fn test_players_start_with_intel_on_their_homeworld() {
    let generated = generate(&tiny_settings(2), 77).unwrap();
    for player in &generated.players {
        assert_eq!(player.planet_intels.len(), generated.universe.planets.len());
        let home = generated
            .universe
            .player_planets(player.num)
            .find(|p| p.homeworld)
            .unwrap();
        let intel = player.planet_intel(home.num).unwrap();
        assert_ne!(intel.report_age, REPORT_AGE_UNEXPLORED);
        assert_eq!(intel.player_num, Some(player.num));
    }
}

#[test]
fn test_starting_fleets_are_fueled_and_orbiting() {
    let generated = generate(&tiny_settings(2), 5).unwrap();
    let home_of = |num| {
        generated
            .universe
            .player_planets(num)
            .find(|p| p.homeworld)
            .unwrap()
            .num
    };
    for fleet in &generated.universe.fleets {
        assert_eq!(fleet.orbiting_planet_num, Some(home_of(fleet.player_num)));
        assert_eq!(fleet.fuel, fleet.spec.fuel_capacity);
    }
    for player in &generated.players {
        assert!(generated.universe.starbase(home_of(player.num)).is_some());
    }
}

#[test]
fn test_planet_count_matches_every_size_and_density() {
    for size in Size::ALL {
        for density in Density::ALL {
            let settings = GameSettings {
                size,
                density,
                ..tiny_settings(2)
            };
            let generated = generate(&settings, 3).unwrap();
            let planets = &generated.universe.planets;
            assert_eq!(
                planets.len(),
                size.num_planets(density),
                "{size:?} {density:?}"
            );
            assert!(planets.iter().zip(1u32..).all(|(p, num)| p.num == num));
        }
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// No two planets are ever closer than the minimum planet distance.
    #[test]
    fn prop_planets_respect_min_distance(seed in arb_seed(), size in arb_small_size()) {
        let settings = GameSettings {
            size,
            ..tiny_settings(2)
        };
        let generated = generate(&settings, seed).unwrap();
        let rules = Rules::default();
        let min = Fixed::from_num(rules.planet_min_distance);

        let planets = &generated.universe.planets;
        prop_assert_eq!(planets.len(), size.num_planets(Density::Sparse));
        for (i, a) in planets.iter().enumerate() {
            prop_assert_eq!(a.num as usize, i + 1);
            for b in &planets[i + 1..] {
                prop_assert!(a.position.distance_squared(b.position) > min * min);
            }
        }
    }

    /// Homeworlds are spread out and share the same minerals.
    #[test]
    fn prop_homeworlds_are_fair(seed in arb_seed()) {
        let settings = tiny_settings(2);
        let rules = Rules::with_seed(seed);
        let catalog = StandardCatalog::new();
        let min = UniverseGenerator::new(&settings, &rules, &catalog).min_player_distance(2);
        let generated = generate(&settings, seed).unwrap();

        let homes: Vec<&Planet> = generated
            .universe
            .planets
            .iter()
            .filter(|p| p.homeworld)
            .collect();
        prop_assert_eq!(homes.len(), 2);
        prop_assert_ne!(homes[0].player_num, homes[1].player_num);
        let min = Fixed::from_num(min);
        prop_assert!(homes[0].position.distance_squared(homes[1].position) >= min * min);
        prop_assert_eq!(homes[0].mineral_concentration, homes[1].mineral_concentration);
        prop_assert_eq!(homes[0].cargo.minerals(), homes[1].cargo.minerals());
        prop_assert_eq!(homes[0].population(), homes[1].population());
    }
}
