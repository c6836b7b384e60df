//! Turn generation tests.
//!
//! Whole games driven through several years with AI players.

use stellar_core::prelude::*;
use stellar_core::score::VictoryConditions;
use stellar_test_utils::determinism::{step_turn, verify_game_determinism};
use stellar_test_utils::fixtures::{tiny_game, tiny_settings};
use stellar_test_utils::init_test_logging;

#[test]
fn test_years_advance_and_scores_accumulate() {
    init_test_logging();
    let mut game = tiny_game(21, 2);
    for _ in 0..5 {
        step_turn(&mut game);
    }

    assert_eq!(game.game.year, 2405);
    assert_eq!(game.game.years_elapsed(), 5);
    for player in &game.players {
        assert_eq!(player.score_history.len(), 5);
        assert!(player.score.planets >= 1);
        assert!(!player.submitted_turn);
    }
}

#[test]
fn test_starbases_age_every_year() {
    let mut game = tiny_game(8, 1);
    let starbases: Vec<FleetKey> = game
        .universe
        .fleets
        .iter()
        .filter(|f| f.starbase)
        .map(|f| f.key())
        .collect();
    assert!(!starbases.is_empty());
    for _ in 0..3 {
        step_turn(&mut game);
    }
    for key in starbases {
        assert_eq!(game.universe.fleet(key).unwrap().age, 3);
    }
}

#[test]
fn test_research_gains_levels_over_time() {
    let mut game = tiny_game(13, 1);
    // a 35 resource homeworld reaches the first 390 point level in 12 years
    game.players[0].research_amount = 100;
    let before = game.players[0].tech_levels.sum();
    let catalog = StandardCatalog::new();
    let mut gained = 0;
    for _ in 0..15 {
        gained += TurnGenerator::new(&mut game, &catalog)
            .generate_turn()
            .unwrap()
            .tech_levels_gained;
    }
    assert!(gained > 0);
    assert_eq!(game.players[0].tech_levels.sum(), before + gained);
}

#[test]
fn test_victory_ends_the_game() {
    let settings = GameSettings {
        victory_conditions: VictoryConditions {
            conditions: vec![VictoryCondition::OwnPlanets],
            num_criteria_required: 1,
            years_passed: 1,
            own_planets: 1,
            ..VictoryConditions::default()
        },
        ..tiny_settings(1)
    };
    let catalog = StandardCatalog::new();
    let mut game = FullGame::create(5, &settings, Rules::with_seed(5), &catalog).unwrap();

    let summary = TurnGenerator::new(&mut game, &catalog).generate_turn().unwrap();

    assert_eq!(summary.victors, vec![1]);
    assert!(game.game.victor_declared);
    assert_eq!(game.game.state, GameState::GameOver);
    assert!(game.players[0].victor);
    assert!(game.players[0]
        .messages
        .iter()
        .any(|m| m.kind == PlayerMessageKind::Victory));

    let err = TurnGenerator::new(&mut game, &catalog).generate_turn();
    assert!(matches!(err, Err(GameError::InvalidState(_))));
}

#[test]
fn test_two_player_game_is_deterministic() {
    verify_game_determinism(|| tiny_game(2024, 2), 8).assert_deterministic();
}
