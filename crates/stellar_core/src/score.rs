//! Yearly scores and victory conditions.

use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerMessage, PlayerMessageKind};
use crate::race::ShipDesignPurpose;
use crate::tech::TechField;
use crate::universe::Universe;

/// A way to win the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VictoryCondition {
    /// Own a share of all planets.
    OwnPlanets,
    /// Reach a tech level in several fields.
    AttainTechLevels,
    /// Reach a score.
    ExceedsScore,
    /// Lead second place by a margin.
    ExceedsSecondPlaceScore,
    /// Produce a number of resources per year.
    ProductionCapacity,
    /// Own a number of capital ships.
    OwnCapitalShips,
    /// Have the highest score after a number of years.
    HighestScoreAfterYears,
}

/// Victory settings of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VictoryConditions {
    /// Conditions that count towards victory.
    pub conditions: Vec<VictoryCondition>,
    /// How many enabled conditions a winner must meet.
    pub num_criteria_required: usize,
    /// Years that must pass before anyone can win.
    pub years_passed: i32,
    /// Percent of all planets to own.
    pub own_planets: i32,
    /// Tech level to reach ...
    pub attain_tech_level: i32,
    /// ... in this many fields.
    pub attain_tech_level_num_fields: usize,
    /// Score to reach.
    pub exceeds_score: i32,
    /// Percent lead over second place.
    pub exceeds_second_place_score: i32,
    /// Resources per year, in thousands.
    pub production_capacity: i32,
    /// Capital ships to own.
    pub owns_capital_ships: i32,
    /// Years after which the leader wins.
    pub highest_score_after_years: i32,
}

impl Default for VictoryConditions {
    fn default() -> Self {
        Self {
            conditions: vec![
                VictoryCondition::OwnPlanets,
                VictoryCondition::AttainTechLevels,
                VictoryCondition::ExceedsSecondPlaceScore,
            ],
            num_criteria_required: 1,
            years_passed: 50,
            own_planets: 60,
            attain_tech_level: 22,
            attain_tech_level_num_fields: 4,
            exceeds_score: 11_000,
            exceeds_second_place_score: 100,
            production_capacity: 100,
            owns_capital_ships: 100,
            highest_score_after_years: 100,
        }
    }
}

/// A player's score for one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    /// Year the score was taken.
    pub year: i32,
    /// Planets owned.
    pub planets: i32,
    /// Starbases owned.
    pub starbases: i32,
    /// Ships without weapons.
    pub unarmed_ships: i32,
    /// Small warships.
    pub escort_ships: i32,
    /// Large warships.
    pub capital_ships: i32,
    /// Sum of tech levels.
    pub tech_levels: i32,
    /// Resources per year across all planets.
    pub resources: i32,
    /// Total score.
    pub score: i32,
    /// Rank among all players, 1 is best.
    pub rank: usize,
}

/// Points for one field's tech level.
const fn tech_points(level: i32) -> i32 {
    match level {
        i32::MIN..=0 => 0,
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

/// Points for a planet's population, 1 to 6.
fn planet_points(population: i32) -> i32 {
    if population <= 0 {
        return 0;
    }
    (population / 100_000 + 1).min(6)
}

/// Score a player from the current state of the universe.
#[must_use]
pub fn compute_score(player: &Player, universe: &Universe, year: i32) -> PlayerScore {
    let mut score = PlayerScore {
        year,
        ..PlayerScore::default()
    };
    let mut planet_score = 0;

    for planet in universe.player_planets(player.num) {
        score.planets += 1;
        score.resources += planet.spec.resources_per_year;
        planet_score += planet_points(planet.population());
    }

    for fleet in universe.player_fleets(player.num) {
        if fleet.starbase {
            score.starbases += 1;
            continue;
        }
        for token in &fleet.tokens {
            let purpose = player.design(token.design_num).and_then(|d| d.purpose);
            match purpose {
                Some(ShipDesignPurpose::Fighter) => score.escort_ships += token.quantity,
                Some(ShipDesignPurpose::Fort | ShipDesignPurpose::Starbase) => {}
                _ => score.unarmed_ships += token.quantity,
            }
        }
    }

    score.tech_levels = player.tech_levels.sum();
    let tech_score: i32 = TechField::ALL
        .iter()
        .map(|&f| tech_points(player.tech_levels.get(f)))
        .sum();

    score.score = planet_score
        + score.starbases * 3
        + score.unarmed_ships / 2
        + score.escort_ships
        + score.capital_ships * 8
        + tech_score
        + score.resources / 30;
    score
}

/// Score every player and assign ranks (ties share the better rank).
pub fn update_scores(players: &mut [Player], universe: &Universe, year: i32) {
    for player in players.iter_mut() {
        let score = compute_score(player, universe, year);
        player.score = score;
    }
    let scores: Vec<i32> = players.iter().map(|p| p.score.score).collect();
    for player in players.iter_mut() {
        player.score.rank = 1 + scores.iter().filter(|&&s| s > player.score.score).count();
        player.score_history.push(player.score);
    }
}

/// Conditions a player currently meets.
#[must_use]
pub fn achieved_conditions(
    player: &Player,
    players: &[Player],
    total_planets: usize,
    years_elapsed: i32,
    victory: &VictoryConditions,
) -> Vec<VictoryCondition> {
    let score = &player.score;
    let second_best = players
        .iter()
        .filter(|p| p.num != player.num)
        .map(|p| p.score.score)
        .max();

    victory
        .conditions
        .iter()
        .copied()
        .filter(|condition| match condition {
            VictoryCondition::OwnPlanets => {
                total_planets > 0
                    && i64::from(score.planets) * 100
                        >= i64::from(victory.own_planets) * total_planets as i64
            }
            VictoryCondition::AttainTechLevels => {
                TechField::ALL
                    .iter()
                    .filter(|&&f| player.tech_levels.get(f) >= victory.attain_tech_level)
                    .count()
                    >= victory.attain_tech_level_num_fields
            }
            VictoryCondition::ExceedsScore => score.score >= victory.exceeds_score,
            VictoryCondition::ExceedsSecondPlaceScore => second_best.is_some_and(|second| {
                i64::from(score.score) * 100
                    > i64::from(second) * i64::from(100 + victory.exceeds_second_place_score)
            }),
            VictoryCondition::ProductionCapacity => {
                score.resources >= victory.production_capacity * 1000
            }
            VictoryCondition::OwnCapitalShips => score.capital_ships >= victory.owns_capital_ships,
            VictoryCondition::HighestScoreAfterYears => {
                years_elapsed >= victory.highest_score_after_years && score.rank == 1
            }
        })
        .collect()
}

/// Record achieved conditions and declare winners.
///
/// Returns the numbers of players newly declared victors.
pub fn check_victory(
    players: &mut [Player],
    total_planets: usize,
    years_elapsed: i32,
    victory: &VictoryConditions,
) -> Vec<u32> {
    let achieved: Vec<Vec<VictoryCondition>> = players
        .iter()
        .map(|p| achieved_conditions(p, players, total_planets, years_elapsed, victory))
        .collect();

    let mut winners = Vec::new();
    for (player, conditions) in players.iter_mut().zip(achieved) {
        player.achieved_victory_conditions = conditions;
        if player.victor
            || years_elapsed < victory.years_passed
            || player.achieved_victory_conditions.len() < victory.num_criteria_required.max(1)
        {
            continue;
        }
        player.victor = true;
        tracing::info!(player = player.num, "victory");
        player.message(PlayerMessage::general(
            PlayerMessageKind::Victory,
            format!("{} has won the game", player.name),
        ));
        winners.push(player.num);
    }
    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Fixed;
    use crate::planet::Planet;
    use crate::race::Race;
    use crate::rules::Rules;

    fn universe_with(owned: &[(u32, i32)], total: u32) -> Universe {
        let planets = (1..=total)
            .map(|num| {
                let mut planet = Planet::new(num, format!("P{num}"), Vec2Fixed::from_ints(num as i32 * 20, 0));
                if let Some(&(owner, pop)) = owned.get((num - 1) as usize) {
                    planet.player_num = Some(owner);
                    planet.set_population(pop);
                    planet.spec.resources_per_year = pop / 1000;
                }
                planet
            })
            .collect();
        Universe::new(planets)
    }

    #[test]
    fn test_planet_points() {
        assert_eq!(planet_points(0), 0);
        assert_eq!(planet_points(25_000), 1);
        assert_eq!(planet_points(250_000), 3);
        assert_eq!(planet_points(2_000_000), 6);
    }

    #[test]
    fn test_scores_and_ranks() {
        let rules = Rules::default();
        let mut players = vec![
            Player::new(1, "One", Race::default(), &rules),
            Player::new(2, "Two", Race::default(), &rules),
        ];
        let universe = universe_with(&[(1, 250_000), (1, 30_000), (2, 30_000)], 5);

        update_scores(&mut players, &universe, 2401);

        assert_eq!(players[0].score.planets, 2);
        assert_eq!(players[1].score.planets, 1);
        assert!(players[0].score.score > players[1].score.score);
        assert_eq!(players[0].score.rank, 1);
        assert_eq!(players[1].score.rank, 2);
        assert_eq!(players[0].score_history.len(), 1);
    }

    #[test]
    fn test_own_planets_victory_waits_for_years() {
        let rules = Rules::default();
        let mut players = vec![Player::new(1, "Solo", Race::default(), &rules)];
        let universe = universe_with(&[(1, 25_000), (1, 25_000)], 3);
        update_scores(&mut players, &universe, 2410);
        let victory = VictoryConditions {
            years_passed: 20,
            ..VictoryConditions::default()
        };

        assert!(check_victory(&mut players, 3, 10, &victory).is_empty());
        assert_eq!(
            players[0].achieved_victory_conditions,
            vec![VictoryCondition::OwnPlanets]
        );

        assert_eq!(check_victory(&mut players, 3, 20, &victory), vec![1]);
        assert!(players[0].victor);
        // already a victor, not declared twice
        assert!(check_victory(&mut players, 3, 21, &victory).is_empty());
    }

    #[test]
    fn test_second_place_needs_an_opponent() {
        let rules = Rules::default();
        let player = Player::new(1, "Solo", Race::default(), &rules);
        let victory = VictoryConditions {
            conditions: vec![VictoryCondition::ExceedsSecondPlaceScore],
            ..VictoryConditions::default()
        };
        let players = vec![player.clone()];
        assert!(achieved_conditions(&player, &players, 10, 100, &victory).is_empty());
    }
}
