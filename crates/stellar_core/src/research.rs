//! Spending research resources on tech levels.
//!
//! Resources accumulate in the field being researched. When a level is
//! reached the overflow carries into the next field chosen by the player's
//! [`NextResearchField`] policy, so one large year can gain several levels.

use crate::player::{NextResearchField, Player, PlayerMessage, PlayerMessageKind};
use crate::rules::Rules;
use crate::tech::TechField;

/// Resources needed to raise `field` by one level, or `None` at the cap.
///
/// The base cost of the next level is scaled by the race's cost class for
/// the field, plus 10 per level already known in any field.
#[must_use]
pub fn research_cost(player: &Player, rules: &Rules, field: TechField) -> Option<i32> {
    let level = player.tech_levels.get(field);
    if level >= rules.max_tech_level {
        return None;
    }
    let base = rules.base_research_cost(level + 1);
    let scaled = i64::from(base) * i64::from(player.research_cost_percent(field)) / 100;
    let cost = scaled + 10 * i64::from(player.tech_levels.sum());
    i32::try_from(cost).ok()
}

/// Field to research after `current`, or `None` once every field is capped.
#[must_use]
pub fn next_field(player: &Player, rules: &Rules, current: TechField) -> Option<TechField> {
    let open = |field: TechField| player.tech_levels.get(field) < rules.max_tech_level;
    let lowest = || {
        TechField::ALL
            .into_iter()
            .filter(|&f| open(f))
            .min_by_key(|&f| player.tech_levels.get(f))
    };
    match player.next_research_field {
        NextResearchField::SameField if open(current) => Some(current),
        NextResearchField::Field(field) if open(field) => Some(field),
        _ => lowest(),
    }
}

/// Spend `resources` on research and return the fields that gained a level,
/// in order. Resources left once every field is capped are lost.
pub fn research(player: &mut Player, rules: &Rules, resources: i32) -> Vec<TechField> {
    let mut gained = Vec::new();
    let mut remaining = resources.max(0);

    while remaining > 0 {
        let field = player.researching;
        let Some(cost) = research_cost(player, rules, field) else {
            match next_field(player, rules, field) {
                Some(next) if next != field => {
                    player.researching = next;
                    continue;
                }
                _ => break,
            }
        };

        let spent = player.tech_levels_spent.get_mut(field);
        let needed = (cost - *spent).max(0);
        if remaining < needed {
            *spent += remaining;
            break;
        }
        remaining -= needed;
        *spent = 0;
        *player.tech_levels.get_mut(field) += 1;
        let level = player.tech_levels.get(field);
        gained.push(field);

        tracing::debug!(player = player.num, ?field, level, "tech level gained");
        player.message(PlayerMessage::general(
            PlayerMessageKind::TechLevelGained,
            format!("Your scientists have reached {field:?} level {level}"),
        ));

        match next_field(player, rules, field) {
            Some(next) => player.researching = next,
            None => break,
        }
    }
    gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::{Race, ResearchCostLevel};
    use crate::tech::TechLevel;

    fn player() -> Player {
        Player::new(1, "Sage", Race::default(), &Rules::default())
    }

    #[test]
    fn test_cost_includes_total_levels() {
        let player = player();
        // base 210 for level 3 -> 4, plus 10 * 18 known levels
        assert_eq!(
            research_cost(&player, &Rules::default(), TechField::Energy),
            Some(390)
        );
    }

    #[test]
    fn test_cost_scales_with_race() {
        let mut race = Race::default();
        race.research_cost.energy = ResearchCostLevel::Extra;
        let player = Player::new(1, "Slow", race, &Rules::default());
        assert_eq!(
            research_cost(&player, &Rules::default(), TechField::Energy),
            Some(210 * 175 / 100 + 180)
        );
    }

    #[test]
    fn test_partial_research_accumulates() {
        let rules = Rules::default();
        let mut player = player();
        assert!(research(&mut player, &rules, 100).is_empty());
        assert!(research(&mut player, &rules, 100).is_empty());
        assert_eq!(player.tech_levels_spent.energy, 200);
    }

    #[test]
    fn test_overflow_carries_into_next_field() {
        let rules = Rules::default();
        let mut player = player();
        player.next_research_field = NextResearchField::SameField;
        // energy 3 -> 4 costs 390, then 4 -> 5 costs 340 + 190
        let gained = research(&mut player, &rules, 390 + 530 + 7);
        assert_eq!(gained, vec![TechField::Energy, TechField::Energy]);
        assert_eq!(player.tech_levels.energy, 5);
        assert_eq!(player.tech_levels_spent.energy, 7);
        assert_eq!(
            player
                .messages
                .iter()
                .filter(|m| m.kind == PlayerMessageKind::TechLevelGained)
                .count(),
            2
        );
    }

    #[test]
    fn test_lowest_field_policy() {
        let rules = Rules::default();
        let mut player = player();
        player.tech_levels = TechLevel::new(3, 5, 5, 5, 2, 5);
        player.researching = TechField::Weapons;
        assert_eq!(
            next_field(&player, &rules, TechField::Weapons),
            Some(TechField::Electronics)
        );
    }

    #[test]
    fn test_capped_fields_are_skipped() {
        let rules = Rules {
            max_tech_level: 3,
            ..Rules::default()
        };
        let mut player = player();
        player.next_research_field = NextResearchField::SameField;
        let gained = research(&mut player, &rules, 10_000);
        assert!(gained.is_empty());
        assert_eq!(next_field(&player, &rules, TechField::Energy), None);
    }
}
