//! Turn generation.
//!
//! One call to [`TurnGenerator::generate_turn`] advances a game by a year.
//! The year is a single forward pass over named phases in a fixed order;
//! later phases read what earlier ones wrote, so the order is part of the
//! game rules. Phases without game logic yet are kept as named steps so
//! that new logic lands in the right place.
//!
//! # Phase Order
//!
//! 1. Reset per-turn player state, recompute specs, age fleets
//! 2. Waypoint-0 tasks (scrap, unload, colonize, load, merge, route)
//! 3. Fleet movement, mining, production, research, population growth
//! 4. Refuel, waypoint-1 tasks, repair
//! 5. Per player: specs, discovery, scores, victory, AI orders
//!
//! A failing phase aborts the turn with [`GameError::TurnPhase`] naming the
//! game, the year and the phase. The game must then be reloaded from its
//! last saved state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ai;
use crate::discovery::discover;
use crate::error::{GameError, Result};
use crate::fleet::{Fleet, ShipToken};
use crate::game::{FullGame, GameState};
use crate::movement::move_fleets;
use crate::player::{player_mut, PlayerMessage, PlayerMessageKind, PlayerNum};
use crate::production::{ProductionQueueEngine, ProductionResult};
use crate::research::research;
use crate::score::{check_victory, update_scores};
use crate::tech::TechCatalog;
use crate::upkeep::{age_fleets, refuel_fleets, repair_fleets};
use crate::waypoint_tasks::process_waypoint_tasks;

/// What happened during a generated year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    /// The year that was generated.
    pub year: i32,
    /// Ships launched from planet docks.
    pub ships_built: i32,
    /// Starbases built or upgraded.
    pub starbases_built: i32,
    /// Colonies founded.
    pub planets_colonized: i32,
    /// Tech levels gained across all players.
    pub tech_levels_gained: i32,
    /// Players declared victors this year.
    pub victors: Vec<PlayerNum>,
}

/// Generates the next year of one game.
///
/// Holds the game exclusively for the duration of the turn.
pub struct TurnGenerator<'a> {
    game: &'a mut FullGame,
    catalog: &'a dyn TechCatalog,
    leftover_resources: BTreeMap<PlayerNum, i32>,
    summary: TurnSummary,
}

impl<'a> TurnGenerator<'a> {
    /// Prepare to generate the next year of `game`.
    pub fn new(game: &'a mut FullGame, catalog: &'a dyn TechCatalog) -> Self {
        Self {
            game,
            catalog,
            leftover_resources: BTreeMap::new(),
            summary: TurnSummary::default(),
        }
    }

    /// Run every phase once, in order.
    pub fn generate_turn(mut self) -> Result<TurnSummary> {
        if self.game.game.state == GameState::GameOver {
            return Err(GameError::InvalidState(format!(
                "game {} is over",
                self.game.game.id
            )));
        }

        self.game.game.year += 1;
        self.game.game.state = GameState::GeneratingTurn;
        self.summary.year = self.game.game.year;

        let span = tracing::info_span!(
            "generate_turn",
            game_id = self.game.game.id,
            year = self.game.game.year
        );
        let _guard = span.enter();

        self.phase("reset_players", Self::reset_players)?;
        self.phase("compute_specs", Self::compute_specs)?;
        self.phase("age_fleets", Self::age_fleets)?;
        self.phase("waypoint0_tasks", Self::waypoint_tasks)?;
        self.phase("move_packets", Self::move_packets)?;
        self.phase("move_mystery_trader", Self::move_mystery_trader)?;
        self.phase("move_fleets", Self::move_fleets)?;
        self.phase("reproduce_fleets", Self::reproduce_fleets)?;
        self.phase("decay_salvage", Self::decay_salvage)?;
        self.phase("jiggle_wormholes", Self::jiggle_wormholes)?;
        self.phase("detonate_mines", Self::detonate_mines)?;
        self.phase("mine_planets", Self::mine_planets)?;
        self.phase("remote_mining", Self::remote_mining)?;
        self.phase("produce", Self::produce)?;
        self.phase("research", Self::research)?;
        self.phase("steal_research", Self::steal_research)?;
        self.phase("permaform", Self::permaform)?;
        self.phase("grow_population", Self::grow_population)?;
        self.phase("move_packets_again", Self::move_packets)?;
        self.phase("refuel_fleets", Self::refuel_fleets)?;
        self.phase("random_events", Self::random_events)?;
        self.phase("fleet_battle", Self::fleet_battle)?;
        self.phase("fleet_bombing", Self::fleet_bombing)?;
        self.phase("meet_mystery_trader", Self::meet_mystery_trader)?;
        self.phase("remote_mining_again", Self::remote_mining)?;
        self.phase("waypoint1_tasks", Self::waypoint_tasks)?;
        self.phase("decay_mines", Self::decay_mines)?;
        self.phase("lay_mines", Self::lay_mines)?;
        self.phase("transfer_cargo", Self::transfer_cargo)?;
        self.phase("instaform", Self::instaform)?;
        self.phase("sweep_mines", Self::sweep_mines)?;
        self.phase("repair_fleets", Self::repair_fleets)?;
        self.phase("remote_terraform", Self::remote_terraform)?;
        self.phase("player_specs", Self::compute_specs)?;
        self.phase("discovery", Self::discovery)?;
        self.phase("patrol", Self::patrol)?;
        self.phase("scores", Self::scores)?;
        self.phase("victory", Self::victory)?;
        self.phase("clear_submitted", Self::clear_submitted)?;
        self.phase("ai", Self::ai)?;

        if self.game.game.state != GameState::GameOver {
            self.game.game.state = GameState::WaitingForPlayers;
        }
        self.summary.planets_colonized = self.count_messages(PlayerMessageKind::PlanetColonized);

        tracing::info!(
            ships = self.summary.ships_built,
            colonized = self.summary.planets_colonized,
            tech = self.summary.tech_levels_gained,
            "turn generated"
        );
        Ok(self.summary)
    }

    fn phase(&mut self, name: &'static str, run: fn(&mut Self) -> Result<()>) -> Result<()> {
        tracing::trace!(phase = name, "phase");
        let (id, year) = (self.game.game.id, self.game.game.year);
        run(self).map_err(|e| e.in_phase(id, year, name))
    }

    fn count_messages(&self, kind: PlayerMessageKind) -> i32 {
        let count = self
            .game
            .players
            .iter()
            .flat_map(|p| &p.messages)
            .filter(|m| m.kind == kind)
            .count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }

    fn reset_players(&mut self) -> Result<()> {
        for player in &mut self.game.players {
            player.messages.clear();
        }
        self.leftover_resources.clear();
        Ok(())
    }

    fn compute_specs(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        universe.compute_fleet_specs(players)?;
        universe.compute_planet_specs(players, &game.rules, self.catalog);
        Ok(())
    }

    fn age_fleets(&mut self) -> Result<()> {
        age_fleets(&mut self.game.universe);
        Ok(())
    }

    fn waypoint_tasks(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        process_waypoint_tasks(universe, players, &game.rules)
    }

    fn move_packets(&mut self) -> Result<()> {
        tracing::trace!(packets = self.game.universe.mineral_packets.len(), "packets hold position");
        Ok(())
    }

    fn move_mystery_trader(&mut self) -> Result<()> {
        Ok(())
    }

    fn move_fleets(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        move_fleets(universe, players, &game.rules)
    }

    fn reproduce_fleets(&mut self) -> Result<()> {
        Ok(())
    }

    fn decay_salvage(&mut self) -> Result<()> {
        tracing::trace!(salvage = self.game.universe.salvages.len(), "salvage does not decay");
        Ok(())
    }

    fn jiggle_wormholes(&mut self) -> Result<()> {
        Ok(())
    }

    fn detonate_mines(&mut self) -> Result<()> {
        Ok(())
    }

    fn mine_planets(&mut self) -> Result<()> {
        let rules = &self.game.game.rules;
        for planet in self.game.universe.planets.iter_mut().filter(|p| p.owned()) {
            planet.mine(rules);
        }
        Ok(())
    }

    fn remote_mining(&mut self) -> Result<()> {
        Ok(())
    }

    fn produce(&mut self) -> Result<()> {
        self.compute_specs()?;

        let mut results: Vec<(PlayerNum, ProductionResult)> = Vec::new();
        {
            let FullGame {
                players, universe, ..
            } = &mut *self.game;
            for planet in universe.planets.iter_mut() {
                let Some(owner) = planet.player_num else {
                    continue;
                };
                let player = players
                    .iter()
                    .find(|p| p.num == owner)
                    .ok_or(GameError::UnknownPlayer(owner))?;
                let result = ProductionQueueEngine::new(player).produce(planet)?;
                results.push((owner, result));
            }
        }

        for (owner, result) in results {
            self.launch_ships(owner, &result)?;
            *self.leftover_resources.entry(owner).or_default() += result.leftover_resources;
            let player = player_mut(&mut self.game.players, owner)?;
            player.messages.extend(result.messages);
        }
        Ok(())
    }

    /// Turn built ships and starbases into fleets at their planet.
    fn launch_ships(&mut self, owner: PlayerNum, result: &ProductionResult) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        let player = players
            .iter()
            .find(|p| p.num == owner)
            .ok_or(GameError::UnknownPlayer(owner))?;
        let planet = universe.planet(result.planet_num)?;
        let position = planet.position;

        for built in &result.ships {
            let design = player.require_design(built.design_num)?;
            let num = universe.next_fleet_num(owner);
            let mut fleet = Fleet::new(
                num,
                owner,
                format!("{} #{num}", design.name),
                position,
                vec![ShipToken::new(built.design_num, built.quantity)],
            );
            fleet.orbiting_planet_num = Some(result.planet_num);
            fleet.purpose = design.purpose;
            fleet.compute_spec(&player.designs)?;
            fleet.fuel = fleet.spec.fuel_capacity;
            let key = universe.add_fleet(fleet);
            self.summary.ships_built += built.quantity;
            tracing::debug!(fleet = %key, planet = result.planet_num, "ships launched");
        }

        if let Some(design_num) = result.starbase {
            let design = player.require_design(design_num)?;
            match universe.starbase(result.planet_num).map(Fleet::key) {
                Some(key) => {
                    if let Some(starbase) = universe.fleet_mut(key) {
                        starbase.tokens = vec![ShipToken::new(design_num, 1)];
                        starbase.name.clone_from(&design.name);
                        starbase.compute_spec(&player.designs)?;
                    }
                }
                None => {
                    let mut starbase = Fleet::new(
                        universe.next_fleet_num(owner),
                        owner,
                        design.name.clone(),
                        position,
                        vec![ShipToken::new(design_num, 1)],
                    );
                    starbase.starbase = true;
                    starbase.orbiting_planet_num = Some(result.planet_num);
                    starbase.purpose = design.purpose;
                    starbase.compute_spec(&player.designs)?;
                    universe.add_fleet(starbase);
                }
            }
            universe.compute_planet_spec(result.planet_num, players, &game.rules, self.catalog)?;
            self.summary.starbases_built += 1;
        }
        Ok(())
    }

    fn research(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        for player in players.iter_mut() {
            let from_planets: i32 = universe
                .player_planets(player.num)
                .map(|p| p.spec.resources_per_year_research)
                .sum();
            let leftover = self.leftover_resources.get(&player.num).copied().unwrap_or(0);
            let gained = research(player, &game.rules, from_planets + leftover);
            self.summary.tech_levels_gained += i32::try_from(gained.len()).unwrap_or(0);
        }
        Ok(())
    }

    fn steal_research(&mut self) -> Result<()> {
        Ok(())
    }

    fn permaform(&mut self) -> Result<()> {
        Ok(())
    }

    fn grow_population(&mut self) -> Result<()> {
        self.compute_specs()?;
        let FullGame {
            players, universe, ..
        } = &mut *self.game;

        for planet in universe.planets.iter_mut() {
            let Some(owner) = planet.player_num else {
                continue;
            };
            let growth = planet.spec.growth_amount;
            if growth == 0 {
                continue;
            }
            let population = planet.population() + growth;
            planet.set_population(population);
            if growth > 0 {
                continue;
            }

            let player = player_mut(players, owner)?;
            if planet.population() <= 0 {
                tracing::debug!(planet = planet.num, player = owner, "colony died out");
                player.message(PlayerMessage::planet(
                    PlayerMessageKind::PopulationDiedOff,
                    planet.num,
                    format!("The last colonists on {} have died", planet.name),
                ));
                planet.empty();
            } else {
                player.message(PlayerMessage::planet(
                    PlayerMessageKind::PopulationDiedOff,
                    planet.num,
                    format!("{} colonists died on {}", -growth, planet.name),
                ));
            }
        }
        Ok(())
    }

    fn refuel_fleets(&mut self) -> Result<()> {
        refuel_fleets(&mut self.game.universe);
        Ok(())
    }

    fn random_events(&mut self) -> Result<()> {
        Ok(())
    }

    fn fleet_battle(&mut self) -> Result<()> {
        Ok(())
    }

    fn fleet_bombing(&mut self) -> Result<()> {
        Ok(())
    }

    fn meet_mystery_trader(&mut self) -> Result<()> {
        Ok(())
    }

    fn decay_mines(&mut self) -> Result<()> {
        Ok(())
    }

    fn lay_mines(&mut self) -> Result<()> {
        Ok(())
    }

    fn transfer_cargo(&mut self) -> Result<()> {
        Ok(())
    }

    fn instaform(&mut self) -> Result<()> {
        Ok(())
    }

    fn sweep_mines(&mut self) -> Result<()> {
        Ok(())
    }

    fn repair_fleets(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        repair_fleets(universe, players, &game.rules)
    }

    fn remote_terraform(&mut self) -> Result<()> {
        Ok(())
    }

    fn discovery(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        let observers: Vec<PlayerNum> = players.iter().map(|p| p.num).collect();
        for observer in observers {
            discover(observer, players, universe, &game.rules, game.year)?;
        }
        Ok(())
    }

    fn patrol(&mut self) -> Result<()> {
        Ok(())
    }

    fn scores(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        update_scores(players, universe, game.year);
        Ok(())
    }

    fn victory(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        let winners = check_victory(
            players,
            universe.planets.len(),
            game.years_elapsed(),
            &game.victory_conditions,
        );
        if !winners.is_empty() {
            game.victor_declared = true;
            game.state = GameState::GameOver;
        }
        self.summary.victors = winners;
        Ok(())
    }

    fn clear_submitted(&mut self) -> Result<()> {
        for player in &mut self.game.players {
            player.submitted_turn = false;
        }
        Ok(())
    }

    fn ai(&mut self) -> Result<()> {
        let FullGame {
            game,
            players,
            universe,
        } = &mut *self.game;
        for player in players.iter_mut().filter(|p| p.ai_controlled) {
            ai::process_turn(player, universe, &game.rules, self.catalog)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameSettings, PlayerSetup};
    use crate::race::Race;
    use crate::rules::{Density, Rules, Size};
    use crate::tech::StandardCatalog;

    fn game(seed: u64) -> FullGame {
        let settings = GameSettings {
            size: Size::Tiny,
            density: Density::Sparse,
            players: vec![PlayerSetup::ai("Bot", Race::default())],
            ..GameSettings::default()
        };
        FullGame::create(1, &settings, Rules::with_seed(seed), &StandardCatalog::new()).unwrap()
    }

    fn homeworld_population(game: &FullGame) -> i32 {
        game.universe
            .player_planets(1)
            .find(|p| p.homeworld)
            .unwrap()
            .population()
    }

    #[test]
    fn test_turn_advances_year_and_grows_homeworld() {
        let mut game = game(3);
        let catalog = StandardCatalog::new();
        let before = homeworld_population(&game);

        let summary = TurnGenerator::new(&mut game, &catalog).generate_turn().unwrap();

        assert_eq!(summary.year, 2401);
        assert_eq!(game.game.year, 2401);
        assert_eq!(game.game.state, GameState::WaitingForPlayers);
        assert_eq!(game.players[0].planet_intels.len(), game.universe.planets.len());
        assert!(homeworld_population(&game) > before);
    }

    #[test]
    fn test_ai_builds_fleets_over_several_turns() {
        let mut game = game(11);
        let catalog = StandardCatalog::new();
        let mut built = 0;
        for _ in 0..10 {
            built += TurnGenerator::new(&mut game, &catalog)
                .generate_turn()
                .unwrap()
                .ships_built;
        }
        assert!(built > 0);
        assert!(game
            .universe
            .player_fleets(1)
            .any(|f| !f.starbase && f.age < 10));
    }

    #[test]
    fn test_game_over_refuses_turns() {
        let mut game = game(1);
        game.game.state = GameState::GameOver;
        let err = TurnGenerator::new(&mut game, &StandardCatalog::new())
            .generate_turn()
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[test]
    fn test_phase_errors_name_the_phase() {
        let mut game = game(2);
        // a fleet referencing a design its owner never had
        let home = game.universe.player_planets(1).next().unwrap().position;
        let num = game.universe.next_fleet_num(1);
        game.universe
            .add_fleet(Fleet::new(num, 1, "Ghost", home, vec![ShipToken::new(99, 1)]));

        let err = TurnGenerator::new(&mut game, &StandardCatalog::new())
            .generate_turn()
            .unwrap_err();
        match err {
            GameError::TurnPhase {
                game_id,
                year,
                phase,
                source,
            } => {
                assert_eq!(game_id, 1);
                assert_eq!(year, 2401);
                assert_eq!(phase, "compute_specs");
                assert!(matches!(*source, GameError::UnknownDesign { design: 99, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let catalog = StandardCatalog::new();
        let mut a = game(21);
        let mut b = game(21);
        for _ in 0..3 {
            TurnGenerator::new(&mut a, &catalog).generate_turn().unwrap();
            TurnGenerator::new(&mut b, &catalog).generate_turn().unwrap();
        }
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }
}
