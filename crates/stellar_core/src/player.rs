//! Players, their research settings and their messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::design::ShipDesign;
use crate::error::{GameError, Result};
use crate::fleet::FleetKey;
use crate::intel::{DesignKey, FleetIntel, PlanetIntel, PlayerIntel, ShipDesignIntel};
use crate::planet::Planet;
use crate::race::{Race, RaceSpec};
use crate::rules::Rules;
use crate::score::{PlayerScore, VictoryCondition};
use crate::tech::{TechField, TechLevel};

/// Player number, starting at 1.
pub type PlayerNum = u32;

/// What to research once the current field levels up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NextResearchField {
    /// Keep researching the same field.
    SameField,
    /// Switch to a specific field.
    Field(TechField),
    /// Switch to the lowest field.
    #[default]
    LowestField,
}

/// Kind of a player message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerMessageKind {
    /// Mines finished.
    BuiltMine,
    /// Factories finished.
    BuiltFactory,
    /// Defenses finished.
    BuiltDefense,
    /// Planetary scanner installed.
    BuiltScanner,
    /// Minerals made by alchemy.
    BuiltMineralAlchemy,
    /// Ships finished.
    BuiltShip,
    /// Starbase finished.
    BuiltStarbase,
    /// A ship in the queue needs a starbase with a dock.
    NoDockForShip,
    /// The build queue has nothing left to build.
    QueueEmpty,
    /// Colonize target is not a planet.
    ColonizeNotPlanet,
    /// Colonize target already has an owner.
    ColonizeOwnedPlanet,
    /// Fleet lacks a colonization module.
    ColonizeNoModule,
    /// Fleet carries no colonists.
    ColonizeNoColonists,
    /// A new colony was founded.
    PlanetColonized,
    /// Colonists cannot be dropped on another player's planet.
    UnloadColonistsForeignPlanet,
    /// Cargo could not be loaded.
    LoadInvalid,
    /// Fleet reached its waypoint.
    FleetArrived,
    /// Fleet slowed down for lack of fuel.
    FleetOutOfFuel,
    /// Fleet jumped through a stargate.
    FleetStargateJump,
    /// Fleet merged into another.
    FleetMerged,
    /// Fleet was scrapped.
    FleetScrapped,
    /// A tech level was reached.
    TechLevelGained,
    /// Population died on a hostile or overcrowded planet.
    PopulationDiedOff,
    /// A victory condition was met.
    Victory,
}

/// What a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageTarget {
    /// Nothing in particular.
    #[default]
    None,
    /// A planet.
    Planet(u32),
    /// A fleet.
    Fleet(FleetKey),
}

/// A message shown to a player in the turn report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMessage {
    /// Kind.
    pub kind: PlayerMessageKind,
    /// Target.
    pub target: MessageTarget,
    /// Text.
    pub text: String,
}

impl PlayerMessage {
    /// Message about a planet.
    #[must_use]
    pub fn planet(kind: PlayerMessageKind, planet: u32, text: impl Into<String>) -> Self {
        Self {
            kind,
            target: MessageTarget::Planet(planet),
            text: text.into(),
        }
    }

    /// Message about a fleet.
    #[must_use]
    pub fn fleet(kind: PlayerMessageKind, fleet: FleetKey, text: impl Into<String>) -> Self {
        Self {
            kind,
            target: MessageTarget::Fleet(fleet),
            text: text.into(),
        }
    }

    /// Message about nothing in particular.
    #[must_use]
    pub fn general(kind: PlayerMessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            target: MessageTarget::None,
            text: text.into(),
        }
    }
}

/// A player in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Number, starting at 1.
    pub num: PlayerNum,
    /// Display name.
    pub name: String,
    /// Race, copied from the template at setup.
    pub race: Race,
    /// Derived race properties.
    pub race_spec: RaceSpec,
    /// Orders are issued by the built-in AI.
    pub ai_controlled: bool,
    /// Orders for this year were submitted.
    pub submitted_turn: bool,
    /// Current tech levels.
    pub tech_levels: TechLevel,
    /// Research points spent towards the next level of each field.
    pub tech_levels_spent: TechLevel,
    /// Percent of planet resources that go to research.
    pub research_amount: i32,
    /// Field currently being researched.
    pub researching: TechField,
    /// Field to research after a level up.
    pub next_research_field: NextResearchField,
    /// Ship and starbase designs.
    pub designs: Vec<ShipDesign>,
    /// Dense intel, one entry per planet.
    pub planet_intels: Vec<PlanetIntel>,
    /// Other players' fleets seen this year.
    pub fleet_intels: BTreeMap<FleetKey, FleetIntel>,
    /// Other players' designs seen so far.
    pub design_intels: BTreeMap<DesignKey, ShipDesignIntel>,
    /// Other players.
    pub player_intels: Vec<PlayerIntel>,
    /// Messages for the current year.
    pub messages: Vec<PlayerMessage>,
    /// Score as of the last turn.
    pub score: PlayerScore,
    /// Score of every past year.
    pub score_history: Vec<PlayerScore>,
    /// Victory conditions this player has met.
    pub achieved_victory_conditions: Vec<VictoryCondition>,
    /// Declared winner.
    pub victor: bool,
}

impl Player {
    /// A new player with the race's starting tech and no designs.
    #[must_use]
    pub fn new(num: PlayerNum, name: impl Into<String>, race: Race, rules: &Rules) -> Self {
        let race_spec = race.spec();
        Self {
            num,
            name: name.into(),
            tech_levels: race_spec.starting_tech_levels,
            race,
            race_spec,
            ai_controlled: false,
            submitted_turn: false,
            tech_levels_spent: TechLevel::default(),
            research_amount: rules.default_research_percent,
            researching: TechField::Energy,
            next_research_field: NextResearchField::default(),
            designs: Vec::new(),
            planet_intels: Vec::new(),
            fleet_intels: BTreeMap::new(),
            design_intels: BTreeMap::new(),
            player_intels: Vec::new(),
            messages: Vec::new(),
            score: PlayerScore::default(),
            score_history: Vec::new(),
            achieved_victory_conditions: Vec::new(),
            victor: false,
        }
    }

    /// Same player under AI control.
    #[must_use]
    pub fn with_ai(mut self) -> Self {
        self.ai_controlled = true;
        self
    }

    /// Fill planet intel with one unexplored entry per planet.
    pub fn init_planet_intels(&mut self, planets: &[Planet]) {
        self.planet_intels = planets.iter().map(PlanetIntel::unexplored).collect();
    }

    /// Intel on a planet.
    pub fn planet_intel(&self, planet_num: u32) -> Result<&PlanetIntel> {
        let len = self.planet_intels.len();
        planet_num
            .checked_sub(1)
            .and_then(|i| self.planet_intels.get(i as usize))
            .ok_or(GameError::IntelIndexOutOfRange {
                player: self.num,
                planet: planet_num,
                len,
            })
    }

    /// Mutable intel on a planet.
    pub fn planet_intel_mut(&mut self, planet_num: u32) -> Result<&mut PlanetIntel> {
        let len = self.planet_intels.len();
        let num = self.num;
        planet_num
            .checked_sub(1)
            .and_then(|i| self.planet_intels.get_mut(i as usize))
            .ok_or(GameError::IntelIndexOutOfRange {
                player: num,
                planet: planet_num,
                len,
            })
    }

    /// Design by number.
    #[must_use]
    pub fn design(&self, num: u32) -> Option<&ShipDesign> {
        self.designs.iter().find(|d| d.num == num)
    }

    /// Design by number, or an error naming the player.
    pub fn require_design(&self, num: u32) -> Result<&ShipDesign> {
        self.design(num).ok_or(GameError::UnknownDesign {
            player: self.num,
            design: num,
        })
    }

    /// Design by name.
    #[must_use]
    pub fn design_by_name(&self, name: &str) -> Option<&ShipDesign> {
        self.designs.iter().find(|d| d.name == name)
    }

    /// Number for the next new design.
    #[must_use]
    pub fn next_design_num(&self) -> u32 {
        self.designs.iter().map(|d| d.num).max().unwrap_or(0) + 1
    }

    /// Queue a message for this year's report.
    pub fn message(&mut self, message: PlayerMessage) {
        self.messages.push(message);
    }

    /// Research cost multiplier for a field, in percent.
    #[must_use]
    pub fn research_cost_percent(&self, field: TechField) -> i32 {
        self.race_spec.research_cost_percent(field)
    }
}

/// Player by number in a player list.
pub fn player_mut(players: &mut [Player], num: PlayerNum) -> Result<&mut Player> {
    players
        .iter_mut()
        .find(|p| p.num == num)
        .ok_or(GameError::UnknownPlayer(num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Fixed;

    #[test]
    fn test_new_player_uses_race_defaults() {
        let player = Player::new(1, "Ann", Race::default(), &Rules::default());
        assert_eq!(player.tech_levels, TechLevel::new(3, 3, 3, 3, 3, 3));
        assert_eq!(player.research_amount, 15);
        assert_eq!(player.next_design_num(), 1);
    }

    #[test]
    fn test_planet_intel_out_of_range() {
        let mut player = Player::new(2, "Bo", Race::default(), &Rules::default());
        let planets = vec![
            Planet::new(1, "A", Vec2Fixed::ZERO),
            Planet::new(2, "B", Vec2Fixed::from_ints(20, 0)),
        ];
        player.init_planet_intels(&planets);

        assert_eq!(player.planet_intel(2).unwrap().name, "B");
        let err = player.planet_intel(3).unwrap_err();
        assert!(matches!(
            err,
            GameError::IntelIndexOutOfRange {
                player: 2,
                planet: 3,
                len: 2
            }
        ));
        assert!(player.planet_intel(0).is_err());
    }
}
