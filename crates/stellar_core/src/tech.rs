//! Tech levels and the read-only tech catalog.
//!
//! The catalog is injected into generation and turn processing as a
//! `&dyn TechCatalog`; [`StandardCatalog`] covers the early and mid game
//! parts every race starts from.

use serde::{Deserialize, Serialize};

use crate::cost::Cost;
use crate::race::{LesserRacialTrait, PrimaryRacialTrait, Race};

/// The six research fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechField {
    /// Energy.
    Energy,
    /// Weapons.
    Weapons,
    /// Propulsion.
    Propulsion,
    /// Construction.
    Construction,
    /// Electronics.
    Electronics,
    /// Biotechnology.
    Biotechnology,
}

impl TechField {
    /// Every field in research order.
    pub const ALL: [Self; 6] = [
        Self::Energy,
        Self::Weapons,
        Self::Propulsion,
        Self::Construction,
        Self::Electronics,
        Self::Biotechnology,
    ];

    /// The field researched after this one when cycling through all fields.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Energy => Self::Weapons,
            Self::Weapons => Self::Propulsion,
            Self::Propulsion => Self::Construction,
            Self::Construction => Self::Electronics,
            Self::Electronics => Self::Biotechnology,
            Self::Biotechnology => Self::Energy,
        }
    }
}

/// A level in each field. Also used for tech requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TechLevel {
    /// Energy.
    pub energy: i32,
    /// Weapons.
    pub weapons: i32,
    /// Propulsion.
    pub propulsion: i32,
    /// Construction.
    pub construction: i32,
    /// Electronics.
    pub electronics: i32,
    /// Biotechnology.
    pub biotechnology: i32,
}

impl TechLevel {
    /// Create a new set of levels.
    #[must_use]
    pub const fn new(
        energy: i32,
        weapons: i32,
        propulsion: i32,
        construction: i32,
        electronics: i32,
        biotechnology: i32,
    ) -> Self {
        Self {
            energy,
            weapons,
            propulsion,
            construction,
            electronics,
            biotechnology,
        }
    }

    /// Level in one field.
    #[must_use]
    pub const fn get(&self, field: TechField) -> i32 {
        match field {
            TechField::Energy => self.energy,
            TechField::Weapons => self.weapons,
            TechField::Propulsion => self.propulsion,
            TechField::Construction => self.construction,
            TechField::Electronics => self.electronics,
            TechField::Biotechnology => self.biotechnology,
        }
    }

    /// Mutable level in one field.
    pub fn get_mut(&mut self, field: TechField) -> &mut i32 {
        match field {
            TechField::Energy => &mut self.energy,
            TechField::Weapons => &mut self.weapons,
            TechField::Propulsion => &mut self.propulsion,
            TechField::Construction => &mut self.construction,
            TechField::Electronics => &mut self.electronics,
            TechField::Biotechnology => &mut self.biotechnology,
        }
    }

    /// Sum of all six levels.
    #[must_use]
    pub const fn sum(&self) -> i32 {
        self.energy
            + self.weapons
            + self.propulsion
            + self.construction
            + self.electronics
            + self.biotechnology
    }

    /// True if every field is at least the required level.
    #[must_use]
    pub fn meets(&self, required: &TechLevel) -> bool {
        TechField::ALL
            .iter()
            .all(|&f| self.get(f) >= required.get(f))
    }

    /// Field-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        let mut out = self;
        for field in TechField::ALL {
            *out.get_mut(field) = self.get(field).max(other.get(field));
        }
        out
    }
}

/// Tech requirements plus the racial traits a part is limited to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechRequirements {
    /// Minimum levels.
    pub levels: TechLevel,
    /// Only races with this primary trait can use the part.
    pub prt_required: Option<PrimaryRacialTrait>,
    /// Races with this lesser trait cannot use the part.
    pub lrt_denied: Option<LesserRacialTrait>,
}

impl TechRequirements {
    /// Requirements on levels only.
    #[must_use]
    pub const fn levels(levels: TechLevel) -> Self {
        Self {
            levels,
            prt_required: None,
            lrt_denied: None,
        }
    }

    /// True if a player with this race and these levels may use the part.
    #[must_use]
    pub fn available_to(&self, race: &Race, levels: &TechLevel) -> bool {
        if !levels.meets(&self.levels) {
            return false;
        }
        if let Some(prt) = self.prt_required {
            if race.prt != prt {
                return false;
            }
        }
        if let Some(lrt) = self.lrt_denied {
            if race.has_lrt(lrt) {
                return false;
            }
        }
        true
    }
}

/// Kind of part a component is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentCategory {
    /// Engines.
    Engine,
    /// Ship scanners.
    Scanner,
    /// Armor.
    Armor,
    /// Shields.
    Shield,
    /// Colonization modules, fuel tanks, cargo pods.
    Mechanical,
    /// Cloaks and detectors.
    Electrical,
    /// Stargates and other starbase-only parts.
    Orbital,
}

/// What a hull slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullSlotType {
    /// Engines only.
    Engine,
    /// Scanners only.
    Scanner,
    /// Armor only.
    Armor,
    /// Shields only.
    Shield,
    /// Armor or shields.
    ShieldArmor,
    /// Mechanical parts only.
    Mechanical,
    /// Scanners, electrical or mechanical parts.
    ScannerElectricalMechanical,
    /// Orbital parts only (starbases).
    Orbital,
    /// Anything except engines and orbital parts.
    General,
}

impl HullSlotType {
    /// True if a component of this category fits the slot.
    #[must_use]
    pub const fn accepts(self, category: ComponentCategory) -> bool {
        use ComponentCategory as C;
        match self {
            Self::Engine => matches!(category, C::Engine),
            Self::Scanner => matches!(category, C::Scanner),
            Self::Armor => matches!(category, C::Armor),
            Self::Shield => matches!(category, C::Shield),
            Self::ShieldArmor => matches!(category, C::Shield | C::Armor),
            Self::Mechanical => matches!(category, C::Mechanical),
            Self::ScannerElectricalMechanical => {
                matches!(category, C::Scanner | C::Electrical | C::Mechanical)
            }
            Self::Orbital => matches!(category, C::Orbital),
            Self::General => !matches!(category, C::Engine | C::Orbital),
        }
    }
}

/// One slot of a hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HullSlot {
    /// Accepted parts.
    pub slot_type: HullSlotType,
    /// Maximum number of parts in the slot.
    pub capacity: i32,
    /// The slot must be filled for the design to be valid.
    pub required: bool,
}

/// Space dock size meaning "any hull can be built here".
pub const UNLIMITED_SPACE_DOCK: i32 = -1;

/// A ship or starbase hull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechHull {
    /// Display name, also the lookup key.
    pub name: String,
    /// Who can build it.
    pub requirements: TechRequirements,
    /// Cost of the empty hull.
    pub cost: Cost,
    /// Mass of the empty hull in kT.
    pub mass: i32,
    /// Built-in armor.
    pub armor: i32,
    /// Built-in fuel tanks in mg.
    pub fuel_capacity: i32,
    /// Built-in cargo space in kT.
    pub cargo_capacity: i32,
    /// Starbase hulls never move.
    pub starbase: bool,
    /// Largest hull mass a starbase can build; 0 for none.
    pub space_dock: i32,
    /// Slots in layout order.
    pub slots: Vec<HullSlot>,
}

/// Engine stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    /// Fastest warp without extra fuel penalty.
    pub ideal_speed: i32,
    /// Fastest warp that burns no fuel.
    pub free_speed: i32,
    /// Fuel (mg) burned per 100 kT of mass over 200 ly, indexed by warp 0..=10.
    pub fuel_usage: [i32; 11],
}

/// Stargate stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stargate {
    /// Longest safe jump in light-years.
    pub safe_range: i32,
    /// Heaviest ship that can jump safely.
    pub safe_hull_mass: i32,
}

/// A part that fits into a hull slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TechHullComponent {
    /// Display name, also the lookup key.
    pub name: String,
    /// Category, decides which slots accept it.
    pub category: Option<ComponentCategory>,
    /// Who can build it.
    pub requirements: TechRequirements,
    /// Cost per part.
    pub cost: Cost,
    /// Mass per part in kT.
    pub mass: i32,
    /// Engine stats when this is an engine.
    pub engine: Option<Engine>,
    /// Normal scan range in light-years; 0 scans only the ship's own position.
    pub scan_range: i32,
    /// Penetrating scan range in light-years.
    pub scan_range_pen: i32,
    /// Armor points.
    pub armor: i32,
    /// Shield points.
    pub shield: i32,
    /// Cloak percent.
    pub cloak_percent: i32,
    /// Percent by which this part reduces enemy cloaking.
    pub reduce_cloaking: i32,
    /// Extra fuel capacity.
    pub fuel_bonus: i32,
    /// Extra cargo capacity.
    pub cargo_bonus: i32,
    /// Carries colonists to found new colonies.
    pub colonization_module: bool,
    /// Scanner can see (and steal) fleet cargo.
    pub can_steal_fleet_cargo: bool,
    /// Scanner can see (and steal) planet cargo.
    pub can_steal_planet_cargo: bool,
    /// Stargate stats when this is a gate.
    pub gate: Option<Stargate>,
}

impl TechHullComponent {
    fn category_is(&self, category: ComponentCategory) -> bool {
        self.category == Some(category)
    }
}

/// A planetary scanner installed on colonies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechPlanetaryScanner {
    /// Display name.
    pub name: String,
    /// Who can build it.
    pub requirements: TechRequirements,
    /// Normal range.
    pub scan_range: i32,
    /// Penetrating range.
    pub scan_range_pen: i32,
}

/// Read-only lookup of hulls and parts.
///
/// Implementors only provide the raw lists; "best available" selection is
/// shared.
pub trait TechCatalog {
    /// Every hull.
    fn hulls(&self) -> &[TechHull];
    /// Every slotted part.
    fn components(&self) -> &[TechHullComponent];
    /// Every planetary scanner.
    fn planetary_scanners(&self) -> &[TechPlanetaryScanner];

    /// Hull by name.
    fn hull(&self, name: &str) -> Option<&TechHull> {
        self.hulls().iter().find(|h| h.name == name)
    }

    /// Part by name.
    fn component(&self, name: &str) -> Option<&TechHullComponent> {
        self.components().iter().find(|c| c.name == name)
    }

    /// Fastest engine available; ties go to the later, more efficient entry.
    fn best_engine(&self, race: &Race, levels: &TechLevel) -> Option<&TechHullComponent> {
        best_by(self.components(), race, levels, ComponentCategory::Engine, |c| {
            c.engine.map_or(0, |e| e.ideal_speed)
        })
    }

    /// Longest range ship scanner available.
    fn best_scanner(&self, race: &Race, levels: &TechLevel) -> Option<&TechHullComponent> {
        best_by(self.components(), race, levels, ComponentCategory::Scanner, |c| {
            c.scan_range
        })
    }

    /// Strongest armor available.
    fn best_armor(&self, race: &Race, levels: &TechLevel) -> Option<&TechHullComponent> {
        best_by(self.components(), race, levels, ComponentCategory::Armor, |c| {
            c.armor
        })
    }

    /// Strongest shield available.
    fn best_shield(&self, race: &Race, levels: &TechLevel) -> Option<&TechHullComponent> {
        best_by(self.components(), race, levels, ComponentCategory::Shield, |c| {
            c.shield
        })
    }

    /// Longest range planetary scanner available.
    fn best_planetary_scanner(
        &self,
        race: &Race,
        levels: &TechLevel,
    ) -> Option<&TechPlanetaryScanner> {
        let mut best: Option<&TechPlanetaryScanner> = None;
        for scanner in self.planetary_scanners() {
            if !scanner.requirements.available_to(race, levels) {
                continue;
            }
            if best.map_or(true, |b| scanner.scan_range >= b.scan_range) {
                best = Some(scanner);
            }
        }
        best
    }
}

fn best_by<'a>(
    components: &'a [TechHullComponent],
    race: &Race,
    levels: &TechLevel,
    category: ComponentCategory,
    score: impl Fn(&TechHullComponent) -> i32,
) -> Option<&'a TechHullComponent> {
    let mut best: Option<&TechHullComponent> = None;
    for component in components {
        if !component.category_is(category) || !component.requirements.available_to(race, levels) {
            continue;
        }
        if best.map_or(true, |b| score(component) >= score(b)) {
            best = Some(component);
        }
    }
    best
}

/// Names of the standard hulls used by starting fleets and the AI.
pub mod names {
    /// Scout hull.
    pub const SCOUT: &str = "Scout";
    /// Colony ship hull.
    pub const COLONY_SHIP: &str = "Colony Ship";
    /// Small freighter hull.
    pub const SMALL_FREIGHTER: &str = "Small Freighter";
    /// Destroyer hull.
    pub const DESTROYER: &str = "Destroyer";
    /// Orbital fort hull.
    pub const ORBITAL_FORT: &str = "Orbital Fort";
    /// Space station hull.
    pub const SPACE_STATION: &str = "Space Station";
    /// Colonization module.
    pub const COLONIZATION_MODULE: &str = "Colonization Module";
    /// Fuel tank.
    pub const FUEL_TANK: &str = "Fuel Tank";
    /// Cargo pod.
    pub const CARGO_POD: &str = "Cargo Pod";
    /// Stargate.
    pub const STARGATE: &str = "Stargate 100-250";
}

/// The built-in catalog.
#[derive(Debug, Clone)]
pub struct StandardCatalog {
    hulls: Vec<TechHull>,
    components: Vec<TechHullComponent>,
    planetary_scanners: Vec<TechPlanetaryScanner>,
}

impl TechCatalog for StandardCatalog {
    fn hulls(&self) -> &[TechHull] {
        &self.hulls
    }

    fn components(&self) -> &[TechHullComponent] {
        &self.components
    }

    fn planetary_scanners(&self) -> &[TechPlanetaryScanner] {
        &self.planetary_scanners
    }
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self::new()
    }
}

const fn lv(e: i32, w: i32, p: i32, c: i32, el: i32, b: i32) -> TechRequirements {
    TechRequirements::levels(TechLevel::new(e, w, p, c, el, b))
}

const fn slot(slot_type: HullSlotType, capacity: i32, required: bool) -> HullSlot {
    HullSlot {
        slot_type,
        capacity,
        required,
    }
}

impl StandardCatalog {
    /// Build the catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hulls: standard_hulls(),
            components: standard_components(),
            planetary_scanners: standard_planetary_scanners(),
        }
    }
}

fn standard_hulls() -> Vec<TechHull> {
    use HullSlotType as S;
    vec![
        TechHull {
            name: names::SCOUT.into(),
            requirements: lv(0, 0, 0, 0, 0, 0),
            cost: Cost::new(4, 2, 4, 10),
            mass: 8,
            armor: 20,
            fuel_capacity: 50,
            cargo_capacity: 0,
            starbase: false,
            space_dock: 0,
            slots: vec![
                slot(S::Engine, 1, true),
                slot(S::Scanner, 1, false),
                slot(S::General, 1, false),
            ],
        },
        TechHull {
            name: names::COLONY_SHIP.into(),
            requirements: lv(0, 0, 0, 0, 0, 0),
            cost: Cost::new(9, 0, 13, 18),
            mass: 20,
            armor: 20,
            fuel_capacity: 200,
            cargo_capacity: 25,
            starbase: false,
            space_dock: 0,
            slots: vec![slot(S::Engine, 1, true), slot(S::Mechanical, 1, false)],
        },
        TechHull {
            name: names::SMALL_FREIGHTER.into(),
            requirements: lv(0, 0, 0, 0, 0, 0),
            cost: Cost::new(12, 0, 17, 20),
            mass: 25,
            armor: 25,
            fuel_capacity: 130,
            cargo_capacity: 70,
            starbase: false,
            space_dock: 0,
            slots: vec![
                slot(S::Engine, 1, true),
                slot(S::ShieldArmor, 1, false),
                slot(S::ScannerElectricalMechanical, 1, false),
            ],
        },
        TechHull {
            name: names::DESTROYER.into(),
            requirements: lv(0, 0, 0, 3, 0, 0),
            cost: Cost::new(15, 3, 5, 35),
            mass: 30,
            armor: 200,
            fuel_capacity: 280,
            cargo_capacity: 0,
            starbase: false,
            space_dock: 0,
            slots: vec![
                slot(S::Engine, 1, true),
                slot(S::General, 1, false),
                slot(S::General, 1, false),
                slot(S::ShieldArmor, 2, false),
                slot(S::Scanner, 1, false),
            ],
        },
        TechHull {
            name: names::ORBITAL_FORT.into(),
            requirements: lv(0, 0, 0, 0, 0, 0),
            cost: Cost::new(24, 0, 34, 80),
            mass: 0,
            armor: 100,
            fuel_capacity: 0,
            cargo_capacity: 0,
            starbase: true,
            space_dock: 0,
            slots: vec![slot(S::Orbital, 1, false), slot(S::ShieldArmor, 12, false)],
        },
        TechHull {
            name: names::SPACE_STATION.into(),
            requirements: lv(0, 0, 0, 0, 0, 0),
            cost: Cost::new(120, 80, 250, 600),
            mass: 0,
            armor: 500,
            fuel_capacity: 0,
            cargo_capacity: 0,
            starbase: true,
            space_dock: UNLIMITED_SPACE_DOCK,
            slots: vec![
                slot(S::Orbital, 1, false),
                slot(S::Shield, 16, false),
                slot(S::Armor, 16, false),
                slot(S::ScannerElectricalMechanical, 1, false),
            ],
        },
    ]
}

fn engine(
    name: &str,
    requirements: TechRequirements,
    cost: Cost,
    mass: i32,
    ideal_speed: i32,
    fuel_usage: [i32; 11],
) -> TechHullComponent {
    TechHullComponent {
        name: name.into(),
        category: Some(ComponentCategory::Engine),
        requirements,
        cost,
        mass,
        engine: Some(Engine {
            ideal_speed,
            free_speed: 1,
            fuel_usage,
        }),
        ..TechHullComponent::default()
    }
}

fn scanner(
    name: &str,
    requirements: TechRequirements,
    cost: Cost,
    mass: i32,
    scan_range: i32,
    scan_range_pen: i32,
) -> TechHullComponent {
    TechHullComponent {
        name: name.into(),
        category: Some(ComponentCategory::Scanner),
        requirements,
        cost,
        mass,
        scan_range,
        scan_range_pen,
        ..TechHullComponent::default()
    }
}

fn standard_components() -> Vec<TechHullComponent> {
    let mut out = vec![
        engine(
            "Quick Jump 5",
            lv(0, 0, 0, 0, 0, 0),
            Cost::new(3, 0, 1, 3),
            4,
            5,
            [0, 0, 25, 100, 100, 100, 180, 500, 800, 900, 1080],
        ),
        engine(
            "Long Hump 6",
            lv(0, 0, 3, 0, 0, 0),
            Cost::new(5, 0, 1, 6),
            9,
            6,
            [0, 0, 20, 60, 100, 100, 105, 450, 750, 900, 1080],
        ),
        engine(
            "Daddy Long Legs 7",
            lv(0, 0, 5, 0, 0, 0),
            Cost::new(11, 0, 3, 12),
            13,
            7,
            [0, 0, 20, 60, 70, 100, 100, 110, 600, 750, 900],
        ),
        engine(
            "Alpha Drive 8",
            lv(0, 0, 7, 0, 0, 0),
            Cost::new(16, 0, 3, 28),
            17,
            8,
            [0, 0, 15, 50, 60, 70, 100, 100, 115, 700, 840],
        ),
        engine(
            "Trans-Galactic Drive",
            lv(0, 0, 9, 0, 0, 0),
            Cost::new(20, 20, 9, 50),
            25,
            9,
            [0, 0, 15, 35, 45, 55, 70, 80, 90, 100, 120],
        ),
        scanner("Bat Scanner", lv(0, 0, 0, 0, 0, 0), Cost::new(1, 0, 1, 1), 2, 0, 0),
        scanner("Rhino Scanner", lv(0, 0, 0, 0, 1, 0), Cost::new(3, 0, 2, 3), 5, 50, 0),
        scanner("Mole Scanner", lv(0, 0, 0, 0, 4, 0), Cost::new(2, 0, 2, 9), 2, 100, 0),
        scanner("Possum Scanner", lv(0, 0, 0, 0, 5, 0), Cost::new(3, 0, 3, 18), 3, 150, 0),
        scanner("Ferret Scanner", lv(3, 0, 0, 0, 7, 2), Cost::new(2, 0, 8, 36), 2, 185, 50),
        scanner("Dolphin Scanner", lv(5, 0, 0, 0, 10, 4), Cost::new(5, 5, 10, 40), 4, 220, 100),
    ];

    let mut pick_pocket = scanner(
        "Pick Pocket Scanner",
        lv(4, 0, 0, 0, 4, 4),
        Cost::new(8, 10, 6, 35),
        15,
        80,
        0,
    );
    pick_pocket.requirements.prt_required = Some(PrimaryRacialTrait::SuperStealth);
    pick_pocket.can_steal_fleet_cargo = true;
    out.push(pick_pocket);

    let mut robber_baron = scanner(
        "Robber Baron Scanner",
        lv(10, 0, 0, 0, 15, 10),
        Cost::new(10, 10, 10, 90),
        20,
        220,
        120,
    );
    robber_baron.requirements.prt_required = Some(PrimaryRacialTrait::SuperStealth);
    robber_baron.can_steal_fleet_cargo = true;
    robber_baron.can_steal_planet_cargo = true;
    out.push(robber_baron);

    for (name, req, cost, mass, armor) in [
        ("Tritanium", lv(0, 0, 0, 0, 0, 0), Cost::new(5, 0, 0, 10), 60, 50),
        ("Crobmnium", lv(0, 0, 0, 3, 0, 0), Cost::new(6, 0, 0, 13), 56, 75),
        ("Carbonic Armor", lv(0, 0, 0, 0, 0, 4), Cost::new(0, 0, 5, 15), 25, 100),
        ("Strobnium", lv(0, 0, 0, 6, 0, 0), Cost::new(8, 0, 0, 18), 54, 120),
    ] {
        out.push(TechHullComponent {
            name: name.into(),
            category: Some(ComponentCategory::Armor),
            requirements: req,
            cost,
            mass,
            armor,
            ..TechHullComponent::default()
        });
    }

    for (name, req, cost, mass, shield) in [
        ("Mole-skin Shield", lv(0, 0, 0, 0, 0, 0), Cost::new(1, 0, 1, 4), 1, 25),
        ("Cow-hide Shield", lv(3, 0, 0, 0, 0, 0), Cost::new(2, 0, 2, 5), 1, 40),
        ("Wolverine Diffuse Shield", lv(6, 0, 0, 0, 0, 0), Cost::new(3, 0, 3, 6), 1, 60),
    ] {
        out.push(TechHullComponent {
            name: name.into(),
            category: Some(ComponentCategory::Shield),
            requirements: req,
            cost,
            mass,
            shield,
            ..TechHullComponent::default()
        });
    }

    out.push(TechHullComponent {
        name: names::COLONIZATION_MODULE.into(),
        category: Some(ComponentCategory::Mechanical),
        requirements: lv(0, 0, 0, 0, 0, 0),
        cost: Cost::new(11, 9, 9, 10),
        mass: 32,
        colonization_module: true,
        ..TechHullComponent::default()
    });
    out.push(TechHullComponent {
        name: names::FUEL_TANK.into(),
        category: Some(ComponentCategory::Mechanical),
        requirements: lv(0, 0, 0, 0, 0, 0),
        cost: Cost::new(6, 0, 0, 4),
        mass: 3,
        fuel_bonus: 250,
        ..TechHullComponent::default()
    });
    out.push(TechHullComponent {
        name: names::CARGO_POD.into(),
        category: Some(ComponentCategory::Mechanical),
        requirements: lv(0, 0, 0, 3, 0, 0),
        cost: Cost::new(5, 0, 2, 10),
        mass: 5,
        cargo_bonus: 50,
        ..TechHullComponent::default()
    });
    out.push(TechHullComponent {
        name: "Stealth Cloak".into(),
        category: Some(ComponentCategory::Electrical),
        requirements: lv(2, 0, 0, 0, 5, 0),
        cost: Cost::new(2, 0, 2, 5),
        mass: 2,
        cloak_percent: 35,
        ..TechHullComponent::default()
    });
    out.push(TechHullComponent {
        name: "Tachyon Detector".into(),
        category: Some(ComponentCategory::Electrical),
        requirements: lv(8, 0, 0, 0, 14, 0),
        cost: Cost::new(1, 5, 0, 70),
        mass: 1,
        reduce_cloaking: 5,
        ..TechHullComponent::default()
    });
    out.push(TechHullComponent {
        name: names::STARGATE.into(),
        category: Some(ComponentCategory::Orbital),
        requirements: lv(0, 0, 5, 5, 0, 0),
        cost: Cost::new(50, 20, 20, 200),
        gate: Some(Stargate {
            safe_range: 250,
            safe_hull_mass: 100,
        }),
        ..TechHullComponent::default()
    });

    out
}

fn standard_planetary_scanners() -> Vec<TechPlanetaryScanner> {
    let mut snooper = TechPlanetaryScanner {
        name: "Snooper 320X".into(),
        requirements: lv(3, 0, 0, 0, 10, 3),
        scan_range: 320,
        scan_range_pen: 160,
    };
    snooper.requirements.lrt_denied = Some(LesserRacialTrait::NoAdvancedScanners);

    vec![
        TechPlanetaryScanner {
            name: "Viewer 50".into(),
            requirements: lv(0, 0, 0, 0, 0, 0),
            scan_range: 50,
            scan_range_pen: 0,
        },
        TechPlanetaryScanner {
            name: "Viewer 90".into(),
            requirements: lv(0, 0, 0, 0, 1, 0),
            scan_range: 90,
            scan_range_pen: 0,
        },
        TechPlanetaryScanner {
            name: "Scoper 150".into(),
            requirements: lv(0, 0, 0, 0, 3, 0),
            scan_range: 150,
            scan_range_pen: 0,
        },
        TechPlanetaryScanner {
            name: "Scoper 220".into(),
            requirements: lv(0, 0, 0, 0, 6, 0),
            scan_range: 220,
            scan_range_pen: 0,
        },
        TechPlanetaryScanner {
            name: "Scoper 280".into(),
            requirements: lv(0, 0, 0, 0, 8, 0),
            scan_range: 280,
            scan_range_pen: 0,
        },
        snooper,
    ]
}
