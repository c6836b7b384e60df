//! Ship designs and their derived stats.

use serde::{Deserialize, Serialize};

use crate::cost::Cost;
use crate::error::{GameError, Result};
use crate::player::PlayerNum;
use crate::race::{Race, ShipDesignPurpose};
use crate::tech::{
    names, ComponentCategory, Engine, HullSlotType, Stargate, TechCatalog, TechHull,
    TechHullComponent, TechLevel,
};

/// Parts placed in one hull slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipDesignSlot {
    /// Index into the hull's slot list.
    pub hull_slot_index: usize,
    /// Part name.
    pub component: String,
    /// Number of parts in the slot.
    pub quantity: i32,
}

/// A player's ship or starbase design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipDesign {
    /// Number, unique per player, starting at 1.
    pub num: u32,
    /// Owner.
    pub player_num: PlayerNum,
    /// Display name.
    pub name: String,
    /// Hull name.
    pub hull: String,
    /// Filled slots.
    pub slots: Vec<ShipDesignSlot>,
    /// What the design was made for.
    pub purpose: Option<ShipDesignPurpose>,
    /// Derived stats.
    pub spec: ShipDesignSpec,
}

/// Stats derived from a design's hull and parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipDesignSpec {
    /// Cost of one ship.
    pub cost: Cost,
    /// Mass of one empty ship.
    pub mass: i32,
    /// Armor.
    pub armor: i32,
    /// Shields.
    pub shield: i32,
    /// Fuel capacity.
    pub fuel_capacity: i32,
    /// Cargo capacity.
    pub cargo_capacity: i32,
    /// Engine, if the design has one.
    pub engine: Option<Engine>,
    /// Has at least one scanner part.
    pub scanner: bool,
    /// Normal scan range.
    pub scan_range: i32,
    /// Penetrating scan range.
    pub scan_range_pen: i32,
    /// Cloak percent.
    pub cloak_percent: i32,
    /// Percent by which the design reduces enemy cloaking.
    pub reduce_cloaking: i32,
    /// Carries a colonization module.
    pub colonizer: bool,
    /// Scanner can see fleet cargo.
    pub can_steal_fleet_cargo: bool,
    /// Scanner can see planet cargo.
    pub can_steal_planet_cargo: bool,
    /// Starbase hull.
    pub starbase: bool,
    /// Space dock size of a starbase.
    pub space_dock: i32,
    /// Stargate of a starbase.
    pub stargate: Option<Stargate>,
}

impl ShipDesignSpec {
    /// Derive stats from a hull and parts.
    pub fn compute(
        hull_name: &str,
        slots: &[ShipDesignSlot],
        catalog: &dyn TechCatalog,
    ) -> Result<Self> {
        let hull = catalog
            .hull(hull_name)
            .ok_or_else(|| GameError::InvalidState(format!("unknown hull '{hull_name}'")))?;

        let mut spec = Self {
            cost: hull.cost,
            mass: hull.mass,
            armor: hull.armor,
            fuel_capacity: hull.fuel_capacity,
            cargo_capacity: hull.cargo_capacity,
            starbase: hull.starbase,
            space_dock: hull.space_dock,
            ..Self::default()
        };

        let mut cloak_units = 0;
        for slot in slots {
            let component = catalog.component(&slot.component).ok_or_else(|| {
                GameError::InvalidState(format!("unknown component '{}'", slot.component))
            })?;
            let qty = slot.quantity;
            spec.cost += component.cost * qty;
            spec.mass += component.mass * qty;
            spec.armor += component.armor * qty;
            spec.shield += component.shield * qty;
            spec.fuel_capacity += component.fuel_bonus * qty;
            spec.cargo_capacity += component.cargo_bonus * qty;
            spec.reduce_cloaking += component.reduce_cloaking * qty;
            cloak_units += component.cloak_percent * qty;

            if let Some(engine) = component.engine {
                spec.engine = Some(engine);
            }
            if component.category == Some(ComponentCategory::Scanner) {
                spec.scanner = true;
                spec.scan_range = spec.scan_range.max(component.scan_range);
                spec.scan_range_pen = spec.scan_range_pen.max(component.scan_range_pen);
            }
            spec.colonizer |= component.colonization_module;
            spec.can_steal_fleet_cargo |= component.can_steal_fleet_cargo;
            spec.can_steal_planet_cargo |= component.can_steal_planet_cargo;
            if component.gate.is_some() {
                spec.stargate = component.gate;
            }
        }
        spec.cloak_percent = cloak_units.min(95);

        Ok(spec)
    }

    /// Fastest efficient warp of the design, 0 for engineless hulls.
    #[must_use]
    pub fn ideal_speed(&self) -> i32 {
        self.engine.map_or(0, |e| e.ideal_speed)
    }
}

impl ShipDesign {
    /// Design a ship for a purpose from the best parts available.
    ///
    /// Every slot is filled to capacity with the part that best serves the
    /// purpose; slots with nothing suitable stay empty.
    pub fn for_purpose(
        num: u32,
        player_num: PlayerNum,
        name: &str,
        hull_name: &str,
        purpose: ShipDesignPurpose,
        race: &Race,
        levels: &TechLevel,
        catalog: &dyn TechCatalog,
    ) -> Result<Self> {
        let hull = catalog
            .hull(hull_name)
            .ok_or_else(|| GameError::InvalidState(format!("unknown hull '{hull_name}'")))?;

        let slots = fill_slots(hull, purpose, race, levels, catalog);
        let spec = ShipDesignSpec::compute(hull_name, &slots, catalog)?;

        Ok(Self {
            num,
            player_num,
            name: name.to_string(),
            hull: hull_name.to_string(),
            slots,
            purpose: Some(purpose),
            spec,
        })
    }

    /// Recompute the derived stats.
    pub fn compute_spec(&mut self, catalog: &dyn TechCatalog) -> Result<()> {
        self.spec = ShipDesignSpec::compute(&self.hull, &self.slots, catalog)?;
        Ok(())
    }
}

fn fill_slots(
    hull: &TechHull,
    purpose: ShipDesignPurpose,
    race: &Race,
    levels: &TechLevel,
    catalog: &dyn TechCatalog,
) -> Vec<ShipDesignSlot> {
    let usable = |name: &'static str| usable_component(catalog, name, race, levels);
    let armor = catalog.best_armor(race, levels);
    let shield = catalog.best_shield(race, levels);
    let scanner = catalog.best_scanner(race, levels);

    let mut slots = Vec::new();
    for (index, hull_slot) in hull.slots.iter().enumerate() {
        let choice: Option<&TechHullComponent> = match hull_slot.slot_type {
            HullSlotType::Engine => catalog.best_engine(race, levels),
            HullSlotType::Scanner => scanner,
            HullSlotType::Armor => armor,
            HullSlotType::Shield => shield,
            HullSlotType::ShieldArmor => match purpose {
                ShipDesignPurpose::Starbase | ShipDesignPurpose::Fort => shield.or(armor),
                _ => armor.or(shield),
            },
            HullSlotType::Mechanical => match purpose {
                ShipDesignPurpose::Colonizer => usable(names::COLONIZATION_MODULE),
                ShipDesignPurpose::Freighter => usable(names::CARGO_POD),
                _ => usable(names::FUEL_TANK),
            },
            HullSlotType::ScannerElectricalMechanical => match purpose {
                ShipDesignPurpose::Freighter => usable(names::CARGO_POD),
                _ => scanner,
            },
            HullSlotType::Orbital => match purpose {
                ShipDesignPurpose::Starbase => usable(names::STARGATE),
                _ => None,
            },
            HullSlotType::General => match purpose {
                ShipDesignPurpose::Scout => usable(names::FUEL_TANK),
                ShipDesignPurpose::Colonizer => usable(names::COLONIZATION_MODULE),
                _ => armor,
            },
        };

        if let Some(component) = choice {
            let quantity = if hull_slot.slot_type == HullSlotType::Engine {
                hull_slot.capacity.max(1)
            } else {
                hull_slot.capacity
            };
            slots.push(ShipDesignSlot {
                hull_slot_index: index,
                component: component.name.clone(),
                quantity,
            });
        }
    }
    slots
}

fn usable_component<'a>(
    catalog: &'a dyn TechCatalog,
    name: &str,
    race: &Race,
    levels: &TechLevel,
) -> Option<&'a TechHullComponent> {
    catalog
        .component(name)
        .filter(|c| c.requirements.available_to(race, levels))
}
