//! Costs, minerals and cargo.
//!
//! Every buildable has a four-dimensional [`Cost`]: three minerals plus the
//! abstract "resources" produced by population and factories. Planets and
//! fleets carry [`Cargo`]; population is stored as colonist kilotons.
//!
//! All calculations use integer math.

use serde::{Deserialize, Serialize};

/// Which of the three minerals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MineralType {
    /// Ironium.
    Ironium,
    /// Boranium.
    Boranium,
    /// Germanium.
    Germanium,
}

impl MineralType {
    /// All minerals in storage order.
    pub const ALL: [Self; 3] = [Self::Ironium, Self::Boranium, Self::Germanium];
}

/// An amount of each mineral (also used for concentrations and mine progress).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Mineral {
    /// Ironium.
    pub ironium: i32,
    /// Boranium.
    pub boranium: i32,
    /// Germanium.
    pub germanium: i32,
}

impl Mineral {
    /// Create a new mineral amount.
    #[must_use]
    pub const fn new(ironium: i32, boranium: i32, germanium: i32) -> Self {
        Self {
            ironium,
            boranium,
            germanium,
        }
    }

    /// Same amount of every mineral.
    #[must_use]
    pub const fn splat(amount: i32) -> Self {
        Self::new(amount, amount, amount)
    }

    /// Amount of one mineral.
    #[must_use]
    pub const fn get(&self, mineral: MineralType) -> i32 {
        match mineral {
            MineralType::Ironium => self.ironium,
            MineralType::Boranium => self.boranium,
            MineralType::Germanium => self.germanium,
        }
    }

    /// Mutable amount of one mineral.
    pub fn get_mut(&mut self, mineral: MineralType) -> &mut i32 {
        match mineral {
            MineralType::Ironium => &mut self.ironium,
            MineralType::Boranium => &mut self.boranium,
            MineralType::Germanium => &mut self.germanium,
        }
    }

    /// Sum of all three minerals.
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.ironium + self.boranium + self.germanium
    }
}

impl std::ops::Add for Mineral {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.ironium + rhs.ironium,
            self.boranium + rhs.boranium,
            self.germanium + rhs.germanium,
        )
    }
}

impl std::ops::AddAssign for Mineral {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Cost of one unit of something buildable, or an amount of available funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cost {
    /// Ironium.
    pub ironium: i32,
    /// Boranium.
    pub boranium: i32,
    /// Germanium.
    pub germanium: i32,
    /// Resources.
    pub resources: i32,
}

impl Cost {
    /// Zero cost.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create a new cost.
    #[must_use]
    pub const fn new(ironium: i32, boranium: i32, germanium: i32, resources: i32) -> Self {
        Self {
            ironium,
            boranium,
            germanium,
            resources,
        }
    }

    /// Minerals plus resources as one cost.
    #[must_use]
    pub const fn from_minerals(minerals: Mineral, resources: i32) -> Self {
        Self::new(
            minerals.ironium,
            minerals.boranium,
            minerals.germanium,
            resources,
        )
    }

    /// The mineral part of the cost.
    #[must_use]
    pub const fn minerals(&self) -> Mineral {
        Mineral::new(self.ironium, self.boranium, self.germanium)
    }

    /// The four dimensions in a fixed order.
    #[must_use]
    pub const fn dims(&self) -> [i32; 4] {
        [self.ironium, self.boranium, self.germanium, self.resources]
    }

    const fn from_dims(d: [i32; 4]) -> Self {
        Self::new(d[0], d[1], d[2], d[3])
    }

    /// True if every dimension is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.ironium == 0 && self.boranium == 0 && self.germanium == 0 && self.resources == 0
    }

    /// Dimension-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.ironium.min(other.ironium),
            self.boranium.min(other.boranium),
            self.germanium.min(other.germanium),
            self.resources.min(other.resources),
        )
    }

    /// Clamp every dimension to be non-negative.
    #[must_use]
    pub fn clamp_non_negative(self) -> Self {
        Self::new(
            self.ironium.max(0),
            self.boranium.max(0),
            self.germanium.max(0),
            self.resources.max(0),
        )
    }

    /// Scale by a whole-number percentage, rounding down.
    #[must_use]
    pub fn percent(self, percent: i32) -> Self {
        let scale = |v: i32| (i64::from(v) * i64::from(percent) / 100) as i32;
        Self::new(
            scale(self.ironium),
            scale(self.boranium),
            scale(self.germanium),
            scale(self.resources),
        )
    }
}

impl std::ops::Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.ironium + rhs.ironium,
            self.boranium + rhs.boranium,
            self.germanium + rhs.germanium,
            self.resources + rhs.resources,
        )
    }
}

impl std::ops::Sub for Cost {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(
            self.ironium - rhs.ironium,
            self.boranium - rhs.boranium,
            self.germanium - rhs.germanium,
            self.resources - rhs.resources,
        )
    }
}

impl std::ops::AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::SubAssign for Cost {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl std::ops::Mul<i32> for Cost {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Self::new(
            self.ironium * rhs,
            self.boranium * rhs,
            self.germanium * rhs,
            self.resources * rhs,
        )
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}i {}b {}g {}r",
            self.ironium, self.boranium, self.germanium, self.resources
        )
    }
}

/// How many whole units of `cost` fit into `available`.
///
/// The scarcest dimension binds. Zero-cost dimensions are skipped; a
/// completely free item is limited only by the caller (returns `i32::MAX`).
#[must_use]
pub fn num_buildable(available: Cost, cost: Cost) -> i32 {
    available
        .dims()
        .iter()
        .zip(cost.dims().iter())
        .filter(|(_, &c)| c > 0)
        .map(|(&a, &c)| if a <= 0 { 0 } else { a / c })
        .min()
        .unwrap_or(i32::MAX)
}

/// Fund as much of `remaining_cost` as `available` allows, proportionally.
///
/// The funded fraction is the smallest `available / remaining` ratio over the
/// dimensions that still need funding (zero-need dimensions count as fully
/// funded). Every dimension of `remaining_cost` is scaled by that fraction and
/// rounded down, so no dimension ever exceeds what is available and progress
/// tracks the scarcest resource.
#[must_use]
pub fn allocate_partial_build(remaining_cost: Cost, available: Cost) -> Cost {
    let need = remaining_cost.clamp_non_negative().dims();
    let have = available.clamp_non_negative().dims();

    // Smallest have/need ratio, kept as an exact fraction (num, den).
    let mut ratio: Option<(i64, i64)> = None;
    for (&h, &n) in have.iter().zip(need.iter()) {
        if n == 0 {
            continue;
        }
        let candidate = (i64::from(h), i64::from(n));
        ratio = match ratio {
            Some((num, den)) if num * candidate.1 <= candidate.0 * den => Some((num, den)),
            _ => Some(candidate),
        };
    }

    let Some((num, den)) = ratio else {
        return Cost::ZERO;
    };
    if num >= den {
        return Cost::from_dims(need);
    }

    let mut allocated = [0; 4];
    for (slot, &n) in allocated.iter_mut().zip(need.iter()) {
        *slot = (i64::from(n) * num / den) as i32;
    }
    Cost::from_dims(allocated)
}

/// Cargo held by a planet or fleet, in kilotons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cargo {
    /// Ironium.
    pub ironium: i32,
    /// Boranium.
    pub boranium: i32,
    /// Germanium.
    pub germanium: i32,
    /// Colonists, one kiloton per 100 people.
    pub colonists: i32,
}

/// Kinds of cargo a transport order can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CargoType {
    /// Ironium.
    Ironium,
    /// Boranium.
    Boranium,
    /// Germanium.
    Germanium,
    /// Colonists.
    Colonists,
}

impl CargoType {
    /// All cargo kinds in storage order.
    pub const ALL: [Self; 4] = [
        Self::Ironium,
        Self::Boranium,
        Self::Germanium,
        Self::Colonists,
    ];
}

impl Cargo {
    /// Create new cargo.
    #[must_use]
    pub const fn new(ironium: i32, boranium: i32, germanium: i32, colonists: i32) -> Self {
        Self {
            ironium,
            boranium,
            germanium,
            colonists,
        }
    }

    /// Cargo containing only colonists.
    #[must_use]
    pub const fn with_colonists(colonists: i32) -> Self {
        Self::new(0, 0, 0, colonists)
    }

    /// Total mass in kilotons.
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.ironium + self.boranium + self.germanium + self.colonists
    }

    /// Mineral part of the cargo.
    #[must_use]
    pub const fn minerals(&self) -> Mineral {
        Mineral::new(self.ironium, self.boranium, self.germanium)
    }

    /// Population represented by the colonists aboard.
    #[must_use]
    pub const fn population(&self) -> i32 {
        self.colonists * 100
    }

    /// Amount of one cargo kind.
    #[must_use]
    pub const fn get(&self, kind: CargoType) -> i32 {
        match kind {
            CargoType::Ironium => self.ironium,
            CargoType::Boranium => self.boranium,
            CargoType::Germanium => self.germanium,
            CargoType::Colonists => self.colonists,
        }
    }

    /// Mutable amount of one cargo kind.
    pub fn get_mut(&mut self, kind: CargoType) -> &mut i32 {
        match kind {
            CargoType::Ironium => &mut self.ironium,
            CargoType::Boranium => &mut self.boranium,
            CargoType::Germanium => &mut self.germanium,
            CargoType::Colonists => &mut self.colonists,
        }
    }

    /// Add minerals to the cargo.
    pub fn add_minerals(&mut self, minerals: Mineral) {
        self.ironium += minerals.ironium;
        self.boranium += minerals.boranium;
        self.germanium += minerals.germanium;
    }

    /// Remove the mineral part of a cost from the cargo.
    pub fn spend(&mut self, cost: Cost) {
        self.ironium -= cost.ironium;
        self.boranium -= cost.boranium;
        self.germanium -= cost.germanium;
    }
}

impl std::ops::Add for Cargo {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.ironium + rhs.ironium,
            self.boranium + rhs.boranium,
            self.germanium + rhs.germanium,
            self.colonists + rhs.colonists,
        )
    }
}

impl std::ops::AddAssign for Cargo {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
