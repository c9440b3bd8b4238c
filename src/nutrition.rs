use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A quantity of food energy with its macronutrient breakdown.
///
/// The feeding balance operates on kilocalories only; fat and protein ride
/// along so that used-feed series keep the full breakdown for the supply
/// model downstream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientQuantity {
    pub kcals: f64,
    pub fat_g: f64,
    pub protein_g: f64,
}

impl NutrientQuantity {
    pub const ZERO: Self = Self {
        kcals: 0.0,
        fat_g: 0.0,
        protein_g: 0.0,
    };

    pub fn new(kcals: f64, fat_g: f64, protein_g: f64) -> Self {
        Self {
            kcals,
            fat_g,
            protein_g,
        }
    }

    /// An energy-only quantity, used where the scenario gives bare kcals.
    pub fn from_kcals(kcals: f64) -> Self {
        Self {
            kcals,
            fat_g: 0.0,
            protein_g: 0.0,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            kcals: self.kcals * factor,
            fat_g: self.fat_g * factor,
            protein_g: self.protein_g * factor,
        }
    }

    /// Component-wise subtraction clamped at zero.
    pub fn saturating_sub(self, other: Self) -> Self {
        Self {
            kcals: (self.kcals - other.kcals).max(0.0),
            fat_g: (self.fat_g - other.fat_g).max(0.0),
            protein_g: (self.protein_g - other.protein_g).max(0.0),
        }
    }

    pub fn clamp_non_negative(&mut self) {
        self.kcals = self.kcals.max(0.0);
        self.fat_g = self.fat_g.max(0.0);
        self.protein_g = self.protein_g.max(0.0);
    }

    pub fn is_zero(&self) -> bool {
        self.kcals == 0.0 && self.fat_g == 0.0 && self.protein_g == 0.0
    }
}

impl Add for NutrientQuantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            kcals: self.kcals + rhs.kcals,
            fat_g: self.fat_g + rhs.fat_g,
            protein_g: self.protein_g + rhs.protein_g,
        }
    }
}

impl AddAssign for NutrientQuantity {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for NutrientQuantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            kcals: self.kcals - rhs.kcals,
            fat_g: self.fat_g - rhs.fat_g,
            protein_g: self.protein_g - rhs.protein_g,
        }
    }
}

impl SubAssign for NutrientQuantity {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// The two feed classes the allocator distributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedClass {
    Grass,
    Feed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_component_wise() {
        let a = NutrientQuantity::new(100.0, 10.0, 5.0);
        let b = NutrientQuantity::new(40.0, 4.0, 1.0);
        let sum = a + b;
        assert_eq!(sum.kcals, 140.0);
        assert_eq!(sum.fat_g, 14.0);
        assert_eq!(sum.protein_g, 6.0);
        let diff = a - b;
        assert_eq!(diff.kcals, 60.0);
        assert_eq!(diff.protein_g, 4.0);
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let a = NutrientQuantity::new(10.0, 0.0, 0.0);
        let b = NutrientQuantity::new(25.0, 1.0, 0.0);
        let diff = a.saturating_sub(b);
        assert_eq!(diff.kcals, 0.0);
        assert_eq!(diff.fat_g, 0.0);
    }

    #[test]
    fn scaled_multiplies_every_component() {
        let a = NutrientQuantity::new(100.0, 10.0, 5.0).scaled(0.5);
        assert_eq!(a.kcals, 50.0);
        assert_eq!(a.fat_g, 5.0);
        assert_eq!(a.protein_g, 2.5);
    }
}
