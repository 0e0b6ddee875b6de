//! Static ingredient requirements.
//!
//! A modifier without an unlock predicate is only eligible while every
//! threshold listed here holds against the current element profile and
//! material counts.

use std::collections::BTreeMap;

use crate::element::ElementProfile;

/// Quantity of each material key currently placed in the input slots.
pub type MaterialCounts = BTreeMap<String, i32>;

/// A per-id bound check. A missing quantity is treated as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Threshold {
    pub id: String,
    pub use_min: bool,
    pub min: i32,
    pub use_max: bool,
    pub max: i32,
}

impl Threshold {
    pub fn at_least(id: impl Into<String>, min: i32) -> Self {
        Self {
            id: id.into(),
            use_min: true,
            min,
            ..Self::default()
        }
    }

    pub fn at_most(id: impl Into<String>, max: i32) -> Self {
        Self {
            id: id.into(),
            use_max: true,
            max,
            ..Self::default()
        }
    }

    pub fn is_met(&self, current: Option<i32>) -> bool {
        let current = current.unwrap_or(0);
        if self.use_min && current < self.min {
            return false;
        }
        if self.use_max && current > self.max {
            return false;
        }
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IngredientRequirements {
    pub elements: Vec<Threshold>,
    pub materials: Vec<Threshold>,
}

impl IngredientRequirements {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.materials.is_empty()
    }

    pub fn is_met(&self, profile: &ElementProfile, materials: &MaterialCounts) -> bool {
        self.elements
            .iter()
            .all(|threshold| threshold.is_met(profile.get(&threshold.id)))
            && self
                .materials
                .iter()
                .all(|threshold| threshold.is_met(materials.get(&threshold.id).copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    #[test]
    fn missing_quantity_counts_as_zero() {
        assert!(!Threshold::at_least("fire", 1).is_met(None));
        assert!(Threshold::at_most("fire", 0).is_met(None));
    }

    #[test]
    fn requirements_check_elements_and_materials() {
        let profile = ElementProfile::new(vec![Element::new("fire", 3)], vec![]);
        let mut materials = MaterialCounts::new();
        materials.insert("iron-ingot".into(), 2);

        let requirements = IngredientRequirements {
            elements: vec![Threshold::at_least("fire", 2)],
            materials: vec![Threshold::at_least("iron-ingot", 2), Threshold::at_most("gold", 0)],
        };
        assert!(requirements.is_met(&profile, &materials));

        materials.insert("gold".into(), 1);
        assert!(!requirements.is_met(&profile, &materials));
    }
}
