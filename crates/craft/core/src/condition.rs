//! Restricted unlock-condition language.
//!
//! Conditions cover the common unlock predicates (thresholds on elements and
//! materials, filled slots, boolean combinators) without executing
//! user-authored code. Anything they can not express goes through a script
//! extension point instead.
//!
//! ## Examples
//!
//! ```
//! # use craft_core::condition::Condition;
//! // Unlock once the mix holds at least 3 fire and no water.
//! let condition = Condition::All(vec![
//!     Condition::ElementAtLeast { id: "fire".into(), value: 3 },
//!     Condition::ElementAtMost { id: "water".into(), value: 0 },
//! ]);
//! # let _ = condition;
//! ```

use std::collections::BTreeSet;

use crate::element::ElementProfile;
use crate::requirement::MaterialCounts;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Condition {
    Always,
    Never,
    ElementAtLeast { id: String, value: i32 },
    ElementAtMost { id: String, value: i32 },
    MaterialAtLeast { id: String, value: i32 },
    MaterialAtMost { id: String, value: i32 },
    /// The input slot with this id currently holds an item.
    SlotFilled(String),
    /// True when every inner condition holds (true when empty).
    All(Vec<Condition>),
    /// True when any inner condition holds (false when empty).
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

/// Read-only view a condition is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct ConditionContext<'a> {
    pub profile: &'a ElementProfile,
    pub materials: &'a MaterialCounts,
    pub filled_slots: &'a BTreeSet<String>,
}

impl Condition {
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::ElementAtLeast { id, value } => ctx.profile.quantity(id) >= *value,
            Condition::ElementAtMost { id, value } => ctx.profile.quantity(id) <= *value,
            Condition::MaterialAtLeast { id, value } => material(ctx, id) >= *value,
            Condition::MaterialAtMost { id, value } => material(ctx, id) <= *value,
            Condition::SlotFilled(slot) => ctx.filled_slots.contains(slot),
            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),
            Condition::Not(inner) => !inner.evaluate(ctx),
        }
    }
}

fn material(ctx: &ConditionContext<'_>, id: &str) -> i32 {
    ctx.materials.get(id).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    #[test]
    fn combinators_follow_boolean_identities() {
        let profile = ElementProfile::default();
        let materials = MaterialCounts::new();
        let filled = BTreeSet::new();
        let ctx = ConditionContext {
            profile: &profile,
            materials: &materials,
            filled_slots: &filled,
        };

        assert!(Condition::All(vec![]).evaluate(&ctx));
        assert!(!Condition::Any(vec![]).evaluate(&ctx));
        assert!(Condition::Not(Box::new(Condition::Never)).evaluate(&ctx));
    }

    #[test]
    fn thresholds_read_profile_materials_and_slots() {
        let profile = ElementProfile::new(vec![Element::new("fire", 3)], vec![]);
        let mut materials = MaterialCounts::new();
        materials.insert("ash".into(), 2);
        let filled: BTreeSet<String> = ["catalyst".to_string()].into_iter().collect();
        let ctx = ConditionContext {
            profile: &profile,
            materials: &materials,
            filled_slots: &filled,
        };

        let unlock = Condition::All(vec![
            Condition::ElementAtLeast { id: "fire".into(), value: 3 },
            Condition::ElementAtMost { id: "water".into(), value: 0 },
            Condition::MaterialAtLeast { id: "ash".into(), value: 2 },
            Condition::SlotFilled("catalyst".into()),
        ]);
        assert!(unlock.evaluate(&ctx));

        let too_much_ash = Condition::MaterialAtMost { id: "ash".into(), value: 1 };
        assert!(!too_much_ash.evaluate(&ctx));
    }
}
