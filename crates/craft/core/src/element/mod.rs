//! Element tags and their aggregated profile.
//!
//! Items placed in input slots carry [`Element`]s. The aggregator combines the
//! raw multiset according to the recipe's [`ElementAggregationRule`]s into an
//! [`ElementProfile`]: a full-value list used by eligibility and budget logic,
//! and a display projection filtered by rule visibility.

mod aggregate;
mod rule;

use std::collections::BTreeMap;

pub use aggregate::{AggregationMode, aggregate};
pub use rule::{ElementAggregationRule, MultiShow, MultiValue, Shape, Visibility};

/// A tagged quantity contributed by a single input item.
///
/// `id` is the matching identity. Distinct ids may share `name` and `img` to
/// build disguised variants of the same visible element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Element {
    pub id: String,
    pub name: String,
    pub img: String,
    pub color: String,
    pub num: i32,
}

impl Element {
    pub fn new(id: impl Into<String>, num: i32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            num,
            ..Self::default()
        }
    }

    /// Sets the display name (builder pattern).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a copy carrying a different quantity.
    #[must_use]
    pub fn with_num(&self, num: i32) -> Self {
        Self {
            num,
            ..self.clone()
        }
    }
}

/// A displayed element annotated with its rule's shape and a `0..=100` size.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShownElement {
    pub element: Element,
    pub shape: Shape,
    pub size: u8,
}

/// Output of the Element Aggregator.
///
/// Both lists are sorted descending by quantity. `elements` may hold the same
/// id more than once when a rule uses [`MultiValue::All`]: the rule's result
/// and the raw matches it lists. Lookups always read the rule's result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementProfile {
    pub elements: Vec<Element>,
    pub shown: Vec<ShownElement>,
    #[cfg_attr(feature = "serde", serde(default))]
    quantities: BTreeMap<String, i32>,
}

impl ElementProfile {
    /// Builds a profile whose lookups read the first entry per id.
    pub fn new(elements: Vec<Element>, shown: Vec<ShownElement>) -> Self {
        let quantities = first_per_id(&elements, BTreeMap::new());
        Self {
            elements,
            shown,
            quantities,
        }
    }

    /// Quantity of `id`, if present.
    pub fn get(&self, id: &str) -> Option<i32> {
        self.quantities.get(id).copied()
    }

    /// Quantity of `id`, treating a missing element as zero.
    pub fn quantity(&self, id: &str) -> i32 {
        self.get(id).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn first_per_id(
    elements: &[Element],
    mut quantities: BTreeMap<String, i32>,
) -> BTreeMap<String, i32> {
    for element in elements {
        quantities.entry(element.id.clone()).or_insert(element.num);
    }
    quantities
}
