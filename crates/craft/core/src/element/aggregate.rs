//! Element Aggregator.
//!
//! Pure function from the raw element multiset and the ordered rule list to an
//! [`ElementProfile`]. Per rule the calculation order is:
//!
//! ```text
//! select (multi_value) → mod (plus/minus, nonzero only) → clamp → visibility
//! ```
//!
//! Each raw element belongs to the first rule that claims its id. Elements no
//! rule claims are grouped, summed and kept in the usable list only.

use std::collections::{BTreeMap, BTreeSet};

use super::rule::{ElementAggregationRule, MultiShow, MultiValue, Shape};
use super::{Element, ElementProfile, ShownElement, first_per_id};

/// Whether placeholders for unmatched rules are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregationMode {
    /// Normal crafting refresh.
    #[default]
    Craft,
    /// Editing a recipe: every rule is visible, even with nothing matched.
    Edit,
}

/// Aggregates raw elements into a usable and displayable profile.
///
/// `raw` must be in encounter order (slot order, then element order within an
/// item); ties in `only-max` / `only-min` selection go to the first encountered
/// element.
pub fn aggregate(
    raw: &[Element],
    rules: &[ElementAggregationRule],
    mode: AggregationMode,
) -> ElementProfile {
    if rules.is_empty() {
        let elements = group_by_id(raw.iter());
        let shown = elements
            .iter()
            .map(|element| ShownElement {
                element: element.clone(),
                shape: Shape::default(),
                size: 100,
            })
            .collect();
        return finish(elements, Vec::new(), shown);
    }

    let mut claimed: Vec<Vec<&Element>> = vec![Vec::new(); rules.len()];
    let mut unclaimed = Vec::new();
    for element in raw {
        match rules.iter().position(|rule| rule.claims(&element.id)) {
            Some(index) => claimed[index].push(element),
            None => unclaimed.push(element),
        }
    }

    let mut elements = Vec::new();
    let mut expanded = Vec::new();
    let mut shown = Vec::new();

    for (rule, matches) in rules.iter().zip(&claimed) {
        if matches.is_empty() {
            let placeholder = rule_identity(rule, 0);
            if mode == AggregationMode::Edit {
                elements.push(placeholder.clone());
                shown.push(show(rule, placeholder));
            } else if rule.visibility.shows(0) {
                shown.push(show(rule, placeholder));
            }
            continue;
        }

        let (identity, base) = select(rule, matches);

        let modifier = sum_of(raw, &rule.plus_ids) - sum_of(raw, &rule.minus_ids);
        let mut num = base;
        if num != 0 {
            num += modifier;
        }
        num = rule.clamp(num);

        if rule.multi_value == MultiValue::All && matches.len() > 1 {
            expanded.extend(matches.iter().map(|&element| element.clone()));
        }

        let element = identity.with_num(num);
        if mode == AggregationMode::Edit || rule.visibility.shows(num) {
            shown.push(show(rule, element.clone()));
        }
        elements.push(element);
    }

    elements.extend(group_by_id(unclaimed.into_iter()));

    finish(elements, expanded, shown)
}

/// Picks the displayed identity and the combined quantity of a rule's matches.
fn select(rule: &ElementAggregationRule, matches: &[&Element]) -> (Element, i32) {
    let max = first_by(matches, |candidate, best| candidate > best);
    let min = first_by(matches, |candidate, best| candidate < best);
    let total: i32 = matches.iter().map(|e| e.num).sum();

    let quantity = match rule.multi_value {
        MultiValue::All => total,
        MultiValue::OnlyMax => max.num,
        MultiValue::OnlyMin => min.num,
        MultiValue::MaxPlus => max.num + (total - max.num),
        MultiValue::MaxMinus => max.num - (total - max.num),
        MultiValue::MinPlus => min.num + (total - min.num),
        MultiValue::MinMinus => min.num - (total - min.num),
    };

    let identity = match rule.multi_show {
        MultiShow::Default => rule_identity(rule, quantity),
        MultiShow::Max => max.clone(),
        MultiShow::Min => min.clone(),
    };

    (identity, quantity)
}

/// First element whose quantity beats every earlier one under `better`.
fn first_by<'a>(matches: &[&'a Element], better: impl Fn(i32, i32) -> bool) -> &'a Element {
    let mut best = matches[0];
    for &candidate in &matches[1..] {
        if better(candidate.num, best.num) {
            best = candidate;
        }
    }
    best
}

fn rule_identity(rule: &ElementAggregationRule, num: i32) -> Element {
    Element {
        id: rule.id.clone(),
        name: rule.name.clone(),
        img: rule.img.clone(),
        color: rule.color.clone(),
        num,
    }
}

fn show(rule: &ElementAggregationRule, element: Element) -> ShownElement {
    ShownElement {
        size: rule.size_of(element.num),
        shape: rule.shape,
        element,
    }
}

fn sum_of(raw: &[Element], ids: &BTreeSet<String>) -> i32 {
    if ids.is_empty() {
        return 0;
    }
    raw.iter()
        .filter(|element| ids.contains(&element.id))
        .map(|element| element.num)
        .sum()
}

/// Groups by id in first-encounter order, summing quantities.
fn group_by_id<'a>(elements: impl Iterator<Item = &'a Element>) -> Vec<Element> {
    let mut grouped: Vec<Element> = Vec::new();
    for element in elements {
        match grouped.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => existing.num += element.num,
            None => grouped.push(element.clone()),
        }
    }
    grouped
}

/// `expanded` holds the raw matches listed by `all` rules; they never shadow a
/// rule result in lookups.
fn finish(
    mut elements: Vec<Element>,
    expanded: Vec<Element>,
    mut shown: Vec<ShownElement>,
) -> ElementProfile {
    let quantities = first_per_id(&expanded, first_per_id(&elements, BTreeMap::new()));
    elements.extend(expanded);
    // Stable: equal quantities keep their encounter order.
    elements.sort_by(|a, b| b.num.cmp(&a.num));
    shown.sort_by(|a, b| b.element.num.cmp(&a.element.num));
    ElementProfile {
        elements,
        shown,
        quantities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Visibility;

    fn raw(pairs: &[(&str, i32)]) -> Vec<Element> {
        pairs.iter().map(|(id, num)| Element::new(*id, *num)).collect()
    }

    fn ids(profile: &ElementProfile) -> Vec<(&str, i32)> {
        profile
            .elements
            .iter()
            .map(|e| (e.id.as_str(), e.num))
            .collect()
    }

    #[test]
    fn rule_free_groups_and_sorts() {
        let input = raw(&[("water", 1), ("fire", 2), ("earth", 4), ("fire", 3)]);
        let profile = aggregate(&input, &[], AggregationMode::Craft);

        assert_eq!(ids(&profile), vec![("fire", 5), ("earth", 4), ("water", 1)]);
        assert_eq!(profile.shown.len(), 3);
        assert!(profile.shown.iter().all(|s| s.size == 100));
    }

    #[test]
    fn rule_free_is_idempotent() {
        let input = raw(&[("a", 1), ("b", 7), ("a", 2), ("c", -1), ("b", 1)]);
        let once = aggregate(&input, &[], AggregationMode::Craft);
        let twice = aggregate(&once.elements, &[], AggregationMode::Craft);
        assert_eq!(once, twice);
    }

    #[test]
    fn all_sums_and_lists_every_match() {
        let rule = ElementAggregationRule::new("heat", ["fire", "lava"]).plus(["sun"]);
        let input = raw(&[("fire", 2), ("lava", 3), ("sun", 1)]);
        let profile = aggregate(&input, &[rule], AggregationMode::Craft);

        // 2 + 3 + mod(1)
        assert_eq!(profile.quantity("heat"), 6);
        assert_eq!(profile.get("fire"), Some(2));
        assert_eq!(profile.get("lava"), Some(3));
        // "sun" is unclaimed and passes through
        assert_eq!(profile.get("sun"), Some(1));
        assert_eq!(profile.shown.len(), 1);
    }

    #[test]
    fn only_max_adds_mod_only_when_nonzero() {
        let rule = ElementAggregationRule::new("heat", ["fire", "lava"])
            .multi_value(MultiValue::OnlyMax)
            .minus(["ice"]);

        let input = raw(&[("fire", 2), ("lava", 5), ("ice", 1)]);
        let profile = aggregate(&input, &[rule.clone()], AggregationMode::Craft);
        assert_eq!(profile.quantity("heat"), 4);
        // Only the representative is listed, not the raw matches.
        assert_eq!(profile.get("fire"), None);

        let zero = raw(&[("fire", 0), ("lava", 0), ("ice", 3)]);
        let profile = aggregate(&zero, &[rule], AggregationMode::Craft);
        assert_eq!(profile.quantity("heat"), 0);
    }

    #[test]
    fn max_and_min_variants() {
        let input = raw(&[("a", 4), ("b", 1), ("c", 2)]);
        let cases = [
            (MultiValue::OnlyMin, 1),
            (MultiValue::MaxPlus, 7),
            (MultiValue::MaxMinus, 1),
            (MultiValue::MinPlus, 7),
            (MultiValue::MinMinus, -5),
        ];
        for (multi_value, expected) in cases {
            let rule = ElementAggregationRule::new("mix", ["a", "b", "c"]).multi_value(multi_value);
            let profile = aggregate(&input, &[rule], AggregationMode::Craft);
            assert_eq!(profile.quantity("mix"), expected, "{multi_value}");
        }
    }

    #[test]
    fn multi_show_picks_identity_with_first_encounter_ties() {
        let input = vec![
            Element::new("ember", 3).named("Ember"),
            Element::new("blaze", 3).named("Blaze"),
            Element::new("spark", 1).named("Spark"),
        ];
        let rule = ElementAggregationRule::new("fire", ["ember", "blaze", "spark"])
            .multi_value(MultiValue::OnlyMax)
            .multi_show(MultiShow::Max);
        let profile = aggregate(&input, &[rule.clone()], AggregationMode::Craft);
        assert_eq!(profile.elements[0].name, "Ember");
        assert_eq!(profile.elements[0].num, 3);

        let rule = rule.multi_show(MultiShow::Min);
        let profile = aggregate(&input, &[rule], AggregationMode::Craft);
        assert_eq!(profile.elements[0].name, "Spark");
        assert_eq!(profile.elements[0].num, 3);
    }

    #[test]
    fn first_rule_claims_shared_ids() {
        let first = ElementAggregationRule::new("first", ["fire"]);
        let second = ElementAggregationRule::new("second", ["fire", "water"])
            .visibility(Visibility::Always);
        let input = raw(&[("fire", 2), ("water", 1)]);
        let profile = aggregate(&input, &[first, second], AggregationMode::Craft);

        assert_eq!(profile.quantity("first"), 2);
        assert_eq!(profile.quantity("second"), 1);
    }

    #[test]
    fn listed_matches_never_shadow_the_clamped_result() {
        let rule = ElementAggregationRule::new("fire", ["fire", "lava"]).max(2);
        let input = raw(&[("fire", 3), ("lava", 2)]);
        let profile = aggregate(&input, &[rule], AggregationMode::Craft);

        assert_eq!(ids(&profile), vec![("fire", 3), ("fire", 2), ("lava", 2)]);
        assert_eq!(profile.get("fire"), Some(2));
        assert_eq!(profile.get("lava"), Some(2));
        assert_eq!(profile.shown[0].element.num, 2);
    }

    #[test]
    fn clamp_applies_after_mod() {
        let rule = ElementAggregationRule::new("heat", ["fire"])
            .plus(["sun"])
            .max(4);
        let input = raw(&[("fire", 3), ("sun", 5)]);
        let profile = aggregate(&input, &[rule], AggregationMode::Craft);
        assert_eq!(profile.quantity("heat"), 4);
    }

    #[test]
    fn unmatched_rules_produce_placeholders_by_mode() {
        let always = ElementAggregationRule::new("always", ["x"]);
        let positive =
            ElementAggregationRule::new("positive", ["y"]).visibility(Visibility::WhenPositive);
        let rules = [always, positive];

        let craft = aggregate(&[], &rules, AggregationMode::Craft);
        assert!(craft.elements.is_empty());
        assert_eq!(craft.shown.len(), 1);
        assert_eq!(craft.shown[0].element.id, "always");

        let edit = aggregate(&[], &rules, AggregationMode::Edit);
        assert_eq!(edit.elements.len(), 2);
        assert_eq!(edit.shown.len(), 2);
        assert!(edit.elements.iter().all(|e| e.num == 0));
    }

    #[test]
    fn visibility_filters_display_only() {
        let hidden = ElementAggregationRule::new("hidden", ["a"]).visibility(Visibility::Never);
        let non_positive = ElementAggregationRule::new("cold", ["b"])
            .visibility(Visibility::WhenNonPositive);
        let input = raw(&[("a", 3), ("b", -2)]);
        let profile = aggregate(&input, &[hidden, non_positive], AggregationMode::Craft);

        assert_eq!(profile.quantity("hidden"), 3);
        assert_eq!(profile.quantity("cold"), -2);
        assert_eq!(profile.shown.len(), 1);
        assert_eq!(profile.shown[0].element.id, "cold");
    }

    #[test]
    fn output_is_sorted_descending() {
        let a = ElementAggregationRule::new("a", ["a"]);
        let b = ElementAggregationRule::new("b", ["b"]);
        let input = raw(&[("a", 1), ("b", 9), ("loose", 4)]);
        let profile = aggregate(&input, &[a, b], AggregationMode::Craft);
        assert_eq!(ids(&profile), vec![("b", 9), ("loose", 4), ("a", 1)]);
        assert_eq!(profile.shown[0].element.id, "b");
    }
}
