//! Applying modifier changes to result drafts.

use tracing::debug;

use craft_core::{AppliesAs, ChangeMode, Modifier};

use super::ResultDraft;
use crate::repository::{EffectRecord, payload};

/// Applies one modifier's changes to every draft.
///
/// - `Effect`: one generated effect record per draft carrying the changes
/// - `Merge`: changes appended to the draft's effect named `effect_name`,
///   created on first use
/// - `Direct`: property patches on the draft's data
pub fn apply_modifier(modifier: &Modifier, effect_name: &str, drafts: &mut [ResultDraft]) {
    for draft in drafts.iter_mut() {
        match modifier.applies_as {
            AppliesAs::Effect => draft.item.effects.push(EffectRecord {
                name: modifier.name.clone(),
                origin: Some(modifier.id.clone()),
                changes: modifier.changes.clone(),
            }),
            AppliesAs::Merge => {
                let position = draft
                    .item
                    .effects
                    .iter()
                    .position(|effect| effect.name == effect_name);
                let index = match position {
                    Some(index) => index,
                    None => {
                        draft.item.effects.push(EffectRecord {
                            name: effect_name.to_string(),
                            origin: None,
                            changes: Vec::new(),
                        });
                        draft.item.effects.len() - 1
                    }
                };
                draft.item.effects[index]
                    .changes
                    .extend(modifier.changes.iter().cloned());
            }
            AppliesAs::Direct => patch(modifier, draft),
        }
    }
}

fn patch(modifier: &Modifier, draft: &mut ResultDraft) {
    for change in &modifier.changes {
        if !change.is_patchable() {
            debug!(
                target: "runtime::craft",
                modifier = %modifier.id,
                key = %change.key,
                "Skipping change with non-plain key"
            );
            continue;
        }
        if change.mode == ChangeMode::Custom {
            continue;
        }
        payload::apply_change(&mut draft.item.data, &change.key, change.mode, &change.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InventoryItem;
    use craft_core::{ChangeValue, EffectChange};
    use serde_json::json;

    fn drafts(n: usize) -> Vec<ResultDraft> {
        (0..n)
            .map(|i| {
                let mut item = InventoryItem::new(format!("sword-{i}"), "Sword");
                item.data = json!({ "system": { "damage": 4 } });
                ResultDraft::new(format!("r{i}"), item)
            })
            .collect()
    }

    fn damage(amount: i64) -> EffectChange {
        EffectChange::new("system.damage", ChangeMode::Add, ChangeValue::Number(amount))
    }

    #[test]
    fn merge_modifiers_share_one_named_effect_per_result() {
        let mut drafts = drafts(2);
        let flame = Modifier::new("flame", 1).applies_as(AppliesAs::Merge).change(damage(2));
        let frost = Modifier::new("frost", 1).applies_as(AppliesAs::Merge).change(damage(1));

        apply_modifier(&flame, "Enchantments", &mut drafts);
        apply_modifier(&frost, "Enchantments", &mut drafts);

        for draft in &drafts {
            assert_eq!(draft.item.effects.len(), 1);
            assert_eq!(draft.item.effects[0].name, "Enchantments");
            assert_eq!(draft.item.effects[0].changes, vec![damage(2), damage(1)]);
        }
    }

    #[test]
    fn merge_reuses_existing_effect_of_same_name() {
        let mut drafts = drafts(1);
        drafts[0].item.effects.push(EffectRecord {
            name: "Enchantments".into(),
            origin: None,
            changes: vec![damage(5)],
        });
        let flame = Modifier::new("flame", 1).applies_as(AppliesAs::Merge).change(damage(2));

        apply_modifier(&flame, "Enchantments", &mut drafts);
        assert_eq!(drafts[0].item.effects.len(), 1);
        assert_eq!(drafts[0].item.effects[0].changes, vec![damage(5), damage(2)]);
    }

    #[test]
    fn effect_modifiers_get_their_own_record() {
        let mut drafts = drafts(1);
        let flame = Modifier::new("flame", 1).applies_as(AppliesAs::Effect).change(damage(2));
        let frost = Modifier::new("frost", 1).applies_as(AppliesAs::Effect).change(damage(1));

        apply_modifier(&flame, "Enchantments", &mut drafts);
        apply_modifier(&frost, "Enchantments", &mut drafts);

        let origins: Vec<_> = drafts[0].item.effects.iter().map(|e| e.origin.clone()).collect();
        assert_eq!(origins, vec![Some("flame".to_string()), Some("frost".to_string())]);
    }

    #[test]
    fn direct_patches_only_plain_keys() {
        let mut drafts = drafts(1);
        let honed = Modifier::new("honed", 1)
            .change(damage(3))
            .change(EffectChange::new("system.damage[0]", ChangeMode::Override, ChangeValue::Number(0)))
            .change(EffectChange::new("system.note", ChangeMode::Custom, ChangeValue::Text("x".into())));

        apply_modifier(&honed, "Enchantments", &mut drafts);
        assert_eq!(drafts[0].item.data, json!({ "system": { "damage": 7 } }));
        assert!(drafts[0].item.effects.is_empty());
    }
}
