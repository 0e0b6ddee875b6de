//! All-or-nothing commit of a craft.
//!
//! The plan is built and checked first. Only a plan without unresolved
//! references is executed, so a failing check never leaves a partial
//! mutation behind.

use std::collections::BTreeMap;

use serde_json::Value;

use craft_core::EngineConfig;

use super::{Material, ResultDraft};
use crate::repository::{
    Container, InventoryItem, InventoryRepository, ItemUpdate, RepositoryError, payload,
};

#[derive(Debug, Default)]
struct Batch {
    updates: Vec<ItemUpdate>,
    deletes: Vec<String>,
}

/// Mutations grouped per owning container, plus result creations per
/// location.
#[derive(Debug, Default)]
pub(crate) struct CommitPlan {
    batches: BTreeMap<String, Batch>,
    creates: BTreeMap<String, Vec<InventoryItem>>,
}

struct Consumption<'a> {
    container: &'a str,
    current: i64,
    used: i64,
}

impl CommitPlan {
    /// Builds the plan, pushing every unresolved reference into `unresolved`.
    ///
    /// Without an actor nothing is consumed and results go to the holding
    /// location.
    pub(crate) async fn build(
        inventory: &dyn InventoryRepository,
        config: &EngineConfig,
        actor: Option<&str>,
        materials: &[Material],
        drafts: &[ResultDraft],
        unresolved: &mut Vec<String>,
    ) -> Result<Self, RepositoryError> {
        let mut plan = Self::default();

        let Some(actor) = actor else {
            plan.creates.insert(
                config.holding_location.clone(),
                drafts.iter().map(|draft| draft.item.clone()).collect(),
            );
            return Ok(plan);
        };

        let mut containers: BTreeMap<String, Option<Container>> = BTreeMap::new();
        // the same item may sit in several slots
        let mut consumption: BTreeMap<&str, Consumption<'_>> = BTreeMap::new();

        for material in materials.iter().filter(|material| material.consumed) {
            let item = &material.item;
            let Some(container_id) = item.container.as_deref() else {
                unresolved.push(format!("item `{}` is not in a container", item.id));
                continue;
            };

            if !containers.contains_key(container_id) {
                let found = inventory.container(container_id).await?;
                containers.insert(container_id.to_string(), found);
            }
            match containers.get(container_id) {
                Some(Some(container)) if container.is_owned() => {}
                Some(Some(_)) => {
                    unresolved.push(format!("container `{container_id}` is not owned"));
                    continue;
                }
                _ => {
                    unresolved.push(format!("container `{container_id}`"));
                    continue;
                }
            }

            let entry = consumption.entry(item.id.as_str()).or_insert_with(|| Consumption {
                container: container_id,
                current: payload::get_i64(&item.data, &config.quantity_path).unwrap_or(1),
                used: 0,
            });
            entry.used += i64::from(material.quantity);
        }

        for (id, usage) in consumption {
            let batch = plan.batches.entry(usage.container.to_string()).or_default();
            let remaining = usage.current - usage.used;
            if remaining <= 0 {
                batch.deletes.push(id.to_string());
            } else {
                batch.updates.push(ItemUpdate {
                    id: id.to_string(),
                    path: config.quantity_path.clone(),
                    value: Value::from(remaining),
                });
            }
        }

        for draft in drafts {
            let location = draft
                .source
                .container
                .clone()
                .unwrap_or_else(|| actor.to_string());
            plan.creates.entry(location).or_default().push(draft.item.clone());
        }

        Ok(plan)
    }

    /// Issues one update and one delete call per container, then the
    /// creations.
    pub(crate) async fn execute(
        self,
        inventory: &dyn InventoryRepository,
    ) -> Result<Vec<InventoryItem>, RepositoryError> {
        for (container, batch) in self.batches {
            if !batch.updates.is_empty() {
                inventory.update_items(&container, batch.updates).await?;
            }
            if !batch.deletes.is_empty() {
                inventory.delete_items(&container, batch.deletes).await?;
            }
        }

        let mut created = Vec::new();
        for (location, items) in self.creates {
            if items.is_empty() {
                continue;
            }
            created.extend(inventory.create_items(&location, items).await?);
        }
        Ok(created)
    }
}
