//! In-memory inventory with a mutation journal.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use craft_core::ItemRef;

use crate::repository::payload;
use crate::repository::{
    Container, InventoryItem, InventoryRepository, ItemUpdate, RepositoryError, Result,
};

/// One mutation call received by [`InMemoryInventory`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryCall {
    Update { container: String, ids: Vec<String> },
    Delete { container: String, ids: Vec<String> },
    Create { location: String, ids: Vec<String> },
}

#[derive(Default)]
struct Inner {
    containers: BTreeMap<String, Container>,
    items: BTreeMap<String, InventoryItem>,
    calls: Vec<InventoryCall>,
    next_id: u64,
}

/// In-memory inventory for testing and development.
///
/// Every mutation call is journaled so tests can assert on batching and on
/// the absence of partial writes.
#[derive(Default)]
pub struct InMemoryInventory {
    inner: RwLock<Inner>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_container(&self, container: Container) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;
        inner.containers.insert(container.id.clone(), container);
        Ok(())
    }

    pub fn remove_container(&self, id: &str) -> Result<Option<Container>> {
        let mut inner = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner.containers.remove(id))
    }

    pub fn insert_item(&self, item: InventoryItem) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;
        inner.items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Drops an item without journaling, as if removed by someone else.
    pub fn remove_item(&self, id: &str) -> Result<Option<InventoryItem>> {
        let mut inner = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner.items.remove(id))
    }

    pub fn item(&self, id: &str) -> Result<Option<InventoryItem>> {
        let inner = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner.items.get(id).cloned())
    }

    /// Items currently held at a container or location.
    pub fn items_in(&self, location: &str) -> Result<Vec<InventoryItem>> {
        let inner = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner
            .items
            .values()
            .filter(|item| item.container.as_deref() == Some(location))
            .cloned()
            .collect())
    }

    pub fn calls(&self) -> Result<Vec<InventoryCall>> {
        let inner = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner.calls.clone())
    }
}

fn held_by<'a>(
    items: &'a mut BTreeMap<String, InventoryItem>,
    container: &str,
    id: &str,
) -> Result<&'a mut InventoryItem> {
    let item = items.get_mut(id).ok_or_else(|| RepositoryError::NotFound {
        kind: "item",
        id: id.to_string(),
    })?;
    if item.container.as_deref() != Some(container) {
        return Err(RepositoryError::ContainerMismatch {
            item: id.to_string(),
            container: container.to_string(),
        });
    }
    Ok(item)
}

#[async_trait]
impl InventoryRepository for InMemoryInventory {
    async fn resolve(&self, item: &ItemRef) -> Result<Option<InventoryItem>> {
        let inner = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner
            .items
            .get(&item.id)
            .filter(|found| item.container.is_none() || found.container == item.container)
            .cloned())
    }

    async fn container(&self, id: &str) -> Result<Option<Container>> {
        let inner = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner.containers.get(id).cloned())
    }

    async fn update_items(&self, container: &str, updates: Vec<ItemUpdate>) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;

        // validate the whole batch before touching anything
        for update in &updates {
            held_by(&mut inner.items, container, &update.id)?;
        }
        let mut ids = Vec::with_capacity(updates.len());
        for update in updates {
            let item = held_by(&mut inner.items, container, &update.id)?;
            payload::set_path(&mut item.data, &update.path, update.value);
            ids.push(update.id);
        }

        inner.calls.push(InventoryCall::Update {
            container: container.to_string(),
            ids,
        });
        Ok(())
    }

    async fn delete_items(&self, container: &str, ids: Vec<String>) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;

        for id in &ids {
            held_by(&mut inner.items, container, id)?;
        }
        for id in &ids {
            inner.items.remove(id);
        }

        inner.calls.push(InventoryCall::Delete {
            container: container.to_string(),
            ids,
        });
        Ok(())
    }

    async fn create_items(
        &self,
        location: &str,
        items: Vec<InventoryItem>,
    ) -> Result<Vec<InventoryItem>> {
        let mut inner = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;

        let mut created = Vec::with_capacity(items.len());
        for mut item in items {
            inner.next_id += 1;
            item.id = format!("crafted-{}", inner.next_id);
            item.container = Some(location.to_string());
            inner.items.insert(item.id.clone(), item.clone());
            created.push(item);
        }

        inner.calls.push(InventoryCall::Create {
            location: location.to_string(),
            ids: created.iter().map(|item| item.id.clone()).collect(),
        });
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stocked() -> InMemoryInventory {
        let inventory = InMemoryInventory::new();
        inventory.insert_container(Container::owned("bag", "alice")).unwrap();
        let mut herb = InventoryItem::new("herb", "Herb");
        herb.container = Some("bag".into());
        herb.data = json!({ "system": { "quantity": 5 } });
        inventory.insert_item(herb).unwrap();
        inventory
    }

    #[tokio::test]
    async fn update_batch_is_all_or_nothing() {
        let inventory = stocked();
        let updates = vec![
            ItemUpdate {
                id: "herb".into(),
                path: "system.quantity".into(),
                value: json!(2),
            },
            ItemUpdate {
                id: "ghost".into(),
                path: "system.quantity".into(),
                value: json!(1),
            },
        ];

        let err = inventory.update_items("bag", updates).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        let herb = inventory.item("herb").unwrap().unwrap();
        assert_eq!(herb.data["system"]["quantity"], json!(5));
        assert!(inventory.calls().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_respects_recorded_container() {
        let inventory = stocked();
        assert!(inventory.resolve(&ItemRef::owned_by("herb", "bag")).await.unwrap().is_some());
        assert!(inventory.resolve(&ItemRef::owned_by("herb", "chest")).await.unwrap().is_none());
        assert!(inventory.resolve(&ItemRef::new("herb")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_assigns_ids_and_location() {
        let inventory = InMemoryInventory::new();
        let created = inventory
            .create_items("crafted", vec![InventoryItem::new("", "Potion")])
            .await
            .unwrap();

        assert_eq!(created[0].id, "crafted-1");
        assert_eq!(inventory.items_in("crafted").unwrap().len(), 1);
        assert_eq!(
            inventory.calls().unwrap(),
            vec![InventoryCall::Create {
                location: "crafted".into(),
                ids: vec!["crafted-1".into()],
            }]
        );
    }
}
