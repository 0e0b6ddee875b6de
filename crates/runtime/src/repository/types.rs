//! Records exchanged with the inventory repository.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use craft_core::{EffectChange, Element, ItemRef, ModifierId};

/// A named bundle of changes attached to an item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectRecord {
    pub name: String,
    /// Modifier that generated the record; `None` for shared merge records.
    pub origin: Option<ModifierId>,
    pub changes: Vec<EffectChange>,
}

/// An inventory item as seen by the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryItem {
    /// Assigned by the repository on creation; empty for drafts.
    pub id: String,
    pub container: Option<String>,
    pub name: String,
    pub img: String,
    pub description: String,
    /// Material key used by slot acceptance and requirements.
    pub material: String,
    pub elements: Vec<Element>,
    /// Arbitrary item payload; quantity lives at a configurable dotted path.
    pub data: Value,
    pub effects: Vec<EffectRecord>,
    /// Modifiers committed on this item by earlier crafts.
    pub applied_modifiers: BTreeSet<ModifierId>,
}

impl InventoryItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data: Value::Object(Default::default()),
            ..Self::default()
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            id: self.id.clone(),
            container: self.container.clone(),
        }
    }
}

/// A holder of items (an actor's inventory, a chest).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: String,
    /// Owning user; items in unowned containers can not be consumed.
    pub owner: Option<String>,
}

impl Container {
    pub fn owned(id: impl Into<String>, owner: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            owner: Some(owner.into()),
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

/// One field write on an existing item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub id: String,
    /// Dotted path inside the item's data.
    pub path: String,
    pub value: Value,
}
