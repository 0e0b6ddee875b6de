//! Working records of a craft in progress.

use serde::Serialize;

use craft_core::{ResultId, SlotId};

use crate::repository::InventoryItem;

/// A filled input slot resolved against the inventory.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Material {
    pub slot: SlotId,
    pub item: InventoryItem,
    /// Quantity placed in the slot.
    pub quantity: i32,
    pub consumed: bool,
}

/// A chosen result being prepared for creation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultDraft {
    pub result: ResultId,
    /// The item placed in the result slot, as resolved.
    pub source: InventoryItem,
    /// The clone that will be created.
    pub item: InventoryItem,
}

impl ResultDraft {
    pub fn new(result: impl Into<ResultId>, source: InventoryItem) -> Self {
        let mut item = source.clone();
        item.id.clear();
        Self {
            result: result.into(),
            source,
            item,
        }
    }
}
