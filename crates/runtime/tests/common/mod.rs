//! Shared fixture: a forge recipe and a stocked pack.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;

use craft_core::{
    AppliesAs, BudgetConfig, ChangeMode, ChangeValue, CraftRecipe, EffectChange, Element,
    Modifier, ResultSlot, Slot,
};
use runtime::{
    Container, CraftRuntime, InMemoryConfigStore, InMemoryInventory, InventoryItem, RecordingSink,
    ScriptHost,
};

pub const PACK: &str = "pack";

pub struct Fixture {
    pub runtime: CraftRuntime,
    pub inventory: Arc<InMemoryInventory>,
    pub store: Arc<InMemoryConfigStore>,
    pub sink: Arc<RecordingSink>,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn damage(amount: i64) -> EffectChange {
    EffectChange::new("system.damage", ChangeMode::Add, ChangeValue::Number(amount))
}

/// Budget `5 + fire`; two necessary slots, two results, five modifiers.
pub fn forge() -> CraftRecipe {
    let mut recipe = CraftRecipe::new("forge", "Forge");
    recipe.effect_name = "Forging".into();
    recipe.budget = BudgetConfig {
        base: 5,
        element_ref: Some("fire".into()),
        icon: String::new(),
    };
    recipe.slots = vec![Slot::new("ore").necessary(), Slot::new("flux").necessary()];
    recipe.results = vec![ResultSlot::new("blade"), ResultSlot::new("dagger")];
    recipe.modifiers = vec![
        Modifier::new("edge", 3).change(damage(1)),
        Modifier::new("temper", 4).change(damage(2)),
        Modifier::new("polish", 1),
        Modifier::new("flame", 0)
            .applies_as(AppliesAs::Merge)
            .change(damage(3)),
    ];
    recipe
}

fn item(id: &str, name: &str, material: &str, quantity: i64) -> InventoryItem {
    let mut item = InventoryItem::new(id, name);
    item.container = Some(PACK.into());
    item.material = material.into();
    item.data = json!({ "system": { "quantity": quantity, "damage": 4 } });
    item
}

/// `iron` x3 carrying fire 2, `coal` x1, `sword` and `knife` as result
/// templates; all in an owned pack.
pub fn stocked_inventory() -> InMemoryInventory {
    let inventory = InMemoryInventory::new();
    inventory
        .insert_container(Container::owned(PACK, "alice"))
        .expect("container");

    let mut iron = item("iron", "Iron", "ore", 3);
    iron.elements = vec![Element::new("fire", 2)];
    for stock in [
        iron,
        item("coal", "Coal", "flux", 1),
        item("sword", "Sword", "blade", 1),
        item("knife", "Knife", "blade", 1),
    ] {
        inventory.insert_item(stock).expect("item");
    }
    inventory
}

pub fn fixture_with(recipe: CraftRecipe, scripts: Option<Arc<dyn ScriptHost>>) -> Fixture {
    init_tracing();
    let inventory = Arc::new(stocked_inventory());
    let store = Arc::new(InMemoryConfigStore::with_recipes([recipe]));
    let sink = Arc::new(RecordingSink::new());

    let mut builder = CraftRuntime::builder()
        .inventory(inventory.clone())
        .store(store.clone())
        .sink(sink.clone());
    if let Some(scripts) = scripts {
        builder = builder.scripts(scripts);
    }

    Fixture {
        runtime: builder.build().expect("runtime should build"),
        inventory,
        store,
        sink,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(forge(), None)
}
