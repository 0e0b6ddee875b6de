mod common;

use std::path::Path;
use std::sync::Arc;

use craft_content::ContentFactory;
use craft_core::{BudgetConfig, CraftRecipe, ElementAggregationRule, Modifier, Slot};
use runtime::{
    ConfigStore, CraftRuntime, EditError, FileConfigStore, InMemoryInventory, RecordingSink,
    RepositoryError, SessionMode,
};

fn shipped_recipes() -> Vec<CraftRecipe> {
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../craft/content/data");
    ContentFactory::new(data)
        .load_recipes()
        .expect("shipped recipes should load")
}

#[tokio::test]
async fn file_store_round_trips_edits() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(FileConfigStore::new(dir.path()).expect("store"));
    let sink = Arc::new(RecordingSink::new());
    let runtime = CraftRuntime::builder()
        .store(store.clone())
        .inventory(Arc::new(InMemoryInventory::new()))
        .sink(sink.clone())
        .build()
        .expect("runtime should build");
    let editor = runtime.editor();

    for recipe in shipped_recipes() {
        editor.create_recipe(recipe).await.expect("create");
    }
    assert_eq!(store.list().await.unwrap(), vec!["enchanting-table".to_string()]);

    editor
        .add_slot("enchanting-table", Slot::new("rune").kept())
        .await
        .expect("add rune slot");
    editor
        .set_budget(
            "enchanting-table",
            BudgetConfig {
                base: 9,
                element_ref: None,
                icon: String::new(),
            },
        )
        .await
        .expect("set budget");

    let reopened = FileConfigStore::new(dir.path()).expect("reopen store");
    let saved = reopened
        .load("enchanting-table")
        .await
        .unwrap()
        .expect("recipe on disk");
    let rune = saved.slot("rune").expect("rune slot saved");
    assert!(!rune.is_consumed);
    assert_eq!(saved.budget.base, 9);

    let err = editor
        .create_recipe(saved.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, EditError::DuplicateEntry { kind: "recipe", .. }));
    assert_eq!(sink.errors().len(), 1);

    let err = editor.delete_recipe("../enchanting-table").await.unwrap_err();
    assert!(matches!(err, EditError::Repository(RepositoryError::InvalidId(_))));
    assert_eq!(sink.errors().len(), 2);

    assert!(editor.delete_recipe("enchanting-table").await.unwrap());
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_recipe_closes_its_sessions() {
    let fx = common::fixture();
    fx.runtime
        .open_session("forge", SessionMode::Craft)
        .await
        .expect("session should open");

    assert!(fx.runtime.editor().delete_recipe("forge").await.unwrap());
    assert!(fx.runtime.sessions().is_empty().await);
    assert!(fx.store.load("forge").await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_edits_leave_sessions_untouched() {
    let fx = common::fixture();
    let session = fx
        .runtime
        .open_session("forge", SessionMode::Craft)
        .await
        .expect("session should open");
    let editor = fx.runtime.editor();

    let err = editor
        .add_modifier("forge", Modifier::new("edge", 9))
        .await
        .unwrap_err();
    assert!(matches!(err, EditError::DuplicateEntry { kind: "modifier", .. }));

    let err = editor
        .update_rule("forge", ElementAggregationRule::new("ghost", ["ghost"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EditError::UnknownEntry { kind: "rule", .. }));

    assert_eq!(session.recipe().await.modifier("edge").map(|m| m.cost), Some(3));
    assert_eq!(fx.sink.errors().len(), 2);
}
