use std::collections::HashSet;
use uuid::Uuid;
use workitems_core::{
    default_fields, FieldValue, Fields, ItemId, ItemType, StatusPatch, WorkItemStore,
};

fn text_fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), FieldValue::from(*value)))
        .collect()
}

fn assert_no_reference(store: &WorkItemStore, id: &ItemId) {
    assert!(store.get_item(id).is_none());
    assert!(store.parent_of(id).is_none());
    assert!(!store.root_ids().contains(id));
    for item in store.items() {
        assert!(!item.child_ids.contains(id));
    }
    assert!(!store.export_data().parent_by_id.contains_key(id));
}

#[test]
fn creating_epic_registers_root_with_default_fields() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);

    assert_eq!(store.root_ids(), &[epic]);
    let item = store.get_item(&epic).unwrap();
    assert_eq!(item.fields, text_fields(&[("Title", ""), ("Description", "")]));
    assert!(!item.status.is_complete);
    assert!(!item.status.is_loading);
    assert!(!item.status.is_error);
    assert!(item.child_ids.is_empty());
    assert_eq!(store.parent_of(&epic), None);
}

#[test]
fn creating_child_appends_to_parent_in_order() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let feature = store.create_item(ItemType::Feature, Some(epic), None);
    let intent = store.create_item(ItemType::SolutionIntent, Some(epic), None);

    assert_eq!(store.children_of(&epic), &[feature, intent]);
    assert_eq!(store.parent_of(&feature), Some(epic));
    assert_eq!(store.parent_of(&intent), Some(epic));
    assert_eq!(store.root_ids(), &[epic]);
    assert_eq!(store.len(), 3);
}

#[test]
fn overrides_win_over_defaults_and_defaults_stay_present() {
    let mut store = WorkItemStore::new();
    let story = store.create_item(
        ItemType::Story,
        None,
        Some(text_fields(&[("Title", "Pay by card")])),
    );

    let item = store.get_item(&story).unwrap();
    for name in default_fields(&ItemType::Story).keys() {
        assert!(item.fields.contains_key(name));
    }
    assert_eq!(item.title(), Some("Pay by card"));
    assert_eq!(item.field_text("AcceptanceCriteria"), Some(""));
    // Overrides do not make a new item complete on their own.
    assert!(!item.status.is_complete);
}

#[test]
fn non_epic_without_parent_is_recorded_but_not_rooted() {
    let mut store = WorkItemStore::new();
    let story = store.create_item(ItemType::Story, None, None);

    assert!(store.contains(&story));
    assert!(store.root_ids().is_empty());
    assert_eq!(store.parent_of(&story), None);
}

#[test]
fn missing_parent_is_recorded_without_linking() {
    let mut store = WorkItemStore::new();
    let ghost = Uuid::new_v4();
    let feature = store.create_item(ItemType::Feature, Some(ghost), None);

    assert_eq!(store.parent_of(&feature), Some(ghost));
    assert!(store.root_ids().is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn illegal_pairs_are_recorded_not_rejected() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let story = store.create_item(ItemType::Story, Some(epic), None);

    assert_eq!(store.children_of(&epic), &[story]);
}

#[test]
fn ids_are_unique() {
    let mut store = WorkItemStore::new();
    let ids: HashSet<ItemId> = (0..50)
        .map(|_| store.create_item(ItemType::Epic, None, None))
        .collect();
    assert_eq!(ids.len(), 50);
    assert_eq!(store.root_ids().len(), 50);
}

#[test]
fn field_update_merges_without_recomputing_status() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let feature = store.create_item(ItemType::Feature, Some(epic), None);

    assert!(store.update_item_fields(
        &feature,
        text_fields(&[("Title", "Checkout"), ("Description", "Add checkout flow")]),
    ));
    let item = store.get_item(&feature).unwrap();
    assert_eq!(item.title(), Some("Checkout"));
    assert!(item.is_complete());
    assert!(!item.status.is_complete);

    assert!(store.update_item_status(&feature, StatusPatch::complete(true)));
    let item = store.get_item(&feature).unwrap();
    assert_eq!(item.title(), Some("Checkout"));
    assert!(item.status.is_complete);
}

#[test]
fn partial_field_update_keeps_other_keys() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(
        ItemType::Epic,
        None,
        Some(text_fields(&[("Title", "Payments"), ("Description", "All")])),
    );

    store.update_item_fields(&epic, text_fields(&[("Description", "Card only")]));
    let item = store.get_item(&epic).unwrap();
    assert_eq!(item.title(), Some("Payments"));
    assert_eq!(item.field_text("Description"), Some("Card only"));
}

#[test]
fn status_update_merges_only_given_keys() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);

    store.update_item_status(&epic, StatusPatch::loading(true));
    store.update_item_status(&epic, StatusPatch::error(true));
    let status = store.get_item(&epic).unwrap().status;
    assert!(status.is_loading);
    assert!(status.is_error);
    assert!(!status.is_complete);
}

#[test]
fn recompute_completeness_follows_fields() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    assert_eq!(store.recompute_completeness(&epic), Some(false));

    store.update_item_fields(&epic, text_fields(&[("Title", "A"), ("Description", "B")]));
    assert_eq!(store.recompute_completeness(&epic), Some(true));
    assert!(store.get_item(&epic).unwrap().status.is_complete);

    assert_eq!(store.recompute_completeness(&Uuid::new_v4()), None);
}

#[test]
fn updates_on_absent_ids_are_no_ops() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let before = store.export_data();
    let ghost = Uuid::new_v4();

    assert!(store.get_item(&ghost).is_none());
    assert!(!store.update_item_fields(&ghost, text_fields(&[("Title", "x")])));
    assert!(!store.update_item_status(&ghost, StatusPatch::complete(true)));
    assert_eq!(store.export_data(), before);
    assert!(store.contains(&epic));
}

#[test]
fn delete_epic_removes_whole_subtree() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let feature = store.create_item(ItemType::Feature, Some(epic), None);
    let story_a = store.create_item(ItemType::Story, Some(feature), None);
    let story_b = store.create_item(ItemType::Story, Some(feature), None);
    let intent = store.create_item(ItemType::SolutionIntent, Some(epic), None);
    let other_epic = store.create_item(ItemType::Epic, None, None);

    assert_eq!(store.delete_item(&epic), 5);

    for id in [epic, feature, story_a, story_b, intent] {
        assert_no_reference(&store, &id);
    }
    assert_eq!(store.root_ids(), &[other_epic]);
    assert_eq!(store.len(), 1);
}

#[test]
fn delete_child_detaches_from_parent_only() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let first = store.create_item(ItemType::Feature, Some(epic), None);
    let second = store.create_item(ItemType::Feature, Some(epic), None);
    let story = store.create_item(ItemType::Story, Some(first), None);

    assert_eq!(store.delete_item(&first), 2);

    assert_no_reference(&store, &first);
    assert_no_reference(&store, &story);
    assert_eq!(store.children_of(&epic), &[second]);
    assert_eq!(store.root_ids(), &[epic]);
}

#[test]
fn delete_is_idempotent() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    store.create_item(ItemType::Feature, Some(epic), None);

    assert_eq!(store.delete_item(&epic), 2);
    let after_first = store.export_data();
    assert_eq!(store.delete_item(&epic), 0);
    assert_eq!(store.export_data(), after_first);
    assert!(store.is_empty());
    assert!(store.root_ids().is_empty());
}

#[test]
fn deep_chains_delete_without_recursion() {
    let mut store = WorkItemStore::new();
    let root = store.create_item(ItemType::Epic, None, None);
    let mut parent = root;
    for _ in 0..20_000 {
        parent = store.create_item(ItemType::Feature, Some(parent), None);
    }

    assert_eq!(store.delete_item(&root), 20_001);
    assert!(store.is_empty());
}

#[test]
fn export_is_independent_of_the_store() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(
        ItemType::Epic,
        None,
        Some(text_fields(&[("Title", "Original")])),
    );
    let feature = store.create_item(ItemType::Feature, Some(epic), None);

    let mut export = store.export_data();
    let record = export.items_by_id.get_mut(&epic).unwrap();
    record
        .fields
        .insert("Title".to_string(), FieldValue::from("Changed"));
    record.child_ids.clear();
    export.root_ids.clear();
    export.parent_by_id.clear();

    let item = store.get_item(&epic).unwrap();
    assert_eq!(item.title(), Some("Original"));
    assert_eq!(item.child_ids, vec![feature]);
    assert_eq!(store.root_ids(), &[epic]);
    assert_eq!(store.parent_of(&feature), Some(epic));
}

#[test]
fn export_strips_status_and_keeps_wire_names() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    store.update_item_status(&epic, StatusPatch::loading(true));

    let json = serde_json::to_value(store.export_data()).unwrap();
    let record = &json["itemsById"][epic.to_string()];
    assert_eq!(record["type"], "epic");
    assert!(record.get("status").is_none());
    assert_eq!(record["childIds"], serde_json::json!([]));
    assert_eq!(json["parentById"][epic.to_string()], serde_json::Value::Null);
    assert_eq!(json["rootIds"], serde_json::json!([epic.to_string()]));
}

#[test]
fn reset_state_empties_the_store() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    store.create_item(ItemType::Feature, Some(epic), None);

    store.reset_state();

    assert!(store.is_empty());
    assert!(store.root_ids().is_empty());
    assert!(store.export_data().parent_by_id.is_empty());
    assert_eq!(store.data_structure_version(), workitems_core::DATA_STRUCTURE_VERSION);
}
