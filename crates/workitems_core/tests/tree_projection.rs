use workitems_core::{
    FieldValue, Fields, ItemType, StatusBadge, StatusPatch, TreeProjection, WorkItemStore,
};

fn titled(title: &str) -> Option<Fields> {
    let mut fields = Fields::new();
    fields.insert("Title".to_string(), FieldValue::from(title));
    Some(fields)
}

#[test]
fn roots_and_children_follow_store_order() {
    let mut store = WorkItemStore::new();
    let first = store.create_item(ItemType::Epic, None, titled("Payments"));
    let second = store.create_item(ItemType::Epic, None, None);
    let feature = store.create_item(ItemType::Feature, Some(first), titled("Checkout"));

    let projection = TreeProjection::new(&store);
    let roots = projection.children(None);
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].id, first);
    assert_eq!(roots[0].label, "Payments");
    assert!(roots[0].collapsible);
    assert_eq!(roots[1].id, second);
    assert_eq!(roots[1].label, "epic");
    assert!(!roots[1].collapsible);

    let children = projection.children(Some(&first));
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, feature);
    assert_eq!(children[0].kind, ItemType::Feature);

    assert!(projection.children(Some(&uuid::Uuid::new_v4())).is_empty());
}

#[test]
fn deleted_ids_never_surface() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let feature = store.create_item(ItemType::Feature, Some(epic), None);
    store.create_item(ItemType::Story, Some(feature), None);
    store.delete_item(&feature);

    let projection = TreeProjection::new(&store);
    assert!(projection.children(Some(&epic)).is_empty());
    assert!(projection.node(&feature).is_none());
    assert_eq!(projection.flatten().len(), 1);
}

#[test]
fn badge_priority_is_loading_then_error_then_complete() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);

    let badge = |store: &WorkItemStore| TreeProjection::new(store).node(&epic).unwrap().badge;
    assert_eq!(badge(&store), StatusBadge::None);

    store.update_item_status(&epic, StatusPatch::complete(true));
    assert_eq!(badge(&store), StatusBadge::Complete);

    store.update_item_status(&epic, StatusPatch::error(true));
    assert_eq!(badge(&store), StatusBadge::Incomplete);

    store.update_item_status(&epic, StatusPatch::loading(true));
    assert_eq!(badge(&store), StatusBadge::Loading);
    assert_eq!(StatusBadge::Loading.description(), "Loading...");
    assert_eq!(StatusBadge::None.description(), "");
}

#[test]
fn flatten_lists_depth_first_with_depths() {
    let mut store = WorkItemStore::new();
    let epic = store.create_item(ItemType::Epic, None, None);
    let feature = store.create_item(ItemType::Feature, Some(epic), None);
    let story = store.create_item(ItemType::Story, Some(feature), None);
    let intent = store.create_item(ItemType::SolutionIntent, Some(epic), None);
    let other = store.create_item(ItemType::Epic, None, None);

    let rows: Vec<_> = TreeProjection::new(&store)
        .flatten()
        .into_iter()
        .map(|(depth, node)| (depth, node.id))
        .collect();
    assert_eq!(
        rows,
        vec![(0, epic), (1, feature), (2, story), (1, intent), (0, other)]
    );
}
