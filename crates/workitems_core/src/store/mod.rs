//! Normalized work-item store.
//!
//! # Responsibility
//! - Own every `WorkItem` in flat id-indexed maps plus explicit ordering lists.
//! - Provide CRUD, subtree delete, version check/migration, export and restore.
//! - Notify subscribers with a persisted snapshot after each state change.
//!
//! # Invariants
//! - `items_by_id` and `parent_by_id` have identical key sets.
//! - A non-root item appears exactly once in its parent's `child_ids`.
//! - Store operations never panic and never return errors; absent ids are no-ops.
//! - Type/parent legality is not checked here; see `service::command_service`.
//!
//! # See also
//! - `store::version` for the `major.minor` compatibility rules.

pub mod snapshot;
pub mod subscription;
pub mod version;

use crate::model::item::{
    default_fields, is_complete, Fields, ItemId, ItemType, StatusPatch, WorkItem,
};
use log::{debug, info, warn};
use snapshot::{ExportData, ItemRecord, PersistedSnapshot};
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use subscription::{Listener, SubscriptionId, Subscribers};
use uuid::Uuid;
use version::{classify, VersionCheck, DATA_STRUCTURE_VERSION};

/// Single source of truth for the work-item tree.
///
/// Owned by the host and passed by reference to the command layer and tree
/// projection. Single-writer; every call runs to completion.
pub struct WorkItemStore {
    items_by_id: HashMap<ItemId, WorkItem>,
    parent_by_id: HashMap<ItemId, Option<ItemId>>,
    root_ids: Vec<ItemId>,
    data_structure_version: String,
    current_version: String,
    subscribers: Subscribers,
}

impl Default for WorkItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for WorkItemStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItemStore")
            .field("items", &self.items_by_id.len())
            .field("root_ids", &self.root_ids)
            .field("data_structure_version", &self.data_structure_version)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl WorkItemStore {
    /// Creates an empty store at the compiled-in schema version.
    pub fn new() -> Self {
        Self::with_schema_version(DATA_STRUCTURE_VERSION)
    }

    /// Creates an empty store that treats `current` as its own schema version.
    pub fn with_schema_version(current: impl Into<String>) -> Self {
        let current = current.into();
        Self {
            items_by_id: HashMap::new(),
            parent_by_id: HashMap::new(),
            root_ids: Vec::new(),
            data_structure_version: current.clone(),
            current_version: current,
            subscribers: Subscribers::default(),
        }
    }

    // ---- queries ----

    pub fn get_item(&self, id: &ItemId) -> Option<&WorkItem> {
        self.items_by_id.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items_by_id.contains_key(id)
    }

    /// Parent of `id`. `None` for roots, orphans and unknown ids.
    pub fn parent_of(&self, id: &ItemId) -> Option<ItemId> {
        self.parent_by_id.get(id).copied().flatten()
    }

    /// Ordered child ids of `id`; empty when `id` is unknown.
    pub fn children_of(&self, id: &ItemId) -> &[ItemId] {
        self.items_by_id
            .get(id)
            .map(|item| item.child_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn root_ids(&self) -> &[ItemId] {
        &self.root_ids
    }

    pub fn items(&self) -> impl Iterator<Item = &WorkItem> {
        self.items_by_id.values()
    }

    pub fn len(&self) -> usize {
        self.items_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items_by_id.is_empty()
    }

    pub fn data_structure_version(&self) -> &str {
        &self.data_structure_version
    }

    /// Schema version this store migrates towards.
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Ids of `id` and every transitive descendant, parents before children.
    ///
    /// Ids listed in `child_ids` but missing from the store are skipped.
    pub fn subtree_ids(&self, id: &ItemId) -> Vec<ItemId> {
        let mut ordered = Vec::new();
        if !self.items_by_id.contains_key(id) {
            return ordered;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![*id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(item) = self.items_by_id.get(&current) else {
                continue;
            };
            ordered.push(current);
            // Reverse so children pop in display order.
            stack.extend(item.child_ids.iter().rev().copied());
        }
        ordered
    }

    // ---- mutations ----

    /// Creates an item and returns its fresh id.
    ///
    /// `field_overrides` are merged over `default_fields(kind)`. With a parent,
    /// the id is appended to the parent's `child_ids`; without one, epics are
    /// appended to `root_ids`. A parent id that is not in the store is still
    /// recorded as the item's parent but links nowhere.
    pub fn create_item(
        &mut self,
        kind: ItemType,
        parent_id: Option<ItemId>,
        field_overrides: Option<Fields>,
    ) -> ItemId {
        let id = Uuid::new_v4();
        let mut fields = default_fields(&kind);
        if let Some(overrides) = field_overrides {
            fields.extend(overrides);
        }

        let is_epic = kind == ItemType::Epic;
        debug!(
            "event=item_create module=store status=start kind={} has_parent={}",
            kind,
            parent_id.is_some()
        );
        self.items_by_id.insert(id, WorkItem::new(id, kind, fields));
        self.parent_by_id.insert(id, parent_id);

        match parent_id {
            Some(parent_id) => match self.items_by_id.get_mut(&parent_id) {
                Some(parent) => parent.child_ids.push(id),
                None => warn!(
                    "event=item_create module=store status=dangling_parent item_id={} parent_id={}",
                    id, parent_id
                ),
            },
            None if is_epic => self.root_ids.push(id),
            None => warn!(
                "event=item_create module=store status=orphan item_id={}",
                id
            ),
        }

        self.notify();
        id
    }

    /// Merges `partial` into the item's fields, overwriting by key.
    ///
    /// Does not touch `status.is_complete`; call `recompute_completeness`
    /// (or `update_item_status`) afterwards when completeness must follow.
    /// Returns `false` when `id` is absent.
    pub fn update_item_fields(&mut self, id: &ItemId, partial: Fields) -> bool {
        let Some(item) = self.items_by_id.get_mut(id) else {
            debug!(
                "event=item_update_fields module=store status=not_found item_id={}",
                id
            );
            return false;
        };

        let mut changed = false;
        for (name, value) in partial {
            if item.fields.get(&name) != Some(&value) {
                item.fields.insert(name, value);
                changed = true;
            }
        }

        if changed {
            self.notify();
        }
        true
    }

    /// Merges set keys of `patch` into the item's status.
    ///
    /// Returns `false` when `id` is absent.
    pub fn update_item_status(&mut self, id: &ItemId, patch: StatusPatch) -> bool {
        let Some(item) = self.items_by_id.get_mut(id) else {
            debug!(
                "event=item_update_status module=store status=not_found item_id={}",
                id
            );
            return false;
        };

        if patch.apply_to(&mut item.status) {
            self.notify();
        }
        true
    }

    /// Recomputes `status.is_complete` of one item from its fields.
    ///
    /// Returns the new flag, or `None` when `id` is absent.
    pub fn recompute_completeness(&mut self, id: &ItemId) -> Option<bool> {
        let complete = is_complete(self.items_by_id.get(id)?);
        self.update_item_status(id, StatusPatch::complete(complete));
        Some(complete)
    }

    /// Deletes `id` and its whole subtree. Returns the number of removed items.
    ///
    /// Children are removed before their parent link is cleaned up. Deleting an
    /// unknown id is a no-op returning `0`.
    pub fn delete_item(&mut self, id: &ItemId) -> usize {
        let doomed = self.subtree_ids(id);
        if doomed.is_empty() {
            return 0;
        }

        for current in doomed.iter().rev() {
            self.unlink(current);
        }

        info!(
            "event=item_delete module=store status=ok item_id={} removed={}",
            id,
            doomed.len()
        );
        self.notify();
        doomed.len()
    }

    /// Compares `persisted` with the current schema version and adjusts state.
    ///
    /// - absent: reset, `Initialized`
    /// - major differs (or unparseable): reset, `Cleared`
    /// - minor differs: recompute every `is_complete`, adopt current version, `Migrated`
    /// - otherwise: `Unchanged`, no mutation
    ///
    /// Subscribers are notified only when state actually changed; resetting an
    /// already empty store is silent.
    pub fn check_and_migrate_version(&mut self, persisted: Option<&str>) -> VersionCheck {
        let was_pristine = self.is_pristine();
        let outcome = self.apply_version_check(persisted);
        let changed = match outcome {
            VersionCheck::Unchanged => false,
            VersionCheck::Initialized | VersionCheck::Cleared => !was_pristine,
            VersionCheck::Migrated => true,
        };
        if changed {
            self.notify();
        }
        outcome
    }

    /// Replaces all state with the empty initial state.
    ///
    /// No-op (and no notification) when the store is already empty.
    pub fn reset_state(&mut self) {
        if self.is_pristine() {
            debug!("event=store_reset module=store status=noop");
            return;
        }
        self.clear_items();
        info!("event=store_reset module=store status=ok");
        self.notify();
    }

    /// Owned copy of items (without status), parent links and roots.
    pub fn export_data(&self) -> ExportData {
        ExportData {
            items_by_id: self
                .items_by_id
                .iter()
                .map(|(id, item)| (*id, ItemRecord::from(item)))
                .collect(),
            parent_by_id: self
                .parent_by_id
                .iter()
                .map(|(id, parent)| (*id, *parent))
                .collect(),
            root_ids: self.root_ids.clone(),
        }
    }

    /// Export plus schema version, as handed to persistence.
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot::from_export(self.export_data(), self.data_structure_version.clone())
    }

    /// Loads a persisted snapshot through the version check.
    ///
    /// On `Unchanged`/`Migrated` the snapshot is adopted and completeness is
    /// recomputed for every item, since snapshots carry no status. On
    /// `Initialized`/`Cleared` the store is left empty.
    pub fn restore(&mut self, snapshot: PersistedSnapshot) -> VersionCheck {
        let outcome = self.apply_version_check(snapshot.data_structure_version.as_deref());
        if outcome.keeps_data() {
            self.adopt(snapshot);
        }
        info!(
            "event=store_restore module=store status={} items={} roots={}",
            outcome,
            self.items_by_id.len(),
            self.root_ids.len()
        );
        self.notify();
        outcome
    }

    /// Registers a listener called after every state change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&PersistedSnapshot) + 'static,
    ) -> SubscriptionId {
        let listener: Listener = Box::new(listener);
        self.subscribers.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // ---- internals ----

    fn apply_version_check(&mut self, persisted: Option<&str>) -> VersionCheck {
        let outcome = classify(persisted, &self.current_version);
        match outcome {
            VersionCheck::Initialized => self.clear_items(),
            VersionCheck::Cleared => {
                warn!(
                    "event=version_check module=store status=cleared persisted={} current={} dropped={}",
                    persisted.unwrap_or_default(),
                    self.current_version,
                    self.items_by_id.len()
                );
                self.clear_items();
            }
            VersionCheck::Migrated => {
                self.recompute_all();
                self.data_structure_version = self.current_version.clone();
            }
            VersionCheck::Unchanged => {}
        }
        debug!(
            "event=version_check module=store status={} current={}",
            outcome, self.current_version
        );
        outcome
    }

    fn adopt(&mut self, snapshot: PersistedSnapshot) {
        let PersistedSnapshot {
            items_by_id,
            mut parent_by_id,
            root_ids,
            ..
        } = snapshot;

        self.items_by_id = items_by_id
            .into_iter()
            .map(|(id, record)| (id, WorkItem::from(record)))
            .collect();

        let stray_links = parent_by_id.len();
        parent_by_id.retain(|id, _| self.items_by_id.contains_key(id));
        let stray_links = stray_links - parent_by_id.len();
        self.parent_by_id = parent_by_id.into_iter().collect();

        let mut missing_links = 0;
        for id in self.items_by_id.keys() {
            if !self.parent_by_id.contains_key(id) {
                self.parent_by_id.insert(*id, None);
                missing_links += 1;
            }
        }
        if stray_links > 0 || missing_links > 0 {
            warn!(
                "event=store_restore module=store status=repaired stray_links={} missing_links={}",
                stray_links, missing_links
            );
        }

        self.root_ids = root_ids;
        self.recompute_all();
        self.data_structure_version = self.current_version.clone();
    }

    fn recompute_all(&mut self) {
        let mut changed = 0usize;
        for item in self.items_by_id.values_mut() {
            if item.refresh_completeness() {
                changed += 1;
            }
        }
        debug!(
            "event=recompute_completeness module=store status=ok items={} changed={}",
            self.items_by_id.len(),
            changed
        );
    }

    /// Empty and tagged with the current version.
    fn is_pristine(&self) -> bool {
        self.items_by_id.is_empty()
            && self.parent_by_id.is_empty()
            && self.root_ids.is_empty()
            && self.data_structure_version == self.current_version
    }

    fn clear_items(&mut self) {
        self.items_by_id.clear();
        self.parent_by_id.clear();
        self.root_ids.clear();
        self.data_structure_version = self.current_version.clone();
    }

    /// Detaches one id from its parent and the roots, then drops its entries.
    fn unlink(&mut self, id: &ItemId) {
        if let Some(parent_id) = self.parent_of(id) {
            if let Some(parent) = self.items_by_id.get_mut(&parent_id) {
                parent.child_ids.retain(|child| child != id);
            }
        }
        self.root_ids.retain(|root| root != id);
        self.items_by_id.remove(id);
        self.parent_by_id.remove(id);
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.notify(&snapshot);
    }
}
