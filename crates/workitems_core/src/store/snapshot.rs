//! Owned, serializable views of store state.
//!
//! # Invariants
//! - Snapshots never borrow from the store; mutating one leaves the store as is.
//! - Item records carry `id, type, fields, childIds` only; status is not persisted.

use crate::model::item::{Fields, ItemId, ItemType, WorkItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted shape of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub fields: Fields,
    #[serde(default)]
    pub child_ids: Vec<ItemId>,
}

impl From<&WorkItem> for ItemRecord {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind.clone(),
            fields: item.fields.clone(),
            child_ids: item.child_ids.clone(),
        }
    }
}

impl From<ItemRecord> for WorkItem {
    /// Status starts at its default; callers recompute completeness.
    fn from(record: ItemRecord) -> Self {
        let mut item = WorkItem::new(record.id, record.kind, record.fields);
        item.child_ids = record.child_ids;
        item
    }
}

/// Result of `WorkItemStore::export_data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub items_by_id: BTreeMap<ItemId, ItemRecord>,
    pub parent_by_id: BTreeMap<ItemId, Option<ItemId>>,
    pub root_ids: Vec<ItemId>,
}

/// Durable snapshot exchanged with the persistence adapter.
///
/// Also the payload delivered to store subscribers after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub items_by_id: BTreeMap<ItemId, ItemRecord>,
    #[serde(default)]
    pub parent_by_id: BTreeMap<ItemId, Option<ItemId>>,
    #[serde(default)]
    pub root_ids: Vec<ItemId>,
    /// `None` when the snapshot predates versioning.
    #[serde(default)]
    pub data_structure_version: Option<String>,
}

impl PersistedSnapshot {
    pub fn from_export(export: ExportData, version: impl Into<String>) -> Self {
        Self {
            items_by_id: export.items_by_id,
            parent_by_id: export.parent_by_id,
            root_ids: export.root_ids,
            data_structure_version: Some(version.into()),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items_by_id.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
