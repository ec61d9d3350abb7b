//! Core domain logic for the work-items manager.
//! This crate is the single source of truth for the Epic -> Feature/Solution
//! Intent -> Story tree, its persistence, and the gestures that edit it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{
    check_placement, default_fields, is_complete, FieldValue, Fields, ItemId, ItemStatus,
    ItemType, PlacementError, StatusPatch, WorkItem, FIELD_TITLE,
};
pub use projection::{StatusBadge, TreeNode, TreeProjection};
pub use repo::snapshot_repo::{
    SnapshotRepoError, SnapshotRepoResult, SnapshotRepository, SqliteSnapshotRepository,
    DEFAULT_WORKSPACE_KEY,
};
pub use service::command_service::{
    item_label, CommandError, CommandService, DeleteOutcome, DEFAULT_GENERATED_CHILDREN,
};
pub use service::persistence::{attach_autosave, restore_store};
pub use store::snapshot::{ExportData, ItemRecord, PersistedSnapshot};
pub use store::subscription::SubscriptionId;
pub use store::version::{SchemaVersion, VersionCheck, DATA_STRUCTURE_VERSION};
pub use store::WorkItemStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, DATA_STRUCTURE_VERSION};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn compiled_schema_version_parses() {
        assert!(super::SchemaVersion::parse(DATA_STRUCTURE_VERSION).is_some());
    }
}
