//! Persistence adapter contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the load/save contract used to persist store snapshots.
//! - Keep SQL and JSON encoding details out of the store.
//!
//! # Invariants
//! - Repositories store the snapshot payload verbatim; version decisions
//!   belong to `WorkItemStore::restore`.

pub mod snapshot_repo;
