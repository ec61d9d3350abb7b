//! Work-item domain model.
//!
//! # Responsibility
//! - Define the canonical item shape shared by store, projection and commands.
//! - Own per-type default field sets and the completeness rule.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Item type and field-name set are fixed at creation.

pub mod item;
