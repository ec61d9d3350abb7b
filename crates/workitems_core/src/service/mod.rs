//! Use-case services over the work-item store.
//!
//! # Responsibility
//! - Validate user gestures before they reach the lenient store.
//! - Wire the store to its persistence adapter.

pub mod command_service;
pub mod persistence;
