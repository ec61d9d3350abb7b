//! Store <-> snapshot repository wiring.
//!
//! # Responsibility
//! - Restore the store from the saved snapshot at startup.
//! - Save a fresh snapshot after every store mutation.
//!
//! # Invariants
//! - Save failures are logged and swallowed; a mutation never fails because
//!   persistence did.

use crate::repo::snapshot_repo::{SnapshotRepoResult, SnapshotRepository};
use crate::store::subscription::SubscriptionId;
use crate::store::version::VersionCheck;
use crate::store::WorkItemStore;
use log::{error, info};
use std::time::Instant;

/// Loads the saved snapshot (if any) into `store` through the version check.
///
/// With nothing saved the store is initialized empty.
pub fn restore_store(
    store: &mut WorkItemStore,
    repo: &impl SnapshotRepository,
) -> SnapshotRepoResult<VersionCheck> {
    let started_at = Instant::now();
    let outcome = match repo.load_snapshot()? {
        Some(snapshot) => store.restore(snapshot),
        None => store.check_and_migrate_version(None),
    };
    info!(
        "event=snapshot_restore module=persistence status={} items={} duration_ms={}",
        outcome,
        store.len(),
        started_at.elapsed().as_millis()
    );
    Ok(outcome)
}

/// Subscribes `repo` to `store` so every mutation is saved.
///
/// Returns the subscription so the host can detach autosave on shutdown.
pub fn attach_autosave<R>(store: &mut WorkItemStore, repo: R) -> SubscriptionId
where
    R: SnapshotRepository + 'static,
{
    store.subscribe(move |snapshot| {
        let started_at = Instant::now();
        match repo.save_snapshot(snapshot) {
            Ok(()) => info!(
                "event=snapshot_save module=persistence status=ok items={} duration_ms={}",
                snapshot.item_count(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=snapshot_save module=persistence status=error items={} error={}",
                snapshot.item_count(),
                err
            ),
        }
    })
}
