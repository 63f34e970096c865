//! Plan building with I/O
//!
//! ## Steps
//! 1. Load the manifest for the run and the live state (concurrently)
//! 2. Validate, diff and classify (pure, in `torvault-core`)
//! 3. Filter torrent buckets by the exclusion set
//!
//! No mutation call is issued. Errors map onto the planning taxonomy:
//! an unknown run is `SnapshotNotFound`, any listing failure or timeout is
//! `LiveStateUnavailable`, a manifest that breaks its invariants is
//! `InvalidManifest`.

#![allow(clippy::result_large_err)]

use crate::ports::{bounded, CallFailure, ClientAdapter, SnapshotStore};
use std::time::Duration;
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::{assemble_plan, CapabilityGate, LiveState, PlanRequest, RestorePlan};

/// Read categories, tags and torrents from the client
///
/// Each listing is bounded by `op_timeout`; the first failure wins.
///
/// # Errors
///
/// `LiveStateUnavailable`, with the client failure or timeout as source.
pub async fn load_live_state(
    client: &dyn ClientAdapter,
    op_timeout: Duration,
) -> Result<LiveState, ExError> {
    let unavailable = |listing: &'static str| {
        let instance = client.instance_id().to_string();
        move |failure: CallFailure| {
            ExError::new(ExErrorKind::LiveStateUnavailable)
                .with_op(listing)
                .with_entity_id(instance)
                .with_message("could not read live client state")
                .with_source(ExError::from(failure))
        }
    };

    let (categories, tags, torrents) = tokio::try_join!(
        async {
            bounded(op_timeout, client.list_categories())
                .await
                .map_err(unavailable("list_categories"))
        },
        async {
            bounded(op_timeout, client.list_tags())
                .await
                .map_err(unavailable("list_tags"))
        },
        async {
            bounded(op_timeout, client.list_torrents())
                .await
                .map_err(unavailable("list_torrents"))
        },
    )?;

    Ok(LiveState::from_parts(categories, tags, torrents))
}

/// Compute a fresh plan for `request`
///
/// # Errors
///
/// `SnapshotNotFound`, `LiveStateUnavailable`, `InvalidManifest`, or any
/// other store failure unchanged.
pub async fn build_plan(
    request: &PlanRequest,
    store: &dyn SnapshotStore,
    client: &dyn ClientAdapter,
    gate: &dyn CapabilityGate,
    op_timeout: Duration,
) -> Result<RestorePlan, ExError> {
    let (manifest, live) = tokio::join!(
        store.get_manifest(&request.run_id),
        load_live_state(client, op_timeout)
    );

    let manifest = manifest.map_err(|e| match e.kind() {
        ExErrorKind::NotFound => ExError::new(ExErrorKind::SnapshotNotFound)
            .with_op("build_plan")
            .with_entity_id(request.run_id.clone())
            .with_message("no manifest recorded for backup run")
            .with_source(e),
        _ => e,
    })?;
    let live = live?;

    assemble_plan(request, &manifest, &live, gate).map_err(ExError::from)
}
