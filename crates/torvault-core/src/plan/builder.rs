use crate::classify::CapabilityGate;
use crate::diff::compute_diff;
use crate::errors::Result;
use crate::model::{BackupManifest, LiveState};
use crate::plan::exclude::apply_exclusions;
use crate::plan::model::RestorePlan;
use crate::plan::request::PlanRequest;

/// Pure half of plan building: validate, diff, filter
///
/// The caller is responsible for loading `manifest` and `live`.
///
/// # Errors
///
/// `DuplicateHash`, `EmptyHash` or `EmptyCategoryName` if the manifest is
/// invalid.
pub fn assemble_plan(
    request: &PlanRequest,
    manifest: &BackupManifest,
    live: &LiveState,
    gate: &dyn CapabilityGate,
) -> Result<RestorePlan> {
    manifest.validate()?;

    let diff = compute_diff(manifest, live, request.mode, gate);
    let plan = RestorePlan::from_diff(request.run_id.clone(), request.mode, diff);

    Ok(apply_exclusions(plan, &request.exclude))
}
