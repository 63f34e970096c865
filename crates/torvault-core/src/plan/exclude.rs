use crate::plan::model::RestorePlan;
use crate::plan::request::ExcludeSet;

/// Drop every torrent entry whose hash is in `exclude`
///
/// Category and tag buckets are never filtered. This is a view over the
/// computed plan: rebuilding with a smaller set brings the entries back
/// unchanged.
pub fn apply_exclusions(mut plan: RestorePlan, exclude: &ExcludeSet) -> RestorePlan {
    if exclude.is_empty() {
        return plan;
    }

    plan.torrents.add.retain(|a| !exclude.contains(a.hash()));
    plan.torrents.update.retain(|u| !exclude.contains(&u.hash));
    plan.torrents.delete.retain(|h| !exclude.contains(h));
    plan
}
