//! Markdown summaries of plans and results for review.

use crate::plan::RestorePlan;
use crate::result::RestoreResult;

/// Render a Markdown summary of a [`RestorePlan`].
///
/// Informational only; the structured plan is the source of truth.
pub fn render_plan_summary(plan: &RestorePlan) -> String {
    let mut out = String::new();

    out.push_str("## Restore Plan\n\n");
    out.push_str(&format!(
        "**Run**: `{}`  \n**Mode**: {}\n\n",
        plan.run_id, plan.mode
    ));

    if plan.is_empty() {
        out.push_str("_Live state already matches the backup._\n");
        return out;
    }

    let counts = plan.counts();
    out.push_str("| | Create/Add | Update | Delete |\n|---|---|---|---|\n");
    out.push_str(&format!(
        "| Categories | {} | {} | {} |\n",
        counts.categories_create, counts.categories_update, counts.categories_delete
    ));
    out.push_str(&format!(
        "| Tags | {} | - | {} |\n",
        counts.tags_create, counts.tags_delete
    ));
    out.push_str(&format!(
        "| Torrents | {} | {} | {} |\n\n",
        counts.torrents_add, counts.torrents_update, counts.torrents_delete
    ));

    if !plan.categories.is_empty() {
        out.push_str("### Categories\n\n");
        for c in &plan.categories.create {
            out.push_str(&format!("- create `{}` at `{}`\n", c.name, c.save_path));
        }
        for c in &plan.categories.update {
            out.push_str(&format!(
                "- update `{}`: `{}` -> `{}`\n",
                c.name, c.current_path, c.desired_path
            ));
        }
        for name in &plan.categories.delete {
            out.push_str(&format!("- delete `{}`\n", name));
        }
        out.push('\n');
    }

    if !plan.tags.is_empty() {
        out.push_str("### Tags\n\n");
        for t in &plan.tags.create {
            out.push_str(&format!("- create `{}`\n", t.name));
        }
        for name in &plan.tags.delete {
            out.push_str(&format!("- delete `{}`\n", name));
        }
        out.push('\n');
    }

    if !plan.torrents.is_empty() {
        out.push_str("### Torrents\n\n");
        for a in &plan.torrents.add {
            out.push_str(&format!(
                "- add `{}` {} ({} bytes)\n",
                short(a.hash()),
                a.manifest.name,
                a.manifest.size_bytes
            ));
        }
        for u in &plan.torrents.update {
            out.push_str(&format!("- update `{}` {}\n", short(&u.hash), u.desired.name));
            for change in &u.changes {
                let marker = if change.supported { "" } else { " **(manual)**" };
                out.push_str(&format!(
                    "  - {}: `{}` -> `{}`{}\n",
                    change.field, change.current, change.desired, marker
                ));
            }
        }
        for hash in &plan.torrents.delete {
            out.push_str(&format!("- delete `{}`\n", short(hash)));
        }
    }

    out
}

/// Render a Markdown summary of a [`RestoreResult`].
pub fn render_result_summary(result: &RestoreResult) -> String {
    let mut out = String::new();

    let heading = if result.dry_run {
        "## Restore Dry Run"
    } else {
        "## Restore Result"
    };
    out.push_str(heading);
    out.push_str("\n\n");
    out.push_str(&format!(
        "**Run**: `{}`  \n**Mode**: {}  \n**Plan**: {}\n\n",
        result.plan.run_id,
        result.mode,
        if result.plan_reused { "reused" } else { "fresh" }
    ));

    let a = &result.applied;
    let verb = if result.dry_run { "Would apply" } else { "Applied" };
    out.push_str(&format!("### {}\n\n", verb));
    out.push_str(&format!(
        "- categories: {} created, {} updated, {} deleted\n",
        a.categories.created, a.categories.updated, a.categories.deleted
    ));
    out.push_str(&format!(
        "- tags: {} created, {} deleted\n",
        a.tags.created, a.tags.deleted
    ));
    out.push_str(&format!(
        "- torrents: {} added, {} updated, {} deleted\n\n",
        a.torrents.added, a.torrents.updated, a.torrents.deleted
    ));

    if result.cancelled {
        out.push_str("_Cancelled before completion; remaining operations were skipped._\n\n");
    }

    if !result.warnings.is_empty() {
        out.push_str(&format!("### Warnings ({})\n\n", result.warnings.len()));
        for w in &result.warnings {
            out.push_str(&format!("- {}\n", w));
        }
        out.push('\n');
    }

    if !result.errors.is_empty() {
        out.push_str(&format!("### Errors ({})\n\n", result.errors.len()));
        for e in &result.errors {
            out.push_str(&format!(
                "- `{}` {} [{}]: {}\n",
                e.operation, e.target, e.code, e.message
            ));
        }
    }

    out
}

fn short(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{CategoryUpdate, RestoreDiff};
    use crate::model::RestoreMode;
    use crate::result::{AppliedCounts, OperationError, OperationKind};

    #[test]
    fn test_empty_plan_summary() {
        let plan = RestorePlan::from_diff("run-1", RestoreMode::Overwrite, RestoreDiff::default());
        let text = render_plan_summary(&plan);
        assert!(text.contains("already matches"));
    }

    #[test]
    fn test_plan_summary_lists_category_update() {
        let mut diff = RestoreDiff::default();
        diff.categories.update.push(CategoryUpdate {
            name: "Movies".into(),
            current_path: "/old".into(),
            desired_path: "/m".into(),
        });
        let plan = RestorePlan::from_diff("run-1", RestoreMode::Overwrite, diff);
        let text = render_plan_summary(&plan);
        assert!(text.contains("update `Movies`: `/old` -> `/m`"));
        assert!(text.contains("| Categories | 0 | 1 | 0 |"));
    }

    #[test]
    fn test_result_summary_lists_errors() {
        let plan = RestorePlan::from_diff("run-1", RestoreMode::Complete, RestoreDiff::default());
        let result = RestoreResult {
            dry_run: false,
            mode: RestoreMode::Complete,
            plan,
            applied: AppliedCounts::default(),
            warnings: vec!["tags not applied".into()],
            errors: vec![OperationError {
                operation: OperationKind::DeleteTorrent,
                target: "xyz".into(),
                message: "rejected".into(),
                code: "ERR_OPERATION_FAILED".into(),
            }],
            cancelled: false,
            plan_reused: true,
        };
        let text = render_result_summary(&result);
        assert!(text.starts_with("## Restore Result"));
        assert!(text.contains("**Plan**: reused"));
        assert!(text.contains("`delete_torrent` xyz [ERR_OPERATION_FAILED]: rejected"));
        assert!(text.contains("### Warnings (1)"));
    }
}
