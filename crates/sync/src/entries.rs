//! Applies entry-level create/update decisions for one datasource.

use crate::error::SyncResult;
use crate::models::{LocalEntry, RemoteEntry};
use crate::reconcile::{plan_entry, EntryPlan, SyncAction};
use crate::remote::Space;
use crate::report::{EntryBatchReport, EntryFailure, SkipReason};
use crate::transport::Transport;
use futures::stream::{self, StreamExt};
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Drops later local entries that repeat an earlier entry's name.
fn dedupe_local(entries: &[LocalEntry]) -> (Vec<&LocalEntry>, Vec<SkipReason>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut skipped = Vec::new();
    for entry in entries {
        if seen.insert(entry.name.as_str()) {
            kept.push(entry);
        } else {
            skipped.push(SkipReason::DuplicateName {
                item: entry.name.clone(),
            });
        }
    }
    (kept, skipped)
}

async fn apply_entry<T: Transport>(
    space: &Space<T>,
    entry: &LocalEntry,
    plan: &EntryPlan,
) -> SyncResult<()> {
    if !entry.dimension_value.is_empty() {
        debug!(
            entry = %entry.name,
            dimension_value = ?entry.dimension_value,
            "per-dimension values are not sent with the entry"
        );
    }
    let body = json!({ "datasource_entry": plan.payload() });
    match plan {
        EntryPlan::Create(_) => {
            space
                .transport()
                .post(&space.path("datasource_entries/"), &body)
                .await?;
        }
        EntryPlan::Update { id, .. } => {
            space
                .transport()
                .put(&space.path(&format!("datasource_entries/{id}")), &body)
                .await?;
        }
    }
    Ok(())
}

/// Creates or updates every local entry of datasource `datasource_id`.
///
/// Matching runs against the `remote` snapshot only, so entries are issued
/// concurrently (up to the space's fan-out width). A failing entry is
/// recorded in the report and does not affect its siblings.
pub async fn sync_entries<T: Transport>(
    space: &Space<T>,
    datasource_id: u64,
    local: &[LocalEntry],
    remote: &[RemoteEntry],
) -> EntryBatchReport {
    let mut report = EntryBatchReport::new(datasource_id);
    let (entries, skipped) = dedupe_local(local);
    for skip in &skipped {
        warn!(datasource_id, "{}", skip.description());
    }
    report.skipped = skipped;

    let results: Vec<_> = stream::iter(entries)
        .map(|entry| async move {
            let plan = plan_entry(entry, datasource_id, remote);
            let result = apply_entry(space, entry, &plan).await;
            (entry, plan.action(), result)
        })
        .buffer_unordered(space.config().concurrency)
        .collect()
        .await;

    for (entry, action, result) in results {
        match result {
            Ok(()) => match action {
                SyncAction::Create => report.created += 1,
                SyncAction::Update => report.updated += 1,
            },
            Err(e) => {
                error!(
                    datasource_id,
                    entry = %entry.name,
                    ?action,
                    error = %e,
                    "Datasource entry sync failed"
                );
                report.failed.push(EntryFailure {
                    name: entry.name.clone(),
                    action,
                    error: e.to_string(),
                });
            }
        }
    }
    report.failed.sort_by(|a, b| a.name.cmp(&b.name));

    if report.success() {
        info!(
            datasource_id,
            created = report.created,
            updated = report.updated,
            "Datasource entries for datasource id {} have been successfully synced",
            datasource_id
        );
    } else {
        warn!(
            datasource_id,
            failed = report.failed.len(),
            synced = report.synced(),
            "Datasource entries for datasource id {} synced with failures",
            datasource_id
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::remote::SpaceConfig;
    use crate::transport::{ApiResponse, MockTransport};
    use serde_json::{Map, Value};

    fn remote_entry(id: u64, name: &str) -> RemoteEntry {
        RemoteEntry {
            id,
            name: name.into(),
            value: "old".into(),
            dimension_value: None,
            datasource_id: Some(3),
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn creates_new_and_updates_matched_entries() {
        let mut mock = MockTransport::new();
        mock.expect_post()
            .withf(|path: &str, body: &Value| {
                path == "spaces/9/datasource_entries/"
                    && body["datasource_entry"]["name"] == "blue"
                    && body["datasource_entry"].get("id").is_none()
                    && body["datasource_entry"]["datasource_id"] == 3
            })
            .times(1)
            .returning(|_, _| Ok(ApiResponse::default()));
        mock.expect_put()
            .withf(|path: &str, body: &Value| {
                path == "spaces/9/datasource_entries/77"
                    && body["datasource_entry"]["id"] == 77
                    && body["datasource_entry"]["value"] == "#f00"
            })
            .times(1)
            .returning(|_, _| Ok(ApiResponse::default()));

        let space = Space::new(mock, SpaceConfig::new("9"));
        let report = sync_entries(
            &space,
            3,
            &[LocalEntry::new("red", "#f00"), LocalEntry::new("blue", "#00f")],
            &[remote_entry(77, "red")],
        )
        .await;

        assert!(report.success());
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
    }

    #[tokio::test]
    async fn one_failing_entry_does_not_fail_its_siblings() {
        let mut mock = MockTransport::new();
        mock.expect_post()
            .times(3)
            .returning(|_, body| {
                if body["datasource_entry"]["name"] == "b" {
                    Err(TransportError::Status {
                        status: 422,
                        body: "invalid".into(),
                    })
                } else {
                    Ok(ApiResponse::default())
                }
            });

        let space = Space::new(mock, SpaceConfig::new("9").with_concurrency(2));
        let local = [
            LocalEntry::new("a", "1"),
            LocalEntry::new("b", "2"),
            LocalEntry::new("c", "3"),
        ];
        let report = sync_entries(&space, 3, &local, &[]).await;

        assert_eq!(report.created, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "b");
        assert_eq!(report.failed[0].action, SyncAction::Create);
        assert!(!report.success());
    }

    #[tokio::test]
    async fn duplicate_local_names_keep_the_first_declaration() {
        let mut mock = MockTransport::new();
        mock.expect_post()
            .withf(|_: &str, body: &Value| body["datasource_entry"]["value"] == "first")
            .times(1)
            .returning(|_, _| Ok(ApiResponse::default()));

        let space = Space::new(mock, SpaceConfig::new("9"));
        let report = sync_entries(
            &space,
            3,
            &[LocalEntry::new("dup", "first"), LocalEntry::new("dup", "second")],
            &[],
        )
        .await;

        assert_eq!(report.created, 1);
        assert_eq!(
            report.skipped,
            vec![SkipReason::DuplicateName { item: "dup".into() }]
        );
    }

    #[tokio::test]
    async fn empty_local_list_issues_no_calls() {
        let space = Space::new(MockTransport::new(), SpaceConfig::new("9"));
        let report = sync_entries(&space, 3, &[], &[remote_entry(1, "kept")]).await;
        assert_eq!(report, EntryBatchReport::new(3));
    }
}
