//! Sync orchestrator that runs every local definition through
//! load → match → mutate → fetch entries → reconcile entries.

use crate::entries::sync_entries;
use crate::error::{SyncError, SyncResult};
use crate::local::load_datasources;
use crate::models::{LocalDatasource, RemoteDatasource};
use crate::reconcile::{apply_datasource, plan_datasource};
use crate::remote::Space;
use crate::report::{DatasourceOutcome, PipelineStage, SyncReport};
use crate::transport::Transport;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

fn name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Orchestrates datasource sync against one remote space.
pub struct SyncOrchestrator<T> {
    space: Space<T>,
}

impl<T: Transport> SyncOrchestrator<T> {
    pub fn new(space: Space<T>) -> Self {
        Self { space }
    }

    pub fn space(&self) -> &Space<T> {
        &self.space
    }

    /// Loads `files` and syncs every definition that parsed.
    pub async fn sync_datasources(&self, files: &[PathBuf]) -> SyncReport {
        info!(count = files.len(), "Trying to sync provided datasources");
        self.sync_loaded(load_datasources(files)).await
    }

    /// Syncs already-loaded definitions.
    ///
    /// The remote datasource list is fetched once and shared by all
    /// pipelines. Pipelines run concurrently and never abort each other; the
    /// report holds one outcome per input, in input order.
    pub async fn sync_loaded(
        &self,
        loaded: Vec<(PathBuf, SyncResult<LocalDatasource>)>,
    ) -> SyncReport {
        let mut report = SyncReport::default();
        let mut ready = Vec::new();
        for (path, result) in loaded {
            match result {
                Ok(local) => ready.push((path, local)),
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        error = %e,
                        "Skipping definition that failed to load"
                    );
                    report
                        .datasources
                        .push(DatasourceOutcome::started(name_from_path(&path), path).fail(e));
                }
            }
        }
        if ready.is_empty() {
            return report;
        }

        let remote = match self.space.get_all_datasources().await {
            Ok(remote) => remote,
            Err(e) => {
                error!(
                    error = %e,
                    "Cannot decide create or update without the remote datasource list"
                );
                report.datasources.extend(ready.into_iter().map(|(path, local)| {
                    DatasourceOutcome::started(local.name, path).fail(&e)
                }));
                return report;
            }
        };

        let outcomes: Vec<DatasourceOutcome> = stream::iter(ready)
            .map(|(path, local)| self.run_pipeline(path, local, &remote))
            .buffered(self.space.config().concurrency)
            .collect()
            .await;
        report.datasources.extend(outcomes);
        report
    }

    async fn run_pipeline(
        &self,
        source: PathBuf,
        local: LocalDatasource,
        remote: &[RemoteDatasource],
    ) -> DatasourceOutcome {
        let mut outcome = DatasourceOutcome::started(local.name.clone(), source);

        outcome.action = Some(plan_datasource(&local, remote).action());
        outcome.stage = PipelineStage::Matched;

        let applied = match apply_datasource(&self.space, &local, remote).await {
            Ok(applied) => applied,
            Err(e @ SyncError::Decode { .. }) => {
                // The server accepted the mutation; only its response was unreadable.
                outcome.stage = PipelineStage::RemoteMutationApplied;
                return outcome.fail(e);
            }
            Err(e) => return outcome.fail(e),
        };
        outcome.stage = PipelineStage::RemoteMutationApplied;
        outcome.datasource_id = Some(applied.datasource.id);

        let remote_entries = match self.space.get_entries_by_id(applied.datasource.id).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    datasource = %applied.datasource.name,
                    error = %e,
                    "Failed to fetch remote datasource entries"
                );
                return outcome.fail(e);
            }
        };
        outcome.stage = PipelineStage::EntriesFetched;

        info!(
            datasource = %applied.datasource.name,
            local = applied.datasource_entries.len(),
            remote = remote_entries.len(),
            "Start syncing datasource entries"
        );
        let entries = sync_entries(
            &self.space,
            applied.datasource.id,
            &applied.datasource_entries,
            &remote_entries,
        )
        .await;
        // A batch with failed entries stops short of Done.
        outcome.stage = if entries.success() {
            PipelineStage::Done
        } else {
            PipelineStage::EntriesReconciled
        };
        outcome.entries = Some(entries);
        outcome
    }
}
