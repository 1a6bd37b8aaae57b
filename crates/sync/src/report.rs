//! Reporting types for tracking what a sync run created, updated, skipped
//! and failed.

use crate::reconcile::SyncAction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Reasons why a local item was not sent to the remote space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SkipReason {
    /// An earlier local entry in the same datasource has the same name.
    DuplicateName { item: String },
}

impl SkipReason {
    pub fn description(&self) -> String {
        match self {
            Self::DuplicateName { item } => {
                format!("{} is declared more than once (first declaration kept)", item)
            }
        }
    }

    /// Returns actionable guidance for the user.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            Self::DuplicateName { .. } => Some("Remove or rename the duplicate entry"),
        }
    }
}

/// A single entry mutation that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFailure {
    pub name: String,
    pub action: SyncAction,
    pub error: String,
}

/// Outcome of syncing one datasource's entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBatchReport {
    pub datasource_id: u64,
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkipReason>,
    pub failed: Vec<EntryFailure>,
}

impl EntryBatchReport {
    pub fn new(datasource_id: u64) -> Self {
        Self {
            datasource_id,
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn synced(&self) -> usize {
        self.created + self.updated
    }
}

/// Stages of one local definition's pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Loaded,
    Matched,
    RemoteMutationApplied,
    EntriesFetched,
    /// Every entry was attempted but at least one failed.
    EntriesReconciled,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loaded => "loaded",
            Self::Matched => "matched",
            Self::RemoteMutationApplied => "remote mutation applied",
            Self::EntriesFetched => "entries fetched",
            Self::EntriesReconciled => "entries reconciled",
            Self::Done => "done",
        })
    }
}

/// What happened to one local datasource definition.
///
/// `stage` is the last stage the pipeline reached; a failed pipeline also
/// carries the error that stopped it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceOutcome {
    pub name: String,
    pub source: PathBuf,
    pub action: Option<SyncAction>,
    pub datasource_id: Option<u64>,
    pub stage: PipelineStage,
    pub entries: Option<EntryBatchReport>,
    pub error: Option<String>,
}

impl DatasourceOutcome {
    pub(crate) fn started(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            action: None,
            datasource_id: None,
            stage: PipelineStage::Loaded,
            entries: None,
            error: None,
        }
    }

    pub(crate) fn fail(mut self, error: impl fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Pipeline reached `Done` and every entry was applied.
    pub fn success(&self) -> bool {
        self.error.is_none()
            && self.stage == PipelineStage::Done
            && self.entries.as_ref().map_or(true, EntryBatchReport::success)
    }
}

/// Complete report for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub datasources: Vec<DatasourceOutcome>,
}

impl SyncReport {
    pub fn success(&self) -> bool {
        self.datasources.iter().all(DatasourceOutcome::success)
    }

    fn count_action(&self, action: SyncAction) -> usize {
        self.datasources
            .iter()
            .filter(|o| o.action == Some(action) && o.stage >= PipelineStage::RemoteMutationApplied)
            .count()
    }

    pub fn created(&self) -> usize {
        self.count_action(SyncAction::Create)
    }

    pub fn updated(&self) -> usize {
        self.count_action(SyncAction::Update)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DatasourceOutcome> {
        self.datasources.iter().filter(|o| !o.success())
    }

    pub fn outcome(&self, name: &str) -> Option<&DatasourceOutcome> {
        self.datasources.iter().find(|o| o.name == name)
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Datasource sync: {} processed, {} created, {} updated, {} with failures\n",
            self.datasources.len(),
            self.created(),
            self.updated(),
            self.failed().count()
        ));
        for outcome in &self.datasources {
            let status = if outcome.success() { "ok" } else { "FAILED" };
            out.push_str(&format!("  [{}] {} ({})", status, outcome.name, outcome.stage));
            if let Some(entries) = &outcome.entries {
                out.push_str(&format!(
                    ": entries {} created, {} updated, {} skipped, {} failed",
                    entries.created,
                    entries.updated,
                    entries.skipped.len(),
                    entries.failed.len()
                ));
            }
            out.push('\n');
            if let Some(error) = &outcome.error {
                out.push_str(&format!("      error: {}\n", error));
            }
            for failure in outcome.entries.iter().flat_map(|e| &e.failed) {
                out.push_str(&format!("      entry '{}': {}\n", failure.name, failure.error));
            }
            for skip in outcome.entries.iter().flat_map(|e| &e.skipped) {
                out.push_str(&format!("      skipped: {}\n", skip.description()));
            }
        }
        out
    }
}
