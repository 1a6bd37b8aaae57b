//! Create-or-update decisions for datasources and entries.
//!
//! The planning functions are pure: they only look at the local definition and
//! a snapshot of remote state. [`apply_datasource`] turns a plan into a remote
//! mutation.

use crate::error::{SyncError, SyncResult};
use crate::models::{
    DatasourcePayload, Dimension, EntryPayload, LocalDatasource, LocalEntry, RemoteDatasource,
    RemoteEntry,
};
use crate::remote::Space;
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// What the engine decided to do with a local object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Create,
    Update,
}

/// Planned datasource mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasourcePlan {
    Create(DatasourcePayload),
    Update { id: u64, payload: DatasourcePayload },
}

impl DatasourcePlan {
    pub fn action(&self) -> SyncAction {
        match self {
            Self::Create(_) => SyncAction::Create,
            Self::Update { .. } => SyncAction::Update,
        }
    }

    pub fn payload(&self) -> &DatasourcePayload {
        match self {
            Self::Create(payload) | Self::Update { payload, .. } => payload,
        }
    }
}

/// Planned entry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPlan {
    Create(EntryPayload),
    Update { id: u64, payload: EntryPayload },
}

impl EntryPlan {
    pub fn action(&self) -> SyncAction {
        match self {
            Self::Create(_) => SyncAction::Create,
            Self::Update { .. } => SyncAction::Update,
        }
    }

    pub fn payload(&self) -> &EntryPayload {
        match self {
            Self::Create(payload) | Self::Update { payload, .. } => payload,
        }
    }
}

/// Remote dimensions in their original order, followed by local dimensions
/// whose name is not yet present remotely. Nothing remote is dropped or
/// rewritten.
pub fn merge_dimensions(remote: &[Dimension], local: &[Dimension]) -> Vec<Dimension> {
    let mut known: HashSet<&str> = remote.iter().map(|d| d.name.as_str()).collect();
    let mut merged = remote.to_vec();
    for dimension in local {
        if known.insert(dimension.name.as_str()) {
            merged.push(dimension.clone());
        }
    }
    merged
}

/// Matches on exact, case-sensitive `name`; the first remote match wins.
pub fn match_remote<'a>(
    local: &LocalDatasource,
    remote: &'a [RemoteDatasource],
) -> Option<&'a RemoteDatasource> {
    remote.iter().find(|r| r.name == local.name)
}

pub fn plan_datasource(local: &LocalDatasource, remote: &[RemoteDatasource]) -> DatasourcePlan {
    match match_remote(local, remote) {
        None => DatasourcePlan::Create(DatasourcePayload {
            id: None,
            name: local.name.clone(),
            slug: local.slug.clone(),
            dimensions: local.dimensions.clone(),
            dimensions_attributes: local.dimensions.clone(),
        }),
        Some(existing) => {
            let dimensions = merge_dimensions(&existing.dimensions, &local.dimensions);
            DatasourcePlan::Update {
                id: existing.id,
                payload: DatasourcePayload {
                    id: Some(existing.id),
                    name: local.name.clone(),
                    slug: local.slug.clone(),
                    dimensions_attributes: dimensions.clone(),
                    dimensions,
                },
            }
        }
    }
}

pub fn plan_entry(local: &LocalEntry, datasource_id: u64, remote: &[RemoteEntry]) -> EntryPlan {
    let existing = remote.iter().find(|r| r.name == local.name);
    let payload = EntryPayload {
        id: existing.map(|r| r.id),
        name: local.name.clone(),
        value: local.value.clone(),
        datasource_id,
    };
    match existing {
        Some(r) => EntryPlan::Update { id: r.id, payload },
        None => EntryPlan::Create(payload),
    }
}

/// Result of a successful datasource create/update.
#[derive(Debug, Clone)]
pub struct AppliedDatasource {
    pub action: SyncAction,
    /// The datasource as returned by the server.
    pub datasource: RemoteDatasource,
    /// The local entries to sync next, independent of what was sent.
    pub datasource_entries: Vec<LocalEntry>,
}

/// Creates or updates `local` against the `remote` snapshot.
///
/// A [`SyncError::Decode`] from this function means the server accepted the
/// mutation but its response could not be read. An update whose response
/// carries no datasource falls back to the matched id and the sent payload.
pub async fn apply_datasource<T: Transport>(
    space: &Space<T>,
    local: &LocalDatasource,
    remote: &[RemoteDatasource],
) -> SyncResult<AppliedDatasource> {
    let plan = plan_datasource(local, remote);
    let action = plan.action();
    debug!(datasource = %local.name, ?action, payload = ?plan.payload(), "datasource plan");

    let body = json!({ "datasource": plan.payload() });
    let response = match &plan {
        DatasourcePlan::Create(_) => {
            space
                .transport()
                .post(&space.path("datasources/"), &body)
                .await
        }
        DatasourcePlan::Update { id, .. } => {
            space
                .transport()
                .put(&space.path(&format!("datasources/{id}")), &body)
                .await
        }
    }
    .inspect_err(|e| {
        error!(datasource = %local.name, ?action, error = %e, "Datasource mutation failed")
    })?;

    let datasource = match (response.data.get("datasource"), &plan) {
        (None | Some(Value::Null), DatasourcePlan::Update { id, payload }) => {
            debug!(
                datasource = %local.name,
                id,
                "update response has no datasource, using the sent payload"
            );
            RemoteDatasource {
                id: *id,
                name: payload.name.clone(),
                slug: payload.slug.clone(),
                dimensions: payload.dimensions.clone(),
                extra: Map::new(),
            }
        }
        (returned, _) => serde_json::from_value(returned.cloned().unwrap_or_default())
            .map_err(|e| SyncError::decode("datasource", e))?,
    };

    info!(
        datasource = %datasource.name,
        datasource_id = datasource.id,
        ?action,
        "Datasource {}",
        match action {
            SyncAction::Create => "created",
            SyncAction::Update => "updated",
        }
    );

    Ok(AppliedDatasource {
        action,
        datasource,
        datasource_entries: local.datasource_entries.clone(),
    })
}
