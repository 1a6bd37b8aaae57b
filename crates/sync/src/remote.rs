//! Read access to a remote space: datasources, entries, components and presets.

use crate::error::{ResourceKind, SyncError, SyncResult};
use crate::models::{RemoteComponent, RemoteDatasource, RemoteEntry};
use crate::pagination::collect_all_pages;
use crate::transport::{ApiResponse, Query, Transport};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{error, info, warn};

pub const DEFAULT_PER_PAGE: usize = 100;
pub const MAX_PER_PAGE: usize = 1000;
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Per-space settings every core operation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceConfig {
    pub space_id: String,
    /// Page size for listing calls.
    pub per_page: usize,
    /// Maximum number of remote mutations in flight at once.
    pub concurrency: usize,
}

impl SpaceConfig {
    pub fn new(space_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            per_page: DEFAULT_PER_PAGE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.space_id.trim().is_empty() {
            return Err(SyncError::Config("space id is empty".into()));
        }
        Ok(())
    }
}

/// A transport bound to one space's configuration.
pub struct Space<T> {
    transport: T,
    config: SpaceConfig,
}

impl<T: Transport> Space<T> {
    pub fn new(transport: T, config: SpaceConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `spaces/{id}/{rest}`
    pub(crate) fn path(&self, rest: &str) -> String {
        format!("spaces/{}/{}", self.config.space_id, rest)
    }

    async fn get_page(
        &self,
        path: &str,
        mut query: Query,
        per_page: usize,
        page: usize,
    ) -> SyncResult<ApiResponse> {
        query.push(("per_page".into(), per_page.to_string()));
        query.push(("page".into(), page.to_string()));
        Ok(self.transport.get(path, &query).await?)
    }

    /// Every datasource in the space.
    ///
    /// A 404 on the first page means the space has no datasources yet and
    /// yields an empty list.
    pub async fn get_all_datasources(&self) -> SyncResult<Vec<RemoteDatasource>> {
        info!(space = %self.config.space_id, "Trying to get all datasources");
        let path = self.path("datasources/");
        let datasources = collect_all_pages(self.config.per_page, "datasources", |per_page, page| {
            let path = path.as_str();
            async move {
                match self.get_page(path, Vec::new(), per_page, page).await {
                    Err(SyncError::Transport(e)) if page == 1 && e.is_not_found() => {
                        warn!(
                            space = %self.config.space_id,
                            "There are no datasources in this space"
                        );
                        Ok(ApiResponse::empty())
                    }
                    other => other,
                }
            }
        })
        .await
        .inspect_err(|e| {
            error!(space = %self.config.space_id, error = %e, "Failed to list datasources")
        })?;
        info!(count = datasources.len(), "Amount of datasources");
        Ok(datasources)
    }

    /// The datasource whose name matches exactly.
    pub async fn get_datasource(&self, name: &str) -> SyncResult<RemoteDatasource> {
        info!(datasource = %name, "Trying to get datasource");
        let all = self.get_all_datasources().await?;
        find_by_name(all, name).ok_or_else(|| {
            warn!(datasource = %name, "There is no datasource with this name");
            SyncError::not_found(ResourceKind::Datasource, name)
        })
    }

    /// Entries of the datasource named `name`, resolved by exact name first.
    pub async fn get_datasource_entries(&self, name: &str) -> SyncResult<Vec<RemoteEntry>> {
        info!(datasource = %name, "Trying to get datasource entries");
        let datasource = self.get_datasource(name).await?;
        self.get_entries_by_id(datasource.id).await
    }

    /// Entries of the datasource with the given remote id.
    pub async fn get_entries_by_id(&self, datasource_id: u64) -> SyncResult<Vec<RemoteEntry>> {
        let path = self.path("datasource_entries/");
        let query: Query = vec![("datasource_id".into(), datasource_id.to_string())];
        collect_all_pages(self.config.per_page, "datasource_entries", |per_page, page| {
            self.get_page(&path, query.clone(), per_page, page)
        })
        .await
    }

    pub async fn get_all_components(&self) -> SyncResult<Vec<RemoteComponent>> {
        info!(space = %self.config.space_id, "Trying to get all components");
        let path = self.path("components/");
        collect_all_pages(self.config.per_page, "components", |per_page, page| {
            self.get_page(&path, Vec::new(), per_page, page)
        })
        .await
    }

    pub async fn get_component(&self, name: &str) -> SyncResult<RemoteComponent> {
        info!(component = %name, "Trying to get component");
        self.get_all_components()
            .await?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                warn!(component = %name, "There is no component with this name");
                SyncError::not_found(ResourceKind::Component, name)
            })
    }

    pub async fn get_all_presets(&self) -> SyncResult<Vec<Value>> {
        info!(space = %self.config.space_id, "Trying to get all presets");
        let path = self.path("presets/");
        collect_all_pages(self.config.per_page, "presets", |per_page, page| {
            self.get_page(&path, Vec::new(), per_page, page)
        })
        .await
    }

    pub async fn get_preset(&self, id: u64) -> SyncResult<Value> {
        info!(preset = id, "Trying to get preset");
        let response = self
            .transport
            .get(&self.path(&format!("presets/{id}")), &Vec::new())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SyncError::not_found(ResourceKind::Preset, id.to_string())
                } else {
                    e.into()
                }
            })?;
        match response.data.get("preset") {
            Some(preset) if !preset.is_null() => Ok(preset.clone()),
            _ => Err(SyncError::not_found(ResourceKind::Preset, id.to_string())),
        }
    }

    /// Every preset attached to the named component.
    ///
    /// A component without presets yields an empty list. Presets that fail to
    /// load are logged and left out.
    pub async fn get_component_presets(&self, name: &str) -> SyncResult<Vec<Value>> {
        info!(component = %name, "Trying to get all component presets");
        let component = self.get_component(name).await?;
        if component.all_presets.is_empty() {
            warn!(component = %name, "There are no presets for this component");
            return Ok(Vec::new());
        }

        let results: Vec<_> = stream::iter(component.all_presets.iter().map(|p| p.id))
            .map(|id| async move { (id, self.get_preset(id).await) })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        Ok(results
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(preset) => Some(preset),
                Err(e) => {
                    error!(preset = id, error = %e, "Failed to get preset");
                    None
                }
            })
            .collect())
    }
}

/// First remote datasource whose name equals `name` exactly.
pub fn find_by_name(datasources: Vec<RemoteDatasource>, name: &str) -> Option<RemoteDatasource> {
    datasources.into_iter().find(|d| d.name == name)
}
