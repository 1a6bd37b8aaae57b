//! CLI command handlers for the sbmig application.

mod backup;
mod discover;
mod sync;

pub(crate) use backup::handle_backup_command;
pub(crate) use discover::handle_discover_command;
pub(crate) use sync::handle_sync_datasources_command;

use anyhow::Result;
use sbmig_discovery::DiscoveryConfig;
use sbmig_state::RuntimeConfig;
use sbmig_sync::{HttpTransport, Space, SpaceConfig};
use std::path::Path;

/// Builds an authenticated client for the configured space.
pub(crate) fn connect(config: &RuntimeConfig) -> Result<Space<HttpTransport>> {
    let space = SpaceConfig::new(config.space_id()?)
        .with_per_page(config.per_page)
        .with_concurrency(config.concurrency);
    space.validate()?;
    let transport = HttpTransport::new(
        config.api_url.as_str(),
        config.oauth_token()?,
        config.request_timeout,
    )?;
    tracing::debug!(space = %space.space_id, api = transport.base_url(), "connected");
    Ok(Space::new(transport, space))
}

/// Discovery layout for the project rooted at `root`.
pub(crate) fn discovery_config(config: &RuntimeConfig, root: &Path) -> DiscoveryConfig {
    DiscoveryConfig {
        root: root.to_path_buf(),
        local_dirs: config.components_directories.clone(),
        external_dir: config.external_directory.clone(),
        component_ext: config.schema_file_ext.clone(),
        datasource_ext: config.datasource_ext.clone(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sbmig_sync::{HttpTransport, Space, SpaceConfig};
    use std::time::Duration;
    use wiremock::MockServer;

    pub(crate) fn space_for(server: &MockServer) -> Space<HttpTransport> {
        let transport =
            HttpTransport::new(server.uri(), "test-token", Duration::from_secs(5)).unwrap();
        Space::new(transport, SpaceConfig::new("7"))
    }
}
