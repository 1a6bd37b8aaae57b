use crate::backup::write_backup;
use crate::cli::DiscoverKind;
use anyhow::Result;
use sbmig_discovery::{discover_all, DefinitionKind, DiscoveryConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle the `discover` command: lists definition names (local then
/// external) and saves them under `<workdir>/discoveries/`.
pub(crate) fn handle_discover_command(
    discovery: &DiscoveryConfig,
    workdir: &Path,
    kind: DiscoverKind,
) -> Result<PathBuf> {
    let kind = match kind {
        DiscoverKind::Components => DefinitionKind::Component,
        DiscoverKind::Datasources => DefinitionKind::Datasource,
    };
    let found = discover_all(discovery, kind);
    info!(
        kind = kind.plural(),
        local = found.local.len(),
        external = found.external.len(),
        "Discovered definitions"
    );
    for def in found.all() {
        let shown = def.relative.as_deref().unwrap_or(def.path.as_path());
        println!("{}\t{}\t{}", def.name, def.scope, shown.display());
    }
    write_backup(
        workdir,
        "discoveries",
        &format!("all-{}", kind.plural()),
        &found.names(),
    )
}
