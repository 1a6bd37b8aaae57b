use crate::backup::write_backup;
use crate::cli::BackupTarget;
use anyhow::Result;
use sbmig_sync::{RemoteDatasource, RemoteEntry, Space, Transport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Serialize)]
struct DatasourceBackup {
    datasource: RemoteDatasource,
    datasource_entries: Vec<RemoteEntry>,
}

async fn datasource_backup<T: Transport>(
    space: &Space<T>,
    datasource: RemoteDatasource,
) -> Result<DatasourceBackup> {
    let datasource_entries = space.get_entries_by_id(datasource.id).await?;
    Ok(DatasourceBackup {
        datasource,
        datasource_entries,
    })
}

/// Handle the `backup` command. Returns the files written.
pub(crate) async fn handle_backup_command<T: Transport>(
    space: &Space<T>,
    workdir: &Path,
    target: BackupTarget,
) -> Result<Vec<PathBuf>> {
    let written = match target {
        BackupTarget::Components { name: Some(name), .. } => {
            let component = space.get_component(&name).await?;
            vec![write_backup(workdir, "components", &format!("component-{name}"), &component)?]
        }
        BackupTarget::Components { name: None, .. } => {
            let components = space.get_all_components().await?;
            vec![write_backup(workdir, "components", "all-components-backup", &components)?]
        }
        BackupTarget::Presets { id: Some(id), .. } => {
            let preset = space.get_preset(id).await?;
            vec![write_backup(workdir, "presets", &format!("preset-{id}"), &preset)?]
        }
        BackupTarget::Presets { id: None, .. } => {
            let presets = space.get_all_presets().await?;
            vec![write_backup(workdir, "presets", "all-presets-backup", &presets)?]
        }
        BackupTarget::ComponentPresets { name } => {
            let presets = space.get_component_presets(&name).await?;
            if presets.is_empty() {
                warn!(component = %name, "No presets to back up");
                Vec::new()
            } else {
                vec![write_backup(
                    workdir,
                    "component-presets",
                    &format!("component-{name}-all_presets"),
                    &presets,
                )?]
            }
        }
        BackupTarget::Datasources { name: Some(name), .. } => {
            let datasource = space.get_datasource(&name).await?;
            let backup = datasource_backup(space, datasource).await?;
            vec![write_backup(workdir, "datasources", &format!("datasource-{name}"), &backup)?]
        }
        BackupTarget::Datasources { name: None, .. } => {
            let mut backups = Vec::new();
            for datasource in space.get_all_datasources().await? {
                backups.push(datasource_backup(space, datasource).await?);
            }
            vec![write_backup(workdir, "datasources", "all-datasources-backup", &backups)?]
        }
    };
    for path in &written {
        println!("{}", path.display());
    }
    Ok(written)
}
