//! Loads local datasource definition files.

use crate::error::{SyncError, SyncResult};
use crate::models::LocalDatasource;
use std::fs;
use std::path::{Path, PathBuf};

fn load_error(path: &Path, message: impl ToString) -> SyncError {
    SyncError::Load {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Parses one definition file; YAML for `.yaml`/`.yml`, JSON otherwise.
pub fn load_datasource(path: &Path) -> SyncResult<LocalDatasource> {
    let text = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| load_error(path, e))
    } else {
        serde_json::from_str(&text).map_err(|e| load_error(path, e))
    }
}

/// Parses every file independently; one bad file does not affect the others.
pub fn load_datasources(paths: &[PathBuf]) -> Vec<(PathBuf, SyncResult<LocalDatasource>)> {
    paths
        .iter()
        .map(|path| (path.clone(), load_datasource(path)))
        .collect()
}
