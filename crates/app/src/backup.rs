//! Timestamped JSON backups under the working directory.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// `<label>-<RFC 3339 timestamp>.json`, with characters that are awkward in
/// file names (`:` and path separators) replaced by `-`.
pub fn backup_file_name(label: &str, at: OffsetDateTime) -> Result<String> {
    let stamp = at.format(&Rfc3339).context("formatting backup timestamp")?;
    let name = format!("{label}-{stamp}.json");
    Ok(name.replace([':', '/', '\\'], "-"))
}

/// Writes `content` as pretty JSON to `<workdir>/<folder>/<label>-<now>.json`
/// and returns the file path.
pub fn write_backup<T: Serialize + ?Sized>(
    workdir: &Path,
    folder: &str,
    label: &str,
    content: &T,
) -> Result<PathBuf> {
    write_backup_at(workdir, folder, label, content, OffsetDateTime::now_utc())
}

pub(crate) fn write_backup_at<T: Serialize + ?Sized>(
    workdir: &Path,
    folder: &str,
    label: &str,
    content: &T,
    at: OffsetDateTime,
) -> Result<PathBuf> {
    let dir = workdir.join(folder);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(backup_file_name(label, at)?);
    let text = serde_json::to_string_pretty(content).context("serializing backup")?;
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "{} written to a file", label);
    Ok(path)
}
