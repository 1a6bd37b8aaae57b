//! Shared test utilities for sbmig crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the sbmig workspace.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = sbmig_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// A throwaway project directory laid out like an sbmig project.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct ProjectFixture {
    pub tempdir: tempfile::TempDir,
    /// `src/` inside the project, scanned for local definitions.
    pub src: PathBuf,
    /// `node_modules/` inside the project, scanned for external definitions.
    pub packages: PathBuf,
}

impl ProjectFixture {
    /// Creates `src/` and `node_modules/` under a fresh tempdir.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let src = tempdir.path().join("src");
        let packages = tempdir.path().join("node_modules");
        std::fs::create_dir_all(&src)?;
        std::fs::create_dir_all(&packages)?;
        Ok(Self {
            tempdir,
            src,
            packages,
        })
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.tempdir.path()
    }

    /// Writes `sbmig.config.json` at the project root.
    pub fn write_config(&self, config: &Value) -> std::io::Result<PathBuf> {
        self.write_json(&self.root().join("sbmig.config.json"), config)
    }

    /// Writes `<name>.sb.datasource.json` under `src/datasources/`.
    pub fn write_datasource(&self, name: &str, definition: &Value) -> std::io::Result<PathBuf> {
        let path = self
            .src
            .join("datasources")
            .join(format!("{name}.sb.datasource.json"));
        self.write_json(&path, definition)
    }

    /// Writes `<name>.sb.datasource.json` inside an installed package.
    pub fn write_external_datasource(
        &self,
        package: &str,
        name: &str,
        definition: &Value,
    ) -> std::io::Result<PathBuf> {
        let path = self
            .packages
            .join(package)
            .join(format!("{name}.sb.datasource.json"));
        self.write_json(&path, definition)
    }

    fn write_json(&self, path: &Path, value: &Value) -> std::io::Result<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(value)?;
        std::fs::write(path, text)?;
        Ok(path.to_path_buf())
    }
}

/// A minimal datasource definition with `entries` as `(name, value)` pairs.
pub fn datasource_definition(name: &str, entries: &[(&str, &str)]) -> Value {
    serde_json::json!({
        "name": name,
        "slug": name,
        "dimensions": [],
        "datasource_entries": entries
            .iter()
            .map(|(n, v)| serde_json::json!({ "name": n, "value": v }))
            .collect::<Vec<_>>(),
    })
}
