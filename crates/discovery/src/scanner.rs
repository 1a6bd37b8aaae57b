use crate::types::{DefinitionFile, DefinitionKind, Discovered, DuplicateInfo, Scope};
use pathdiff::diff_paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Default extension of component schema files.
pub const DEFAULT_COMPONENT_EXT: &str = "sb.json";
/// Default extension of datasource definition files.
pub const DEFAULT_DATASOURCE_EXT: &str = "sb.datasource.json";
/// Directory name never descended into during a local scan.
const PACKAGES_DIR: &str = "node_modules";

/// Where and what to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Project root every other directory is resolved against.
    pub root: PathBuf,
    /// Directories scanned in `Local` scope.
    pub local_dirs: Vec<PathBuf>,
    /// Directory scanned in `External` scope.
    pub external_dir: PathBuf,
    /// Component schema file extension, e.g. `sb.json`.
    pub component_ext: String,
    /// Datasource file extension, e.g. `sb.datasource.json`.
    pub datasource_ext: String,
}

impl DiscoveryConfig {
    /// Default layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            local_dirs: vec![PathBuf::from("src"), PathBuf::from("storyblok")],
            external_dir: PathBuf::from(PACKAGES_DIR),
            component_ext: DEFAULT_COMPONENT_EXT.into(),
            datasource_ext: DEFAULT_DATASOURCE_EXT.into(),
        }
    }

    /// File extension (without leading dot) for `kind`.
    pub fn extension(&self, kind: DefinitionKind) -> &str {
        let ext = match kind {
            DefinitionKind::Component => &self.component_ext,
            DefinitionKind::Datasource => &self.datasource_ext,
        };
        ext.trim_start_matches('.')
    }

    /// Absolute directories walked for `scope`.
    pub fn roots(&self, scope: Scope) -> Vec<PathBuf> {
        match scope {
            Scope::Local => self.local_dirs.iter().map(|d| self.root.join(d)).collect(),
            Scope::External => vec![self.root.join(&self.external_dir)],
        }
    }
}

fn is_packages_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == PACKAGES_DIR
}

/// Definition name for `file_name`, if it carries the `.{ext}` suffix.
fn definition_name(file_name: &str, ext: &str) -> Option<String> {
    let stem = file_name.strip_suffix(ext)?.strip_suffix('.')?;
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Finds every definition of `kind` in `scope`, sorted by path.
///
/// Missing roots are skipped. Unreadable entries are logged and skipped.
pub fn discover_definitions(
    config: &DiscoveryConfig,
    kind: DefinitionKind,
    scope: Scope,
) -> Vec<DefinitionFile> {
    let ext = config.extension(kind);
    let mut found = Vec::new();
    for root in config.roots(scope) {
        if !root.exists() {
            debug!(root = %root.display(), %scope, "discovery root does not exist");
            continue;
        }
        let walker = WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| scope == Scope::External || !is_packages_dir(e));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping unreadable path");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|file_name| definition_name(file_name, ext))
            else {
                continue;
            };
            let path = entry.into_path();
            found.push(DefinitionFile {
                name,
                relative: diff_paths(&path, &config.root),
                path,
                scope,
            });
        }
    }
    found.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(kind = kind.plural(), %scope, count = found.len(), "discovered definitions");
    found
}

/// Like [`discover_definitions`], keeping only definitions named in `names`.
pub fn discover_many_definitions(
    config: &DiscoveryConfig,
    kind: DefinitionKind,
    scope: Scope,
    names: &[String],
) -> Vec<DefinitionFile> {
    discover_definitions(config, kind, scope)
        .into_iter()
        .filter(|d| names.iter().any(|n| n == &d.name))
        .collect()
}

/// Every definition of `kind`, split by scope.
pub fn discover_all(config: &DiscoveryConfig, kind: DefinitionKind) -> Discovered {
    Discovered {
        local: discover_definitions(config, kind, Scope::Local),
        external: discover_definitions(config, kind, Scope::External),
    }
}

/// Picks one file per definition name, local before external, in path order.
///
/// With `names`, only those definitions are kept and requested names that
/// were not found are returned as the second element. Later files for a name
/// that was already picked are recorded in `dup_log`.
pub fn resolve_definitions(
    found: &Discovered,
    names: Option<&[String]>,
    mut dup_log: Option<&mut Vec<DuplicateInfo>>,
) -> (Vec<DefinitionFile>, Vec<String>) {
    let mut picked: Vec<DefinitionFile> = Vec::new();
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for def in found.all() {
        if let Some(names) = names {
            if !names.iter().any(|n| n == &def.name) {
                continue;
            }
        }
        if let Some(kept) = seen.get(def.name.as_str()) {
            if let Some(log) = dup_log.as_mut() {
                log.push(DuplicateInfo {
                    name: def.name.clone(),
                    kept: kept.to_path_buf(),
                    skipped: def.path.clone(),
                });
            }
            continue;
        }
        seen.insert(&def.name, &def.path);
        picked.push(def.clone());
    }

    let missing = names
        .map(|names| {
            names
                .iter()
                .filter(|n| !seen.contains_key(n.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    (picked, missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn name_is_file_name_minus_extension() {
        assert_eq!(
            definition_name("colors.sb.datasource.json", "sb.datasource.json"),
            Some("colors".into())
        );
        assert_eq!(definition_name("colors.json", "sb.datasource.json"), None);
        assert_eq!(definition_name(".sb.datasource.json", "sb.datasource.json"), None);
        assert_eq!(definition_name("xsb.datasource.json", "sb.datasource.json"), None);
    }

    #[test]
    fn local_scan_skips_packages_and_other_kinds() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "src/ds/colors.sb.datasource.json");
        touch(tmp.path(), "src/hero.sb.json");
        touch(tmp.path(), "src/node_modules/pkg/vendored.sb.datasource.json");
        touch(tmp.path(), "storyblok/sizes.sb.datasource.json");

        let config = DiscoveryConfig::new(tmp.path());
        let found = discover_definitions(&config, DefinitionKind::Datasource, Scope::Local);
        let names: Vec<_> = found.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["colors", "sizes"]);
        assert_eq!(
            found[0].relative.as_deref(),
            Some(Path::new("src/ds/colors.sb.datasource.json"))
        );

        let components = discover_definitions(&config, DefinitionKind::Component, Scope::Local);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "hero");
    }

    #[test]
    fn external_scan_walks_packages_dir() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "node_modules/@org/kit/colors.sb.datasource.json");

        let config = DiscoveryConfig::new(tmp.path());
        let found = discover_definitions(&config, DefinitionKind::Datasource, Scope::External);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].scope, Scope::External);
    }

    #[test]
    fn missing_roots_yield_nothing() {
        let tmp = tempdir().unwrap();
        let config = DiscoveryConfig::new(tmp.path().join("nope"));
        assert!(discover_all(&config, DefinitionKind::Datasource).local.is_empty());
    }

    #[test]
    fn custom_extension_with_leading_dot() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "src/a.ds.yaml");
        let mut config = DiscoveryConfig::new(tmp.path());
        config.datasource_ext = ".ds.yaml".into();
        let found = discover_definitions(&config, DefinitionKind::Datasource, Scope::Local);
        assert_eq!(found[0].name, "a");
    }

    #[test]
    fn resolve_prefers_local_and_reports_missing_names() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "src/colors.sb.datasource.json");
        touch(tmp.path(), "node_modules/kit/colors.sb.datasource.json");
        touch(tmp.path(), "node_modules/kit/sizes.sb.datasource.json");

        let config = DiscoveryConfig::new(tmp.path());
        let found = discover_all(&config, DefinitionKind::Datasource);
        let wanted = vec!["colors".to_string(), "sizes".to_string(), "ghost".to_string()];
        let mut dups = Vec::new();
        let (picked, missing) = resolve_definitions(&found, Some(&wanted), Some(&mut dups));

        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].scope, Scope::Local);
        assert_eq!(picked[1].name, "sizes");
        assert_eq!(missing, vec!["ghost".to_string()]);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].name, "colors");
    }
}
