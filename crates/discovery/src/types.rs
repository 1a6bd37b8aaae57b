use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a definition file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The project's own definition directories.
    Local,
    /// Installed packages (`node_modules` by default).
    External,
}

impl Scope {
    /// Returns a stable label for this scope.
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::External => "external",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The kind of definition a file declares; selects the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    /// Component schema files.
    Component,
    /// Datasource definition files.
    Datasource,
}

impl DefinitionKind {
    /// Plural label used in logs and output folders.
    pub fn plural(&self) -> &'static str {
        match self {
            DefinitionKind::Component => "components",
            DefinitionKind::Datasource => "datasources",
        }
    }
}

/// A definition file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionFile {
    /// File name without the definition extension.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// Scope the file was found in.
    pub scope: Scope,
    /// Path relative to the project root, when it can be expressed.
    pub relative: Option<PathBuf>,
}

/// Records a definition name found more than once; the first one is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateInfo {
    /// Definition name.
    pub name: String,
    /// Path that was used.
    pub kept: PathBuf,
    /// Path that was ignored.
    pub skipped: PathBuf,
}

/// Definitions of one kind, split by scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovered {
    /// Definitions from the project's own directories.
    pub local: Vec<DefinitionFile>,
    /// Definitions from installed packages.
    pub external: Vec<DefinitionFile>,
}

impl Discovered {
    /// Names in local-then-external order.
    pub fn names(&self) -> Vec<String> {
        self.local
            .iter()
            .chain(&self.external)
            .map(|d| d.name.clone())
            .collect()
    }

    /// Every definition, local first.
    pub fn all(&self) -> impl Iterator<Item = &DefinitionFile> {
        self.local.iter().chain(&self.external)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, scope: Scope) -> DefinitionFile {
        DefinitionFile {
            name: name.into(),
            path: PathBuf::from(format!("/p/{name}.sb.datasource.json")),
            scope,
            relative: None,
        }
    }

    #[test]
    fn names_list_local_before_external() {
        let found = Discovered {
            local: vec![file("b", Scope::Local)],
            external: vec![file("a", Scope::External)],
        };
        assert_eq!(found.names(), vec!["b", "a"]);
        assert_eq!(found.all().count(), 2);
    }

    #[test]
    fn scope_display_uses_label() {
        assert_eq!(Scope::Local.to_string(), "local");
        assert_eq!(Scope::External.to_string(), Scope::External.label());
    }
}
