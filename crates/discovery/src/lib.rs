//! Filesystem discovery of component and datasource definition files.
//!
//! Definitions are found by file extension in two scopes: the project's own
//! directories (`local`) and installed packages (`external`).
//!
//! # Examples
//!
//! ```
//! use sbmig_discovery::{discover_definitions, DefinitionKind, DiscoveryConfig, Scope};
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! let dir = temp.path().join("src/datasources");
//! std::fs::create_dir_all(&dir).unwrap();
//! std::fs::write(dir.join("colors.sb.datasource.json"), "{}").unwrap();
//!
//! let config = DiscoveryConfig::new(temp.path());
//! let found = discover_definitions(&config, DefinitionKind::Datasource, Scope::Local);
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name, "colors");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Directory walking and name resolution.
pub mod scanner;
/// Types describing discovered definitions.
pub mod types;

pub use scanner::{
    discover_all, discover_definitions, discover_many_definitions, resolve_definitions,
    DiscoveryConfig, DEFAULT_COMPONENT_EXT, DEFAULT_DATASOURCE_EXT,
};
pub use types::{DefinitionFile, DefinitionKind, Discovered, DuplicateInfo, Scope};
