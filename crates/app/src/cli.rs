use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line interface for the `sbmig` application.
#[derive(Debug, Parser)]
#[command(
    name = "sbmig",
    version,
    about = "Syncs locally declared Storyblok datasources into a remote space"
)]
pub struct Cli {
    /// Outputs extra debugging.
    #[arg(short, long, global = true, env = "SBMIG_DEBUG", default_value_t = false)]
    pub debug: bool,
    /// Path to the config file (default: `./sbmig.config.json`).
    #[arg(long, global = true, env = "SBMIG_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Target space id.
    #[arg(long, global = true, env = "STORYBLOK_SPACE_ID", value_name = "ID")]
    pub space_id: Option<String>,
    /// Management API token.
    #[arg(
        long,
        global = true,
        env = "STORYBLOK_OAUTH_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN"
    )]
    pub token: Option<String>,
    /// Management API base URL.
    #[arg(long, global = true, env = "STORYBLOK_API_URL", value_name = "URL")]
    pub api_url: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `sbmig` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Creates or updates remote objects from local definition files.
    Sync {
        #[command(subcommand)]
        target: SyncTarget,
    },
    /// Writes remote objects to timestamped JSON files in the working directory.
    Backup {
        #[command(subcommand)]
        target: BackupTarget,
    },
    /// Lists definition files found in the project and its packages.
    Discover {
        /// What to look for.
        #[arg(value_enum)]
        kind: DiscoverKind,
    },
}

/// What `sync` operates on.
#[derive(Debug, Subcommand)]
pub enum SyncTarget {
    /// Syncs datasources and their entries.
    Datasources {
        /// Datasource names to sync (local definitions win over packages).
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        names: Vec<String>,
        /// Syncs every discovered datasource definition.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
}

/// What `backup` writes.
#[derive(Debug, Subcommand)]
pub enum BackupTarget {
    /// Backs up one component by name, or all of them.
    Components {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Backs up one preset by id, or all of them.
    Presets {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<u64>,
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Backs up every preset attached to a component.
    ComponentPresets {
        /// Component name.
        name: String,
    },
    /// Backs up one datasource with its entries, or all datasources.
    Datasources {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,
        #[arg(long, default_value_t = false)]
        all: bool,
    },
}

/// Definition kinds `discover` can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscoverKind {
    Components,
    Datasources,
}
