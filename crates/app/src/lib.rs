//! This crate provides the `sbmig` application: command-line parsing,
//! configuration layering, logging setup and the command handlers that drive
//! datasource sync, backups and discovery.
//!
//! The main entry point is the [`run`] function. Everything else is internal
//! and may change without notice.

#![deny(unsafe_code)]

pub mod backup;
mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, SyncTarget};
use sbmig_state::{config_file, load_settings, Overrides, RuntimeConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The main entry point for the `sbmig` application.
///
/// Individual datasource or entry failures are reported in the printed
/// summary and do not change the exit status; configuration and backup
/// errors do.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config_path = cli.config.unwrap_or_else(config_file);
    let settings = load_settings(&config_path)?.unwrap_or_default();
    let config = RuntimeConfig::resolve(
        Overrides {
            space_id: cli.space_id,
            oauth_token: cli.token,
            api_url: cli.api_url,
        },
        settings,
    );
    tracing::debug!(?config_path, api = %config.api_url, "configuration resolved");

    let root = std::env::current_dir()?;
    let discovery = commands::discovery_config(&config, &root);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Commands::Sync {
            target: SyncTarget::Datasources { names, all },
        } => {
            let space = commands::connect(&config)?;
            rt.block_on(commands::handle_sync_datasources_command(
                space, &discovery, &names, all,
            ));
            Ok(())
        }
        Commands::Backup { target } => {
            let space = commands::connect(&config)?;
            rt.block_on(commands::handle_backup_command(
                &space,
                &config.working_directory,
                target,
            ))?;
            Ok(())
        }
        Commands::Discover { kind } => {
            commands::handle_discover_command(&discovery, &config.working_directory, kind)?;
            Ok(())
        }
    }
}
