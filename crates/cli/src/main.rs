//! Command-line interface for the `sbmig` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `sbmig-app` crate.

fn main() -> anyhow::Result<()> {
    sbmig_app::run()
}
