//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tm_core::{MigrateConfig, ResourceLister};
use tm_db::{DuckDbBackend, ScopedSession};

use crate::cli::GlobalArgs;
use crate::embedded::BundledMigrations;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that the session guard still runs before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: a control-flow signal, never shown to the user.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Merge the config file with command-line and environment overrides.
///
/// The result is not validated; commands that open a session call
/// [`MigrateConfig::validate`] themselves.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<MigrateConfig> {
    let config = match &global.config {
        Some(path) => MigrateConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => MigrateConfig::load_from_dir(Path::new(&global.project_dir))
            .context("Failed to load config")?,
    };
    let config = config.apply(global.overrides());
    log::debug!("Resolved config: {config:?}");
    Ok(config)
}

/// Open the configured script location
pub(crate) fn open_lister(config: &MigrateConfig) -> Result<ResourceLister> {
    let location = config.location()?;
    let source = location.open::<BundledMigrations>()?;
    Ok(ResourceLister::new(source, config.version_parser()))
}

/// Open the session a run holds until it returns
pub(crate) fn connect(config: &MigrateConfig) -> Result<ScopedSession<DuckDbBackend>> {
    let backend = DuckDbBackend::connect(config)
        .with_context(|| format!("Failed to connect to keyspace '{}'", config.keyspace))?;
    Ok(ScopedSession::new(backend))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
