//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use tm_core::ConfigOverrides;

/// Tidemark - versioned schema migrations for keyspaces
#[derive(Parser, Debug)]
#[command(name = "tm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (default: migrate)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory searched for tidemark.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Explicit config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Keyspace the scripts run against
    #[arg(short, long, global = true, env = "ASTRA_DB_KEYSPACE")]
    pub keyspace: Option<String>,

    /// Authentication token
    #[arg(long, global = true, env = "ASTRA_DB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the connection bundle
    #[arg(short, long, global = true, env = "ASTRA_SCB_PATH")]
    pub bundle: Option<String>,

    /// Script location: a directory or `embedded:` for the bundled scripts
    #[arg(short, long, global = true, env = "TIDEMARK_MIGRATIONS")]
    pub migrations: Option<String>,

    /// Script file extension
    #[arg(long, global = true)]
    pub extension: Option<String>,

    /// Ledger table name
    #[arg(long, global = true)]
    pub ledger_table: Option<String>,
}

impl GlobalArgs {
    /// Values that override the config file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            keyspace: self.keyspace.clone(),
            token: self.token.clone(),
            bundle_path: self.bundle.clone(),
            migrations: self.migrations.clone(),
            extension: self.extension.clone(),
            ledger_table: self.ledger_table.clone(),
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending migration
    Migrate(MigrateArgs),

    /// Show applied and pending migrations without running any
    Status(StatusArgs),

    /// List discovered migration scripts in apply order
    List(ListArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Exit with status 1 when migrations are pending
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
