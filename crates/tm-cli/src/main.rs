//! Tidemark CLI - versioned schema migrations for keyspaces

use clap::Parser;

mod cli;
mod commands;
mod embedded;

use cli::{Cli, Commands, MigrateArgs};
use commands::common::ExitCode;
use commands::{list, migrate, status};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        None => migrate::execute(&MigrateArgs::default(), &cli.global).await,
        Some(Commands::Migrate(args)) => migrate::execute(args, &cli.global).await,
        Some(Commands::Status(args)) => status::execute(args, &cli.global).await,
        Some(Commands::List(args)) => list::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug output with `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
