//! Migrate command implementation

use anyhow::Result;
use tm_engine::{MigrationRunner, RunEvent};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{connect, load_config, open_lister};

/// Execute the migrate command
pub async fn execute(_args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?.validate()?;
    let lister = open_lister(&config)?;
    let session = connect(&config)?;

    let outcome = {
        let runner = MigrationRunner::new(&*session, &lister, &config.ledger_table)?;
        runner
            .run_with(|event| match event {
                RunEvent::Skipped(script) => println!("Skipping already applied: {script}"),
                RunEvent::Applying { script, statements } => {
                    if global.verbose {
                        println!("Applying: {script} ({statements} statements)");
                    }
                }
                RunEvent::Applied(applied) => println!("Applied: {}", applied.script),
            })
            .await
    };

    // The run error takes precedence over a failed close.
    let closed = session.release();
    let report = outcome?;
    closed?;

    if global.verbose {
        println!(
            "{} applied, {} skipped in {:.2?}",
            report.applied_count(),
            report.skipped_count(),
            report.elapsed
        );
    }
    println!("All migrations complete.");
    Ok(())
}
