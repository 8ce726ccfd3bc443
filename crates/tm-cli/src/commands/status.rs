//! Status command implementation

use anyhow::{Context, Result};
use tm_engine::{MigrationRunner, StatusReport};

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{connect, load_config, open_lister, ExitCode};

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?.validate()?;
    let lister = open_lister(&config)?;
    let session = connect(&config)?;

    let outcome = {
        let runner = MigrationRunner::new(&*session, &lister, &config.ledger_table)?;
        runner.status().await
    };
    let closed = session.release();
    let report = outcome?;
    closed?;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
            println!("{json}");
        }
        OutputFormat::Table => print_table(&report, &config.keyspace, &config.ledger_table),
    }

    if args.check && !report.is_up_to_date() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_table(report: &StatusReport, keyspace: &str, ledger_table: &str) {
    println!("Keyspace: {keyspace} (ledger: {ledger_table})");
    println!();

    if report.applied.is_empty() && report.pending.is_empty() {
        println!("No migrations found.");
        return;
    }

    println!("{:<9} {:>8}  {:<40} INSTALLED ON", "STATE", "VERSION", "SCRIPT");
    for entry in &report.applied {
        let state = if report.missing.iter().any(|m| m.version == entry.version) {
            "missing"
        } else {
            "applied"
        };
        println!(
            "{:<9} {:>8}  {:<40} {}",
            state,
            entry.version,
            entry.description,
            entry.installed_on.format("%Y-%m-%d %H:%M:%S%.3f")
        );
    }
    for script in &report.pending {
        println!("{:<9} {:>8}  {:<40} -", "pending", script.version, script.filename);
    }

    println!();
    println!(
        "{} applied, {} pending",
        report.applied.len(),
        report.pending.len()
    );
}
