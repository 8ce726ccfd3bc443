//! List command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, ListArgs, OutputFormat};
use crate::commands::common::{load_config, open_lister};

/// Execute the list command. Needs no session.
pub async fn execute(args: &ListArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let lister = open_lister(&config)?;
    let scripts = lister.list()?;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&scripts).context("Failed to serialize scripts")?;
            println!("{json}");
        }
        OutputFormat::Table => {
            if scripts.is_empty() {
                println!("No migrations found in {}", lister.source().location());
                return Ok(());
            }
            for script in &scripts {
                println!("{:>8}  {}", script.version, script.filename);
            }
            println!();
            println!(
                "{} script(s) in {} ({})",
                scripts.len(),
                lister.source().location(),
                lister.source().medium()
            );
        }
    }
    Ok(())
}
