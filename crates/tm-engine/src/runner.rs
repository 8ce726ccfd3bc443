//! Sequential migration runner.
//!
//! Each discovered script moves through skip, apply and record in ascending
//! version order. The first failure aborts the run: no later script is
//! attempted and the failing script gets no ledger entry. Statements are not
//! wrapped in a transaction, so a script that fails part way leaves its
//! earlier statements applied.

use crate::error::{EngineError, EngineResult};
use crate::ledger::LedgerStore;
use crate::report::{AppliedScript, RunReport, StatusReport};
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::BTreeSet;
use std::time::Instant;
use tm_core::{ResourceLister, ScriptDescriptor};
use tm_db::Session;

/// Progress notification emitted while a run is in flight
#[derive(Debug)]
pub enum RunEvent<'e> {
    /// Version already recorded; nothing executed
    Skipped(&'e ScriptDescriptor),
    /// About to execute the script's statements
    Applying {
        script: &'e ScriptDescriptor,
        statements: usize,
    },
    /// Every statement succeeded and the ledger entry is written
    Applied(&'e AppliedScript),
}

/// Applies pending scripts from a lister through one session
pub struct MigrationRunner<'a> {
    session: &'a dyn Session,
    lister: &'a ResourceLister,
    ledger: LedgerStore<'a>,
}

impl<'a> MigrationRunner<'a> {
    /// Create a runner recording into `ledger_table`
    pub fn new(
        session: &'a dyn Session,
        lister: &'a ResourceLister,
        ledger_table: &str,
    ) -> EngineResult<Self> {
        Ok(Self {
            session,
            lister,
            ledger: LedgerStore::new(session, ledger_table)?,
        })
    }

    /// The ledger this runner records into
    pub fn ledger(&self) -> &LedgerStore<'a> {
        &self.ledger
    }

    /// Apply every pending script
    pub async fn run(&self) -> EngineResult<RunReport> {
        self.run_with(|_| {}).await
    }

    /// Apply every pending script, reporting progress to `observer`
    pub async fn run_with<F>(&self, mut observer: F) -> EngineResult<RunReport>
    where
        F: FnMut(RunEvent<'_>),
    {
        let started = Instant::now();

        // Discovery fails before the ledger is touched.
        let scripts = self.lister.list()?;
        log::debug!(
            "Discovered {} script(s) in {}",
            scripts.len(),
            self.lister.source().location()
        );

        self.ledger.ensure_initialized().await?;
        let applied = self.ledger.load_applied_versions().await?;

        let mut report = RunReport::default();
        let mut last_installed = None;

        for script in scripts {
            if applied.contains(&script.version) {
                log::debug!("Skipping v{:03} ({})", script.version, script.filename);
                observer(RunEvent::Skipped(&script));
                report.skipped.push(script);
                continue;
            }

            let outcome = self
                .apply(&script, &mut last_installed, &mut observer)
                .await?;
            observer(RunEvent::Applied(&outcome));
            report.applied.push(outcome);
        }

        report.elapsed = started.elapsed();
        log::info!(
            "Run finished: {} applied, {} skipped in {:.2?}",
            report.applied_count(),
            report.skipped_count(),
            report.elapsed
        );
        Ok(report)
    }

    async fn apply<F>(
        &self,
        descriptor: &ScriptDescriptor,
        last_installed: &mut Option<DateTime<Utc>>,
        observer: &mut F,
    ) -> EngineResult<AppliedScript>
    where
        F: FnMut(RunEvent<'_>),
    {
        let started = Instant::now();
        let script = self.lister.load(descriptor)?;
        let statements = script.statements();

        observer(RunEvent::Applying {
            script: descriptor,
            statements: statements.len(),
        });
        log::info!(
            "Applying v{:03} ({}) with {} statement(s)",
            script.version,
            script.filename,
            statements.len()
        );

        for (i, statement) in statements.iter().enumerate() {
            log::debug!("v{:03} statement {}: {}", script.version, i + 1, statement);
            self.session
                .execute(statement)
                .await
                .map_err(|source| EngineError::Execution {
                    version: script.version,
                    filename: script.filename.clone(),
                    index: i + 1,
                    statement: statement.clone(),
                    source,
                })?;
        }

        let installed_on = next_install_time(*last_installed);
        self.ledger
            .record_applied(script.version, &script.filename, installed_on)
            .await?;
        *last_installed = Some(installed_on);

        Ok(AppliedScript {
            script: descriptor.clone(),
            statements: statements.len(),
            installed_on,
            elapsed: started.elapsed(),
        })
    }

    /// Compare the ledger with the discovered scripts without executing any.
    ///
    /// The ledger table is created if missing so a fresh keyspace reports
    /// every script as pending.
    pub async fn status(&self) -> EngineResult<StatusReport> {
        let scripts = self.lister.list()?;
        self.ledger.ensure_initialized().await?;
        let applied = self.ledger.entries().await?;

        let recorded: BTreeSet<i32> = applied.iter().map(|e| e.version).collect();
        let discovered: BTreeSet<i32> = scripts.iter().map(|s| s.version).collect();

        let missing = applied
            .iter()
            .filter(|e| !discovered.contains(&e.version))
            .cloned()
            .collect();
        let pending = scripts
            .into_iter()
            .filter(|s| !recorded.contains(&s.version))
            .collect();

        Ok(StatusReport {
            applied,
            pending,
            missing,
        })
    }
}

/// Install time for the next ledger entry, strictly after `previous`.
///
/// Truncated to microseconds, the precision the ledger stores.
fn next_install_time(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
