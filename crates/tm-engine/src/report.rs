//! Outcome types returned by the runner

use crate::ledger::LedgerEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tm_core::ScriptDescriptor;

/// A script applied during this run
#[derive(Debug, Clone, Serialize)]
pub struct AppliedScript {
    pub script: ScriptDescriptor,
    pub statements: usize,
    pub installed_on: DateTime<Utc>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Applied scripts in apply order
    pub applied: Vec<AppliedScript>,
    /// Scripts found already recorded in the ledger
    pub skipped: Vec<ScriptDescriptor>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of scripts applied
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Number of scripts skipped
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Versions applied in this run, in order
    pub fn applied_versions(&self) -> Vec<i32> {
        self.applied.iter().map(|a| a.script.version).collect()
    }
}

/// Read-only comparison of the ledger against the discovered scripts
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Ledger entries, ascending by version
    pub applied: Vec<LedgerEntry>,
    /// Discovered scripts with no ledger entry, in apply order
    pub pending: Vec<ScriptDescriptor>,
    /// Ledger entries whose script is no longer discovered
    pub missing: Vec<LedgerEntry>,
}

impl StatusReport {
    /// True when every discovered script is recorded
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}
