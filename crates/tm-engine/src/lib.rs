//! tm-engine - Migration engine for Tidemark
//!
//! Applies discovered scripts in ascending version order against a
//! [`tm_db::Session`], skipping versions already recorded in the ledger and
//! recording each script once all of its statements have succeeded.

pub mod error;
pub mod ledger;
pub mod report;
pub mod runner;

pub use error::{EngineError, EngineResult};
pub use ledger::{LedgerEntry, LedgerStore};
pub use report::{AppliedScript, RunReport, StatusReport};
pub use runner::{MigrationRunner, RunEvent};
