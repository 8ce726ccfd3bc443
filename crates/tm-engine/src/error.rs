//! Error types for tm-engine

use thiserror::Error;
use tm_core::CoreError;
use tm_db::DbError;

/// Errors that abort a migration run
#[derive(Error, Debug)]
pub enum EngineError {
    /// Discovery, naming, or configuration failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// G001: Ledger table could not be created
    #[error("[G001] Failed to initialize ledger '{table}': {source}")]
    LedgerInit { table: String, source: DbError },

    /// G002: Applied versions could not be read
    #[error("[G002] Failed to read ledger '{table}': {source}")]
    LedgerRead { table: String, source: DbError },

    /// G003: A statement failed; earlier statements of the script stay applied
    #[error("[G003] Migration {filename} (version {version}) failed at statement {index}: {source}\n  statement: {statement}")]
    Execution {
        version: i32,
        filename: String,
        /// 1-based position of the statement within the script
        index: usize,
        statement: String,
        source: DbError,
    },

    /// G004: The script was applied but its ledger entry was not written
    #[error("[G004] Migration {filename} (version {version}) was applied but could not be recorded: {source}. The schema has changed without a ledger entry; the next run will execute this script again from its first statement.")]
    Write {
        version: i32,
        filename: String,
        source: DbError,
    },

    /// G005: Ledger table name is not a plain identifier
    #[error("[G005] Invalid ledger table name '{0}'")]
    InvalidLedgerTable(String),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
