//! Ledger of applied migration versions.
//!
//! One row per successfully applied script, keyed by version and never
//! updated or deleted. Statements stay within what both CQL and SQL accept:
//! no `ORDER BY` and no `ON CONFLICT`, so sorting happens client side.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tm_core::config::is_plain_identifier;
use tm_db::{column_i32, DbError, Session, Value};

/// One applied script as recorded in the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub version: i32,
    pub description: String,
    pub installed_on: DateTime<Utc>,
}

/// Ledger table accessed through a borrowed session
pub struct LedgerStore<'s> {
    session: &'s dyn Session,
    table: String,
}

impl<'s> LedgerStore<'s> {
    /// Use `table` as the ledger. The name must be a plain identifier.
    pub fn new(session: &'s dyn Session, table: &str) -> EngineResult<Self> {
        if !is_plain_identifier(table) {
            return Err(EngineError::InvalidLedgerTable(table.to_string()));
        }
        Ok(Self {
            session,
            table: table.to_string(),
        })
    }

    /// Ledger table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the ledger table if it does not exist
    pub async fn ensure_initialized(&self) -> EngineResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (version int PRIMARY KEY, description text, installed_on timestamp)",
            self.table
        );
        self.session
            .execute(&sql)
            .await
            .map_err(|source| EngineError::LedgerInit {
                table: self.table.clone(),
                source,
            })
    }

    /// Every version currently recorded
    pub async fn load_applied_versions(&self) -> EngineResult<BTreeSet<i32>> {
        let rows = self
            .session
            .query(&format!("SELECT version FROM {}", self.table))
            .await
            .map_err(|e| self.read_error(e))?;

        rows.iter()
            .map(|row| column_i32(row, 0).map_err(|e| self.read_error(e)))
            .collect()
    }

    /// Append the entry for a fully applied script.
    ///
    /// Must only be called once every statement of the script has succeeded.
    /// A failure here leaves the schema changed with no entry, reported as
    /// [`EngineError::Write`].
    pub async fn record_applied(
        &self,
        version: i32,
        description: &str,
        installed_on: DateTime<Utc>,
    ) -> EngineResult<()> {
        let sql = format!(
            "INSERT INTO {} (version, description, installed_on) VALUES (?, ?, ?)",
            self.table
        );
        self.session
            .execute_with(
                &sql,
                &[
                    Value::Int(version.into()),
                    Value::Text(description.to_string()),
                    Value::Timestamp(installed_on),
                ],
            )
            .await
            .map_err(|source| EngineError::Write {
                version,
                filename: description.to_string(),
                source,
            })?;
        Ok(())
    }

    /// All entries, ascending by version
    pub async fn entries(&self) -> EngineResult<Vec<LedgerEntry>> {
        let rows = self
            .session
            .query(&format!(
                "SELECT version, description, installed_on FROM {}",
                self.table
            ))
            .await
            .map_err(|e| self.read_error(e))?;

        let mut entries = rows
            .iter()
            .map(|row| {
                let version = column_i32(row, 0)?;
                let description = match row.get(1) {
                    Some(Value::Null) | None => String::new(),
                    Some(v) => v
                        .as_str()
                        .ok_or_else(|| DbError::UnexpectedValue(format!("{v:?} is not text")))?
                        .to_string(),
                };
                let installed_on = row.get(2).and_then(Value::as_timestamp).ok_or_else(|| {
                    DbError::UnexpectedValue(format!("version {version} has no installed_on"))
                })?;
                Ok(LedgerEntry {
                    version,
                    description,
                    installed_on,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(|e| self.read_error(e))?;

        entries.sort_by_key(|e| e.version);
        Ok(entries)
    }

    fn read_error(&self, source: DbError) -> EngineError {
        EngineError::LedgerRead {
            table: self.table.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
