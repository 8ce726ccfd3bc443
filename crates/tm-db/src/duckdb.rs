//! DuckDB session backend implementation

use crate::error::{DbError, DbResult};
use crate::session::{Row, Session, Value};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::Connection;
use std::path::Path;
use std::sync::Mutex;
use tm_core::MigrateConfig;

/// DuckDB session backend.
///
/// The connection bundle path names the database file and the keyspace
/// becomes the default schema. DuckDB has no authentication, so the
/// credential is accepted and not used.
pub struct DuckDbBackend {
    conn: Mutex<Option<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::wrap(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::wrap(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open the database named by `config.bundle_path` and switch to
    /// `config.keyspace`
    pub fn connect(config: &MigrateConfig) -> DbResult<Self> {
        let backend = Self::new(&config.bundle_path)?;
        if !config.token.is_empty() {
            log::debug!("duckdb backend does not authenticate; credential ignored");
        }
        backend.use_keyspace(&config.keyspace)?;
        Ok(backend)
    }

    /// Create the keyspace schema if needed and make it the default
    pub fn use_keyspace(&self, keyspace: &str) -> DbResult<()> {
        let quoted = keyspace.replace('"', "\"\"");
        let literal = keyspace.replace('\'', "''");
        self.with_conn(|conn| {
            conn.execute_batch(&format!(
                "CREATE SCHEMA IF NOT EXISTS \"{quoted}\"; SET schema = '{literal}';"
            ))
        })
        .map_err(|e| DbError::ConnectionError(format!("cannot use keyspace '{keyspace}': {e}")))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Run `f` against the open connection
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> duckdb::Result<T>) -> DbResult<T> {
        let guard = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        let conn = guard.as_ref().ok_or(DbError::Closed)?;
        Ok(f(conn)?)
    }

    /// Execute with parameters synchronously
    fn execute_with_sync(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            stmt.execute(duckdb::params_from_iter(params.iter().map(to_duckdb)))
        })
        .map_err(|e| match e {
            DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{msg}: {sql}")),
            other => other,
        })
    }

    /// Query all rows synchronously
    fn query_sync(&self, sql: &str) -> DbResult<Vec<Row>> {
        let raw = self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query([])?;
            let width = rows.as_ref().map(|s| s.column_count()).unwrap_or(0);

            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(row.get::<_, DuckValue>(i)?);
                }
                out.push(values);
            }
            Ok(out)
        })?;

        raw.into_iter()
            .map(|row| row.into_iter().map(from_duckdb).collect())
            .collect()
    }
}

fn to_duckdb(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Int(v) => DuckValue::BigInt(*v),
        Value::Text(v) => DuckValue::Text(v.clone()),
        Value::Timestamp(ts) => DuckValue::Timestamp(TimeUnit::Microsecond, ts.timestamp_micros()),
    }
}

fn from_duckdb(value: DuckValue) -> DbResult<Value> {
    Ok(match value {
        DuckValue::Null => Value::Null,
        DuckValue::TinyInt(v) => Value::Int(v.into()),
        DuckValue::SmallInt(v) => Value::Int(v.into()),
        DuckValue::Int(v) => Value::Int(v.into()),
        DuckValue::BigInt(v) => Value::Int(v),
        DuckValue::UTinyInt(v) => Value::Int(v.into()),
        DuckValue::USmallInt(v) => Value::Int(v.into()),
        DuckValue::UInt(v) => Value::Int(v.into()),
        DuckValue::Text(v) => Value::Text(v),
        DuckValue::Timestamp(unit, raw) => Value::Timestamp(timestamp_from(unit, raw)?),
        other => {
            return Err(DbError::UnexpectedValue(format!(
                "unsupported column value {other:?}"
            )))
        }
    })
}

fn timestamp_from(unit: TimeUnit, raw: i64) -> DbResult<DateTime<Utc>> {
    let micros = match unit {
        TimeUnit::Second => raw.checked_mul(1_000_000),
        TimeUnit::Millisecond => raw.checked_mul(1_000),
        TimeUnit::Microsecond => Some(raw),
        TimeUnit::Nanosecond => Some(raw / 1_000),
    };
    micros
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .ok_or_else(|| DbError::UnexpectedValue(format!("timestamp {raw} out of range")))
}

#[async_trait]
impl Session for DuckDbBackend {
    async fn execute(&self, statement: &str) -> DbResult<()> {
        self.execute_with_sync(statement, &[]).map(|_| ())
    }

    async fn execute_with(&self, statement: &str, params: &[Value]) -> DbResult<usize> {
        self.execute_with_sync(statement, params)
    }

    async fn query(&self, statement: &str) -> DbResult<Vec<Row>> {
        self.query_sync(statement)
    }

    fn backend(&self) -> &'static str {
        "duckdb"
    }

    fn close(&self) -> DbResult<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        match guard.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| DbError::ConnectionError(format!("close failed: {e}"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
