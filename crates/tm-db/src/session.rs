//! Session trait definition and scoped lifetime guard

use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::ops::Deref;

/// A single bound parameter or returned column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Integer payload, if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Text payload, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Timestamp payload, if this is a timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

/// One result row, columns in select order
pub type Row = Vec<Value>;

/// Connection to the store migrations run against.
///
/// Implementations must be Send + Sync for async operation. Statements run
/// one at a time; each commits under the store's own consistency model.
#[async_trait]
pub trait Session: Send + Sync {
    /// Execute one statement without parameters
    async fn execute(&self, statement: &str) -> DbResult<()>;

    /// Execute one statement with positional parameters, returning affected rows
    async fn execute_with(&self, statement: &str, params: &[Value]) -> DbResult<usize>;

    /// Run a query and collect every row
    async fn query(&self, statement: &str) -> DbResult<Vec<Row>>;

    /// Backend identifier for logging
    fn backend(&self) -> &'static str;

    /// Release the underlying connection. Calling it twice is a no-op.
    fn close(&self) -> DbResult<()>;
}

/// Owns a session for the length of a run and releases it on every exit
/// path.
///
/// Call [`ScopedSession::release`] to observe close errors; otherwise the
/// session is closed on drop and failures are logged.
pub struct ScopedSession<S: Session> {
    session: S,
    released: bool,
}

impl<S: Session> ScopedSession<S> {
    /// Take ownership of an open session
    pub fn new(session: S) -> Self {
        log::debug!("Acquired {} session", session.backend());
        Self {
            session,
            released: false,
        }
    }

    /// Close the session now and report the outcome
    pub fn release(mut self) -> DbResult<()> {
        self.released = true;
        log::debug!("Releasing {} session", self.session.backend());
        self.session.close()
    }
}

impl<S: Session> Deref for ScopedSession<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> Drop for ScopedSession<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        log::debug!("Releasing {} session on drop", self.session.backend());
        if let Err(e) = self.session.close() {
            log::warn!("Failed to close {} session: {e}", self.session.backend());
        }
    }
}

/// Read column `index` of `row` as a 32-bit version number
pub fn column_i32(row: &Row, index: usize) -> DbResult<i32> {
    let raw = row
        .get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| DbError::UnexpectedValue(format!("column {index} is not an integer")))?;
    i32::try_from(raw)
        .map_err(|_| DbError::UnexpectedValue(format!("column {index} value {raw} exceeds int")))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
