//! tm-db - Database session layer for Tidemark
//!
//! This crate provides the `Session` trait the migration engine runs
//! statements through, a scoped guard that releases a session on every exit
//! path, and a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod session;

pub use self::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use session::{column_i32, Row, ScopedSession, Session, Value};
