//! End-to-end runs against DuckDB with scripts read from a directory

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;
use tm_core::{DirectorySource, ResourceLister, VersionParser};
use tm_db::{DbError, DbResult, DuckDbBackend, Row, Session, Value};
use tm_engine::{EngineError, MigrationRunner};

const LEDGER: &str = "schema_migrations";

/// DuckDB session that can be told to fail specific statements.
struct FaultySession {
    inner: DuckDbBackend,
    executed: Mutex<Vec<String>>,
    fail_marker: Mutex<Option<String>>,
    /// Ledger inserts left before every further insert fails
    inserts_allowed: AtomicUsize,
}

impl FaultySession {
    fn new() -> Self {
        Self {
            inner: DuckDbBackend::in_memory().unwrap(),
            executed: Mutex::new(Vec::new()),
            fail_marker: Mutex::new(None),
            inserts_allowed: AtomicUsize::new(usize::MAX),
        }
    }

    fn fail_statements_containing(&self, marker: &str) {
        *self.fail_marker.lock().unwrap() = Some(marker.to_string());
    }

    fn fail_ledger_inserts_after(&self, n: usize) {
        self.inserts_allowed.store(n, Ordering::SeqCst);
    }

    fn heal(&self) {
        *self.fail_marker.lock().unwrap() = None;
        self.inserts_allowed.store(usize::MAX, Ordering::SeqCst);
    }

    /// Script statements executed so far, excluding ledger DDL
    fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .filter(|s| !s.contains(LEDGER))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Session for FaultySession {
    async fn execute(&self, statement: &str) -> DbResult<()> {
        self.executed.lock().unwrap().push(statement.to_string());
        let injected = self
            .fail_marker
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|m| statement.contains(m));
        if injected {
            return Err(DbError::ExecutionError(format!("injected failure: {statement}")));
        }
        self.inner.execute(statement).await
    }

    async fn execute_with(&self, statement: &str, params: &[Value]) -> DbResult<usize> {
        if statement.starts_with("INSERT INTO") {
            let left = self.inserts_allowed.load(Ordering::SeqCst);
            if left == 0 {
                return Err(DbError::ExecutionError("injected ledger write failure".to_string()));
            }
            if left != usize::MAX {
                self.inserts_allowed.store(left - 1, Ordering::SeqCst);
            }
        }
        self.inner.execute_with(statement, params).await
    }

    async fn query(&self, statement: &str) -> DbResult<Vec<Row>> {
        self.inner.query(statement).await
    }

    fn backend(&self) -> &'static str {
        "faulty-duckdb"
    }

    fn close(&self) -> DbResult<()> {
        self.inner.close()
    }
}

fn write_scripts(dir: &Path, scripts: &[(&str, &str)]) {
    for (name, text) in scripts {
        std::fs::write(dir.join(name), text).unwrap();
    }
}

fn lister_for(dir: &TempDir) -> ResourceLister {
    let source = DirectorySource::open(dir.path()).unwrap();
    ResourceLister::new(Box::new(source), VersionParser::default())
}

fn table(n: i32) -> String {
    format!("CREATE TABLE t{n} (id int PRIMARY KEY);")
}

async fn applied_versions(session: &dyn Session) -> Vec<i32> {
    let mut versions: Vec<i32> = session
        .query(&format!("SELECT version FROM {LEDGER}"))
        .await
        .unwrap()
        .iter()
        .map(|row| row[0].as_i64().unwrap() as i32)
        .collect();
    versions.sort();
    versions
}

#[tokio::test]
async fn test_fresh_keyspace_applies_all_in_version_order() {
    let dir = TempDir::new().unwrap();
    write_scripts(
        dir.path(),
        &[
            ("V10__ten.cql", table(10).as_str()),
            ("V2__two.cql", table(2).as_str()),
            ("V1__one.cql", table(1).as_str()),
            ("notes.txt", "ignored"),
        ],
    );
    let session = FaultySession::new();
    let lister = lister_for(&dir);
    let runner = MigrationRunner::new(&session, &lister, LEDGER).unwrap();

    let report = runner.run().await.unwrap();
    assert_eq!(report.applied_versions(), vec![1, 2, 10]);
    let expected: Vec<String> = [1, 2, 10]
        .iter()
        .map(|n| table(*n).trim_end_matches(';').to_string())
        .collect();
    assert_eq!(session.executed(), expected);
    assert_eq!(applied_versions(&session).await, vec![1, 2, 10]);
}

#[tokio::test]
async fn test_second_run_skips_everything() {
    let dir = TempDir::new().unwrap();
    write_scripts(
        dir.path(),
        &[
            ("V1__one.cql", table(1).as_str()),
            ("V2__two.cql", table(2).as_str()),
        ],
    );
    let session = FaultySession::new();
    let lister = lister_for(&dir);
    let runner = MigrationRunner::new(&session, &lister, LEDGER).unwrap();

    runner.run().await.unwrap();
    let executed_after_first = session.executed().len();

    let report = runner.run().await.unwrap();
    assert_eq!(report.applied_count(), 0);
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(session.executed().len(), executed_after_first);
}

#[tokio::test]
async fn test_only_pending_versions_applied_with_increasing_timestamps() {
    let dir = TempDir::new().unwrap();
    write_scripts(
        dir.path(),
        &[
            ("V1__one.cql", table(1).as_str()),
            ("V2__two.cql", table(2).as_str()),
        ],
    );
    let session = FaultySession::new();
    let lister = lister_for(&dir);
    MigrationRunner::new(&session, &lister, LEDGER)
        .unwrap()
        .run()
        .await
        .unwrap();

    write_scripts(
        dir.path(),
        &[
            ("V3__three.cql", table(3).as_str()),
            ("V4__four.cql", table(4).as_str()),
        ],
    );
    let executed_before = session.executed().len();
    let lister = lister_for(&dir);
    let runner = MigrationRunner::new(&session, &lister, LEDGER).unwrap();
    let report = runner.run().await.unwrap();

    assert_eq!(report.applied_versions(), vec![3, 4]);
    let expected: Vec<String> = [3, 4]
        .iter()
        .map(|n| table(*n).trim_end_matches(';').to_string())
        .collect();
    assert_eq!(session.executed()[executed_before..], expected[..]);
    assert_eq!(
        report.skipped.iter().map(|s| s.version).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let entries = runner.ledger().entries().await.unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries[1].installed_on < entries[2].installed_on);
    assert!(entries[2].installed_on < entries[3].installed_on);
    assert_eq!(entries[3].description, "V4__four.cql");
}

#[tokio::test]
async fn test_statement_failure_aborts_without_recording() {
    let dir = TempDir::new().unwrap();
    write_scripts(
        dir.path(),
        &[
            ("V4__four.cql", table(4).as_str()),
            (
                "V5__five.cql",
                "CREATE TABLE t5 (id int PRIMARY KEY);\nCREATE TABLE boom (id int PRIMARY KEY);",
            ),
            ("V6__six.cql", table(6).as_str()),
        ],
    );
    let session = FaultySession::new();
    session.fail_statements_containing("boom");
    let lister = lister_for(&dir);
    let runner = MigrationRunner::new(&session, &lister, LEDGER).unwrap();

    let err = runner.run().await.unwrap_err();
    match &err {
        EngineError::Execution {
            version,
            filename,
            index,
            statement,
            ..
        } => {
            assert_eq!(*version, 5);
            assert_eq!(filename, "V5__five.cql");
            assert_eq!(*index, 2);
            assert!(statement.contains("boom"));
        }
        other => panic!("expected Execution, got {other:?}"),
    }
    assert!(err.to_string().contains("[G003]"));

    assert_eq!(applied_versions(&session).await, vec![4]);
    // First statement of V5 stays applied.
    assert!(session.query("SELECT * FROM t5").await.is_ok());
    assert!(!session.executed().iter().any(|s| s.contains("t6")));
}

#[tokio::test]
async fn test_ledger_write_failure_then_retry_reexecutes_script() {
    let dir = TempDir::new().unwrap();
    write_scripts(
        dir.path(),
        &[
            ("V1__one.cql", table(1).as_str()),
            ("V2__two.cql", table(2).as_str()),
        ],
    );
    let session = FaultySession::new();
    session.fail_ledger_inserts_after(1);
    let lister = lister_for(&dir);
    let runner = MigrationRunner::new(&session, &lister, LEDGER).unwrap();

    let err = runner.run().await.unwrap_err();
    assert!(matches!(err, EngineError::Write { version: 2, .. }));
    assert!(err.to_string().contains("[G004]"));

    // Schema changed, ledger did not.
    assert!(session.query("SELECT * FROM t2").await.is_ok());
    assert_eq!(applied_versions(&session).await, vec![1]);

    // The retry runs V2 from its first statement, which is not idempotent.
    session.heal();
    let err = runner.run().await.unwrap_err();
    match err {
        EngineError::Execution { version, index, .. } => {
            assert_eq!(version, 2);
            assert_eq!(index, 1);
        }
        other => panic!("expected Execution, got {other:?}"),
    }
    assert_eq!(applied_versions(&session).await, vec![1]);
}

#[tokio::test]
async fn test_missing_directory_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = DirectorySource::open(&dir.path().join("absent")).err().unwrap();
    assert!(matches!(err, tm_core::CoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_empty_directory_is_a_successful_noop() {
    let dir = TempDir::new().unwrap();
    let session = FaultySession::new();
    let lister = lister_for(&dir);
    let report = MigrationRunner::new(&session, &lister, LEDGER)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.applied_count() + report.skipped_count(), 0);
    assert!(applied_versions(&session).await.is_empty());
}
