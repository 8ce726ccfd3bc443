use super::*;
use chrono::TimeZone;
use tm_core::{CoreError, CoreResult, Medium, ScriptSource, VersionParser};
use tm_db::DuckDbBackend;

struct MemorySource(Vec<(&'static str, &'static str)>);

impl ScriptSource for MemorySource {
    fn medium(&self) -> Medium {
        Medium::Directory
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn entries(&self) -> CoreResult<Vec<String>> {
        Ok(self.0.iter().map(|(name, _)| name.to_string()).collect())
    }

    fn read(&self, filename: &str) -> CoreResult<String> {
        self.0
            .iter()
            .find(|(name, _)| *name == filename)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| CoreError::MissingScript {
                filename: filename.to_string(),
            })
    }
}

fn lister(files: Vec<(&'static str, &'static str)>) -> ResourceLister {
    ResourceLister::new(Box::new(MemorySource(files)), VersionParser::default())
}

#[test]
fn test_next_install_time_is_strictly_increasing() {
    let future = Utc::now() + chrono::Duration::hours(1);
    let next = next_install_time(Some(future));
    assert_eq!(next, future + chrono::Duration::microseconds(1));

    let past = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    assert!(next_install_time(Some(past)) > past);
    assert_eq!(next_install_time(None).timestamp_subsec_nanos() % 1_000, 0);
}

#[tokio::test]
async fn test_events_in_order() {
    let db = DuckDbBackend::in_memory().unwrap();
    let lister = lister(vec![
        ("V2__b.cql", "CREATE TABLE b (id int PRIMARY KEY);"),
        ("V1__a.cql", "CREATE TABLE a (id int PRIMARY KEY); INSERT INTO a VALUES (1);"),
    ]);
    let runner = MigrationRunner::new(&db, &lister, "schema_migrations").unwrap();

    let mut events = Vec::new();
    runner
        .run_with(|event| {
            events.push(match event {
                RunEvent::Skipped(s) => format!("skip {}", s.version),
                RunEvent::Applying { script, statements } => {
                    format!("applying {} ({statements})", script.version)
                }
                RunEvent::Applied(a) => format!("applied {}", a.script.version),
            })
        })
        .await
        .unwrap();
    assert_eq!(
        events,
        vec!["applying 1 (2)", "applied 1", "applying 2 (1)", "applied 2"]
    );

    events.clear();
    let report = runner
        .run_with(|event| {
            if let RunEvent::Skipped(s) = event {
                events.push(format!("skip {}", s.version));
            }
        })
        .await
        .unwrap();
    assert_eq!(events, vec!["skip 1", "skip 2"]);
    assert_eq!(report.applied_count(), 0);
}

#[tokio::test]
async fn test_empty_script_is_recorded() {
    let db = DuckDbBackend::in_memory().unwrap();
    let lister = lister(vec![("V1__noop.cql", "  ;\n")]);
    let runner = MigrationRunner::new(&db, &lister, "schema_migrations").unwrap();

    let report = runner.run().await.unwrap();
    assert_eq!(report.applied[0].statements, 0);
    assert!(runner
        .ledger()
        .load_applied_versions()
        .await
        .unwrap()
        .contains(&1));
}

#[tokio::test]
async fn test_discovery_failure_leaves_ledger_untouched() {
    let db = DuckDbBackend::in_memory().unwrap();
    let lister = lister(vec![("V1__a.cql", ""), ("V1__again.cql", "")]);
    let runner = MigrationRunner::new(&db, &lister, "schema_migrations").unwrap();

    assert!(matches!(
        runner.run().await,
        Err(EngineError::Core(CoreError::DuplicateVersion { version: 1, .. }))
    ));
    let rows = db
        .query("SELECT count(*) FROM information_schema.tables WHERE table_name = 'schema_migrations'")
        .await
        .unwrap();
    assert_eq!(rows[0][0].as_i64(), Some(0));
}

#[tokio::test]
async fn test_status_reports_pending_and_missing() {
    let db = DuckDbBackend::in_memory().unwrap();
    let lister = lister(vec![
        ("V1__a.cql", "CREATE TABLE a (id int PRIMARY KEY);"),
        ("V3__c.cql", "CREATE TABLE c (id int PRIMARY KEY);"),
    ]);
    let runner = MigrationRunner::new(&db, &lister, "schema_migrations").unwrap();

    let status = runner.status().await.unwrap();
    assert_eq!(status.pending.len(), 2);
    assert!(status.applied.is_empty());

    runner
        .ledger()
        .record_applied(1, "V1__a.cql", Utc::now())
        .await
        .unwrap();
    runner
        .ledger()
        .record_applied(2, "V2__gone.cql", Utc::now())
        .await
        .unwrap();

    let status = runner.status().await.unwrap();
    assert_eq!(
        status.pending.iter().map(|s| s.version).collect::<Vec<_>>(),
        vec![3]
    );
    assert_eq!(
        status.missing.iter().map(|e| e.version).collect::<Vec<_>>(),
        vec![2]
    );
    assert!(!status.is_up_to_date());

    // Status never executes scripts.
    assert!(db.query("SELECT * FROM a").await.is_err());
}
