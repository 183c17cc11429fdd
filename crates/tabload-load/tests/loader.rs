//! Integration tests for the load gate and bulk loader.

mod common;

use common::{Call, RecordingDatabase, source_dir, with_captured_logs};
use tabload_load::{BulkLoader, LoadGate, LoadOptions, SqliteDatabase};

fn five_rows() -> &'static str {
    "id,name\n1,a\n2,b\n3,c\n4,d\n5,e\n"
}

#[test]
fn test_batches_of_two_over_five_rows() {
    let dir = source_dir(&[("letters.csv", five_rows())]);
    let mut db = RecordingDatabase::new();

    let report = BulkLoader::new(&mut db, dir.path())
        .with_options(LoadOptions { batch_size: 2 })
        .load_all(&["letters"]);

    assert_eq!(report.injected, vec!["letters"]);
    assert_eq!(report.rows, vec![5]);
    let sizes: Vec<usize> = db.insert_batches().iter().map(|b| b.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    // Every insert is immediately followed by a commit
    let after_probe: Vec<&Call> = db.calls.iter().skip(1).collect();
    assert_eq!(after_probe.len(), 6);
    for pair in after_probe.chunks(2) {
        assert!(matches!(pair[0], Call::ExecuteMany { .. }));
        assert_eq!(pair[1], &Call::Commit);
    }
}

#[test]
fn test_empty_fields_become_null() {
    let dir = source_dir(&[("scores.csv", "id,name,score\n1,Alice,9.5\n,Bob,\n")]);
    let mut db = RecordingDatabase::new();

    BulkLoader::new(&mut db, dir.path()).load_all(&["scores"]);

    let batches = db.insert_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][1], vec![None, Some("Bob".to_string()), None]);
    let Call::ExecuteMany { sql, .. } = &db.calls[1] else {
        panic!("expected an insert, got {:?}", db.calls[1]);
    };
    assert_eq!(sql, "INSERT INTO scores (id, name, score) VALUES (?, ?, ?)");
}

#[test]
fn test_second_run_inserts_nothing() {
    let dir = source_dir(&[("letters.csv", five_rows())]);
    let mut db = RecordingDatabase::new();

    let first = BulkLoader::new(&mut db, dir.path()).load_all(&["letters"]);
    assert_eq!(first.injected, vec!["letters"]);
    let inserts_after_first = db.insert_batches().len();

    let second = BulkLoader::new(&mut db, dir.path()).load_all(&["letters"]);

    assert!(second.injected.is_empty());
    assert_eq!(second.skipped, vec!["letters"]);
    assert_eq!(db.insert_batches().len(), inserts_after_first);
}

#[test]
fn test_probe_failure_skips_and_logs() {
    let dir = source_dir(&[("T.csv", "a\n1\n")]);
    let mut db = RecordingDatabase::new();
    db.failing_probes.insert("T".to_string());

    assert!(!LoadGate::new(&mut db).is_empty("T"));

    let (report, logs) =
        with_captured_logs(|| BulkLoader::new(&mut db, dir.path()).load_all(&["T"]));

    assert_eq!(report.skipped, vec!["T"]);
    assert!(report.injected.is_empty());
    assert!(report.failed.is_empty());
    assert!(db.insert_batches().is_empty());
    assert!(logs.contains("error checking table T emptiness"), "logs: {logs}");
    assert!(logs.contains("table T already has data"), "logs: {logs}");
}

#[test]
fn test_missing_file_fails_and_continues() {
    let dir = source_dir(&[("present.csv", "a\n1\n")]);
    let mut db = RecordingDatabase::new();

    let report = BulkLoader::new(&mut db, dir.path()).load_all(&["absent", "present"]);

    assert_eq!(report.failed, vec!["absent"]);
    assert_eq!(report.injected, vec!["present"]);
}

#[test]
fn test_ragged_row_fails_table_after_committed_batches() {
    let dir = source_dir(&[("ragged.csv", "a,b\n1,2\n3,4\n5\n")]);
    let mut db = RecordingDatabase::new();

    let report = BulkLoader::new(&mut db, dir.path())
        .with_options(LoadOptions { batch_size: 1 })
        .load_all(&["ragged"]);

    assert_eq!(report.failed, vec!["ragged"]);
    // The first two rows were committed before the bad line was read
    assert_eq!(db.insert_batches().len(), 2);
    assert_eq!(db.commit_count(), 2);
}

#[test]
fn test_blank_line_loads_as_null_row() {
    let dir = source_dir(&[("notes.csv", "note\na\n\nc\n")]);
    let mut db = RecordingDatabase::new();

    let report = BulkLoader::new(&mut db, dir.path()).load_all(&["notes"]);

    assert_eq!(report.injected, vec!["notes"]);
    assert_eq!(report.rows, vec![3]);
    assert_eq!(
        db.insert_batches()[0],
        &vec![vec![Some("a".to_string())], vec![None], vec![Some("c".to_string())]]
    );
}

#[test]
fn test_blank_line_fails_multi_column_table() {
    let dir = source_dir(&[("t.csv", "a,b\n1,2\n\n3,4\n")]);
    let mut db = RecordingDatabase::new();

    let report = BulkLoader::new(&mut db, dir.path()).load_all(&["t"]);

    assert_eq!(report.failed, vec!["t"]);
    assert!(report.injected.is_empty());
    assert!(db.insert_batches().is_empty());
}

#[test]
fn test_insertion_events_are_logged() {
    let dir = source_dir(&[("letters.csv", five_rows())]);
    let mut db = RecordingDatabase::new();

    let (_, logs) = with_captured_logs(|| {
        BulkLoader::new(&mut db, dir.path())
            .with_options(LoadOptions { batch_size: 2 })
            .load_all(&["letters", "missing"])
    });

    assert!(logs.contains("insertion started for table letters"), "logs: {logs}");
    assert!(logs.contains("letters: inserted 2 rows"), "logs: {logs}");
    assert!(logs.contains("letters: inserted 4 rows"), "logs: {logs}");
    assert!(logs.contains("letters: final inserted 5 rows"), "logs: {logs}");
    assert!(logs.contains("completed insertion for table letters"), "logs: {logs}");
    assert!(logs.contains("error inserting rows into table missing"), "logs: {logs}");
}

#[test]
fn test_header_only_file_inserts_nothing() {
    let dir = source_dir(&[("empty.csv", "id,name\n")]);
    let mut db = RecordingDatabase::new();

    let report = BulkLoader::new(&mut db, dir.path()).load_all(&["empty"]);

    assert_eq!(report.injected, vec!["empty"]);
    assert_eq!(report.rows, vec![0]);
    assert!(db.insert_batches().is_empty());
}

#[test]
fn test_unlisted_tables_are_not_touched() {
    let dir = source_dir(&[("a.csv", "x\n1\n"), ("b.csv", "x\n2\n")]);
    let mut db = RecordingDatabase::new();

    let report = BulkLoader::new(&mut db, dir.path()).load_all(&["a"]);

    assert_eq!(report.injected, vec!["a"]);
    assert!(!db.populated.contains("b"));
}

#[test]
fn test_sqlite_rows_persist_with_nulls() {
    let dir = source_dir(&[("scores.csv", "id,name,score\n1,Alice,9.5\n,Bob,\n")]);
    let mut db = SqliteDatabase::open_in_memory().unwrap();
    db.connection()
        .execute_batch("CREATE TABLE scores (id INT, name VARCHAR(255), score FLOAT)")
        .unwrap();

    let report = BulkLoader::new(&mut db, dir.path()).load_all(&["scores"]);
    assert_eq!(report.injected, vec!["scores"]);

    let bob: (Option<i64>, String, Option<f64>) = db
        .connection()
        .query_row(
            "SELECT id, name, score FROM scores WHERE name = 'Bob'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(bob, (None, "Bob".to_string(), None));

    let alice_score: f64 = db
        .connection()
        .query_row("SELECT score FROM scores WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert!((alice_score - 9.5).abs() < f64::EPSILON);
}
