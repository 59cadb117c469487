//! End-to-end scenarios against the public `Database` surface.

use simpledb_storage::{CommandOk, ConstraintError, Database, Error, ExecResult, ExecutionError, QueryResult};

fn open() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path()).unwrap();
    (dir, db)
}

fn as_query(result: ExecResult) -> QueryResult {
    match result {
        ExecResult::Query(q) => q,
        ExecResult::Command(_) => panic!("expected a query result"),
    }
}

fn as_command(result: ExecResult) -> CommandOk {
    match result {
        ExecResult::Command(c) => c,
        ExecResult::Query(_) => panic!("expected a command result"),
    }
}

#[test]
fn create_insert_select_star() {
    let (_dir, db) = open();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255))").unwrap();
    db.execute("INSERT INTO users (id, email) VALUES (1, 'a@b.com')").unwrap();
    db.execute("INSERT INTO users (id, email) VALUES (2, 'c@d.com')").unwrap();

    let res = as_query(db.execute("SELECT * FROM users").unwrap());
    assert_eq!(res.columns, vec!["id", "email"]);
    assert_eq!(res.rows.len(), 2);
}

#[test]
fn filtered_select_with_and() {
    let (_dir, db) = open();
    db.execute("CREATE TABLE t (a INTEGER, b BOOLEAN, name VARCHAR(10))").unwrap();
    db.execute("INSERT INTO t (a, b, name) VALUES (1, true, 'x')").unwrap();
    db.execute("INSERT INTO t (a, b, name) VALUES (1, false, 'y')").unwrap();
    db.execute("INSERT INTO t (a, b, name) VALUES (2, true, 'z')").unwrap();

    let res = as_query(db.execute("SELECT name FROM t WHERE a = 1 AND b = true").unwrap());
    assert_eq!(res.columns, vec!["name"]);
    assert_eq!(res.rows, vec![vec![simpledb_core::Value::Text("x".into())]]);
}

#[test]
fn pk_duplicate_rejected_and_state_unchanged() {
    let (_dir, db) = open();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255))").unwrap();
    db.execute("INSERT INTO users (id, email) VALUES (1, 'a@b.com')").unwrap();
    db.execute("INSERT INTO users (id, email) VALUES (2, 'c@d.com')").unwrap();

    let err = db.execute("INSERT INTO users (id, email) VALUES (1, 'dup@x')").unwrap_err();
    assert!(matches!(err, Error::Constraint(ConstraintError::DuplicatePrimaryKey { .. })));

    let res = as_query(db.execute("SELECT * FROM users").unwrap());
    assert_eq!(res.rows.len(), 2);
}

#[test]
fn update_replaces_logically_and_changes_rid() {
    let (_dir, db) = open();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255))").unwrap();
    db.execute("INSERT INTO users (id, email) VALUES (1, 'a@b.com')").unwrap();

    let before = as_query(db.execute("SELECT * FROM users").unwrap());

    let cmd = as_command(db.execute("UPDATE users SET email = 'new@x' WHERE id = 1").unwrap());
    assert_eq!(cmd.rows_affected, 1);

    let after_res = as_query(db.execute("SELECT email FROM users WHERE id = 1").unwrap());
    assert_eq!(after_res.rows, vec![vec![simpledb_core::Value::Text("new@x".into())]]);

    let after = as_query(db.execute("SELECT * FROM users").unwrap());
    assert_ne!(before.rows, after.rows);
}

#[test]
fn delete_then_reinsert_pk_succeeds_after_deletion() {
    let (_dir, db) = open();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255))").unwrap();
    db.execute("INSERT INTO users (id, email) VALUES (1, 'a@b.com')").unwrap();

    let cmd = as_command(db.execute("DELETE FROM users WHERE id = 1").unwrap());
    assert_eq!(cmd.rows_affected, 1);

    db.execute("INSERT INTO users (id, email) VALUES (1, 'back@x')").unwrap();

    let res = as_query(db.execute("SELECT * FROM users").unwrap());
    assert_eq!(res.rows.len(), 1);
}

#[test]
fn unknown_column_in_select_is_an_execution_error() {
    let (_dir, db) = open();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255))").unwrap();

    let err = db.execute("SELECT nope FROM users").unwrap_err();
    assert!(matches!(err, Error::Execution(ExecutionError::UnknownColumn { .. })));
}

#[test]
fn index_bookkeeping_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = Database::open(dir.path()).unwrap();
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255))").unwrap();
        db.execute("CREATE INDEX idx_email ON users(email)").unwrap();
    }

    let db = Database::open(dir.path()).unwrap();
    db.execute("INSERT INTO users (id, email) VALUES (1, 'a@b.com')").unwrap();
    let res = as_query(db.execute("SELECT * FROM users").unwrap());
    assert_eq!(res.rows.len(), 1);
}

#[test]
fn insert_delete_round_trip_leaves_no_trace() {
    let (_dir, db) = open();
    db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
    db.execute("INSERT INTO t (id) VALUES (1)").unwrap();
    db.execute("DELETE FROM t WHERE id = 1").unwrap();

    let res = as_query(db.execute("SELECT * FROM t").unwrap());
    assert!(res.rows.is_empty());
}

#[test]
fn catalog_round_trips_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = Database::open(dir.path()).unwrap();
        db.execute(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name VARCHAR(20) UNIQUE NOT NULL)",
        )
        .unwrap();
    }

    let db = Database::open(dir.path()).unwrap();
    let err = db.execute("INSERT INTO t (id) VALUES (1)").unwrap_err();
    assert!(matches!(err, Error::Constraint(ConstraintError::NotNull { .. })));
}
