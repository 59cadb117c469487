//! Top-level database handle.
//!
//! All state lives behind a single [`std::sync::Mutex`] -- there is no
//! per-table locking or MVCC. Every statement, DDL or DML, takes the same
//! lock for its duration.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use simpledb_core::parse_script;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::executor::Executor;
use crate::result::ExecResult;

struct Inner {
    catalog: Catalog,
}

/// A SimpleDB database rooted at a directory on disk.
///
/// Cheap to clone-and-share via `Arc` if a caller needs concurrent access;
/// internally it's just a mutex around the catalog, with each statement
/// reopening the heap files it touches.
pub struct Database {
    root_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl Database {
    /// Opens (creating if necessary) the database rooted at `path`, loading
    /// its catalog from `catalog.json`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let root_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root_dir).map_err(crate::error::ExecutionError::from)?;
        let catalog = Catalog::load(&root_dir).map_err(Error::from)?;

        tracing::info!(db_dir = %root_dir.display(), tables = catalog.tables.len(), "database opened");

        Ok(Self {
            root_dir,
            inner: Mutex::new(Inner { catalog }),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Parses and executes a single SQL statement.
    pub fn execute(&self, sql: &str) -> Result<ExecResult, Error> {
        let stmt = simpledb_core::parse_one(sql)?;
        tracing::debug!(sql, "executing statement");

        let mut guard = self.inner.lock().expect("database mutex poisoned");
        let mut executor = Executor::new(&self.root_dir, &mut guard.catalog);
        let result = executor.execute(stmt);

        if let Err(err) = &result {
            tracing::warn!(error = %err, sql, "statement failed");
        }
        result
    }

    /// Parses a semicolon-separated script and executes each statement in
    /// order under a single lock acquisition, stopping at the first error.
    pub fn execute_script(&self, sql: &str) -> Result<Vec<ExecResult>, Error> {
        let stmts = parse_script(sql)?;

        let mut guard = self.inner.lock().expect("database mutex poisoned");
        let mut results = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let mut executor = Executor::new(&self.root_dir, &mut guard.catalog);
            results.push(executor.execute(stmt)?);
        }
        Ok(results)
    }
}
