//! Statement outcomes returned from [`crate::database::Database::execute`].

use simpledb_core::Value;

/// Outcome of a DDL or DML statement that doesn't produce rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOk {
    pub rows_affected: usize,
    pub message: String,
}

impl CommandOk {
    pub fn new(rows_affected: usize, message: impl Into<String>) -> Self {
        Self { rows_affected, message: message.into() }
    }
}

/// Outcome of a `SELECT`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Either shape a statement can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    Command(CommandOk),
    Query(QueryResult),
}
