//! Storage and execution error types.

use simpledb_core::SqlSyntaxError;

/// Raised for anything that isn't strictly a constraint violation: unknown
/// tables/columns, malformed catalog state, unsupported statement shapes,
/// type mismatches, and I/O failures.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("index already exists: {0}")]
    IndexAlreadyExists(String),

    #[error("column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    #[error("unknown column in {context}: {table}.{column}")]
    UnknownColumn {
        context: &'static str,
        table: String,
        column: String,
    },

    #[error("duplicate column name in CREATE TABLE")]
    DuplicateColumnName,

    #[error("column name {0} is reserved for heap record metadata")]
    ReservedColumnName(String),

    #[error("only one PRIMARY KEY column is supported in this phase")]
    MultiplePrimaryKeys,

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("VARCHAR requires exactly one positive length parameter, e.g. VARCHAR(255)")]
    InvalidVarcharParams,

    #[error("type {0} does not accept parameters")]
    TypeAcceptsNoParams(String),

    #[error("type error: {table}.{column} expects {expected}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: &'static str,
    },

    #[error("{context}: column qualifier {qualifier}.{column} does not match {table}")]
    QualifierMismatch {
        context: &'static str,
        qualifier: String,
        column: String,
        table: String,
    },

    #[error("JOIN not implemented yet")]
    JoinNotImplemented,

    #[error("corrupt record in {path}: {source}")]
    CorruptRecord {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt record in {path}: not a JSON object")]
    RecordNotAnObject { path: String },

    #[error("{0}")]
    Syntax(#[from] SqlSyntaxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raised when a batch of candidate rows violates PRIMARY KEY, UNIQUE, or
/// NOT NULL. Kept distinct from [`ExecutionError`] so callers can tell
/// "your statement is malformed" apart from "your data violates a
/// constraint".
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    #[error("PRIMARY KEY column cannot be NULL: {table}.{column}")]
    PrimaryKeyNull { table: String, column: String },

    #[error("NOT NULL constraint failed: {table}.{column}")]
    NotNull { table: String, column: String },

    #[error("PRIMARY KEY constraint failed: duplicate value {value} for {table}.{column}")]
    DuplicatePrimaryKey {
        table: String,
        column: String,
        value: String,
    },

    #[error("PRIMARY KEY constraint failed: duplicate value {value} within UPDATE/INSERT batch")]
    DuplicatePrimaryKeyInBatch { value: String },

    #[error("UNIQUE constraint failed: duplicate value {value} for {table}.{column}")]
    DuplicateUnique {
        table: String,
        column: String,
        value: String,
    },

    #[error("UNIQUE constraint failed: duplicate value {value} within UPDATE/INSERT batch for {table}.{column}")]
    DuplicateUniqueInBatch {
        table: String,
        column: String,
        value: String,
    },
}

/// Aggregate error for everything the storage and execution layers can
/// raise, wrapping [`ExecutionError`] and [`ConstraintError`] so callers of
/// [`crate::database::Database`] only need to match on one type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Syntax(#[from] SqlSyntaxError),
}

pub type Result<T> = std::result::Result<T, Error>;
