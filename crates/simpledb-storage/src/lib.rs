//! Catalog, heap storage, and statement execution for simpledb.

mod catalog;
mod database;
mod error;
mod executor;
mod heap;
mod result;

pub use catalog::{Catalog, IndexMeta, TableMeta};
pub use database::Database;
pub use error::{ConstraintError, Error, ExecutionError, Result};
pub use executor::Executor;
pub use heap::{HeapTable, Row};
pub use result::{CommandOk, ExecResult, QueryResult};
pub use simpledb_core::SqlSyntaxError;
