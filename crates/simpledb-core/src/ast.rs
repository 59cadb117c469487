//! AST produced by the parser.
//!
//! A closed sum type with exhaustive dispatch in the executor, rather than
//! dynamic polymorphism, per the design notes.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A type name plus zero or more integer parameters, e.g. `VARCHAR(255)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: String,
    pub params: Vec<i64>,
}

/// One column in a `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub typ: TypeSpec,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary_key: bool,
}

/// A possibly-qualified column reference, e.g. `id` or `users.email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

/// A single `column = literal` equality condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: ColumnRef,
    pub right: Value,
}

/// One or more `AND`-joined conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
}

/// `JOIN table ON left = right`. Accepted by the grammar; rejected at
/// execute time (see the executor's `Select` handling).
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table_name: String,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

/// `column = literal` in an `UPDATE ... SET` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub index_name: String,
    pub table_name: String,
    pub column_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table_name: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

/// `None` columns means `SELECT *`.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: Option<Vec<ColumnRef>>,
    pub from_table: String,
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table_name: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table_name: String,
    pub where_clause: Option<WhereClause>,
}

/// The closed set of statement shapes the parser can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
}
