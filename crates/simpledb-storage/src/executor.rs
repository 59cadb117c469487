//! Statement execution against the catalog and heap storage.

use std::collections::HashSet;
use std::path::Path;

use simpledb_core::{ColumnRef, Statement, Value, WhereClause};

use crate::catalog::{Catalog, IndexMeta, TableMeta};
use crate::error::{ConstraintError, ExecutionError};
use crate::heap::{HeapTable, Row};
use crate::result::{CommandOk, ExecResult, QueryResult};

/// Dispatches a parsed statement against the database at `db_dir`, mutating
/// `catalog` in place for DDL and persisting it on every schema change.
pub struct Executor<'a> {
    db_dir: &'a Path,
    catalog: &'a mut Catalog,
}

impl<'a> Executor<'a> {
    pub fn new(db_dir: &'a Path, catalog: &'a mut Catalog) -> Self {
        Self { db_dir, catalog }
    }

    pub fn execute(&mut self, stmt: Statement) -> Result<ExecResult, crate::error::Error> {
        match stmt {
            Statement::CreateTable(ct) => {
                self.create_table(ct).map(ExecResult::Command).map_err(Into::into)
            }
            Statement::CreateIndex(ci) => {
                self.create_index(ci).map(ExecResult::Command).map_err(Into::into)
            }
            Statement::Insert(ins) => self.insert(ins).map(ExecResult::Command),
            Statement::Select(sel) => self.select(sel).map(ExecResult::Query),
            Statement::Update(upd) => self.update(upd).map(ExecResult::Command),
            Statement::Delete(del) => self.delete(del).map(ExecResult::Command),
        }
    }

    // ---------------- DDL ----------------

    fn create_table(
        &mut self,
        stmt: simpledb_core::CreateTable,
    ) -> Result<CommandOk, ExecutionError> {
        self.catalog.validate_create_table(&stmt.table_name, &stmt.columns)?;

        let table = TableMeta {
            name: stmt.table_name.clone(),
            columns: stmt.columns,
            indexes: Default::default(),
        };
        self.catalog.tables.insert(stmt.table_name.clone(), table);
        self.catalog.save(self.db_dir)?;

        HeapTable::open(self.db_dir, &stmt.table_name)?;
        Ok(CommandOk::new(0, format!("Table created: {}", stmt.table_name)))
    }

    fn create_index(
        &mut self,
        stmt: simpledb_core::CreateIndex,
    ) -> Result<CommandOk, ExecutionError> {
        self.catalog
            .validate_create_index(&stmt.index_name, &stmt.table_name, &stmt.column_name)?;

        let idx = IndexMeta {
            name: stmt.index_name.clone(),
            table_name: stmt.table_name.clone(),
            column_name: stmt.column_name.clone(),
        };
        self.catalog.indexes.insert(stmt.index_name.clone(), idx.clone());

        let table = self
            .catalog
            .tables
            .get_mut(&stmt.table_name)
            .expect("validate_create_index already confirmed the table exists");
        table.indexes.insert(stmt.index_name.clone(), idx);

        self.catalog.save(self.db_dir)?;
        Ok(CommandOk::new(
            0,
            format!("Index created: {} ON {}({})", stmt.index_name, stmt.table_name, stmt.column_name),
        ))
    }

    // ---------------- shared helpers ----------------

    fn resolve_col(
        &self,
        table_name: &str,
        colref: &ColumnRef,
        ctx: &'static str,
    ) -> Result<String, ExecutionError> {
        if let Some(q) = &colref.table {
            if q != table_name {
                return Err(ExecutionError::QualifierMismatch {
                    context: ctx,
                    qualifier: q.clone(),
                    column: colref.column.clone(),
                    table: table_name.to_string(),
                });
            }
        }
        Ok(colref.column.clone())
    }

    fn validate_insert_types(&self, table: &TableMeta, row: &Row) -> Result<(), ExecutionError> {
        for col_def in &table.columns {
            let Some(val) = row.get(&col_def.name) else { continue };
            if val.is_null() {
                continue;
            }

            let t = col_def.typ.name.to_ascii_uppercase();
            match t.as_str() {
                "INTEGER" => {
                    if val.as_integer().is_none() {
                        return Err(ExecutionError::TypeMismatch {
                            table: table.name.clone(),
                            column: col_def.name.clone(),
                            expected: "INTEGER",
                        });
                    }
                }
                "VARCHAR" | "TEXT" | "DATE" => {
                    let Some(s) = val.as_text() else {
                        return Err(ExecutionError::TypeMismatch {
                            table: table.name.clone(),
                            column: col_def.name.clone(),
                            expected: "TEXT/DATE",
                        });
                    };
                    if t == "VARCHAR" {
                        let max_len = col_def.typ.params[0] as usize;
                        if s.chars().count() > max_len {
                            return Err(ExecutionError::TypeMismatch {
                                table: table.name.clone(),
                                column: col_def.name.clone(),
                                expected: "shorter VARCHAR",
                            });
                        }
                    }
                }
                "BOOLEAN" => {
                    if val.as_boolean().is_none() {
                        return Err(ExecutionError::TypeMismatch {
                            table: table.name.clone(),
                            column: col_def.name.clone(),
                            expected: "BOOLEAN",
                        });
                    }
                }
                other => return Err(ExecutionError::UnsupportedType(other.to_string())),
            }
        }
        Ok(())
    }

    fn row_matches_where(
        &self,
        table_name: &str,
        row: &Row,
        where_clause: &Option<WhereClause>,
    ) -> Result<bool, ExecutionError> {
        let Some(where_clause) = where_clause else { return Ok(true) };
        for cond in &where_clause.conditions {
            let col = self.resolve_col(table_name, &cond.left, "WHERE")?;
            let actual = row.get(&col).unwrap_or(&Value::Null);
            if actual != &cond.right {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Checks NOT NULL / PRIMARY KEY / UNIQUE for a batch of candidate rows
    /// against existing live rows, excluding `exclude_rids` (the rows an
    /// UPDATE is replacing). All candidates are checked before anything is
    /// written, so a batch either commits in full or not at all.
    fn enforce_constraints_batch(
        &self,
        table: &TableMeta,
        existing_rows: &[(i64, Row)],
        new_rows: &[Row],
        exclude_rids: &HashSet<i64>,
    ) -> Result<(), ConstraintError> {
        let existing_kept: Vec<&Row> = existing_rows
            .iter()
            .filter(|(rid, _)| !exclude_rids.contains(rid))
            .map(|(_, row)| row)
            .collect();

        for nr in new_rows {
            for c in &table.columns {
                if c.not_null || c.primary_key {
                    let is_null = nr.get(&c.name).map(Value::is_null).unwrap_or(true);
                    if is_null {
                        if c.primary_key {
                            return Err(ConstraintError::PrimaryKeyNull {
                                table: table.name.clone(),
                                column: c.name.clone(),
                            });
                        }
                        return Err(ConstraintError::NotNull {
                            table: table.name.clone(),
                            column: c.name.clone(),
                        });
                    }
                }
            }
        }

        if let Some(pk_col) = table.primary_key_column() {
            let existing_pks: HashSet<&Value> =
                existing_kept.iter().filter_map(|r| r.get(pk_col)).collect();
            let mut seen_new: HashSet<&Value> = HashSet::new();
            for nr in new_rows {
                let pk_val = nr.get(pk_col).expect("NOT NULL check already ran for the PK column");
                if existing_pks.contains(pk_val) {
                    return Err(ConstraintError::DuplicatePrimaryKey {
                        table: table.name.clone(),
                        column: pk_col.to_string(),
                        value: display_value(pk_val),
                    });
                }
                if !seen_new.insert(pk_val) {
                    return Err(ConstraintError::DuplicatePrimaryKeyInBatch {
                        value: display_value(pk_val),
                    });
                }
            }
        }

        let unique_cols: Vec<&str> = table.columns.iter().filter(|c| c.unique).map(|c| c.name.as_str()).collect();
        for ucol in unique_cols {
            let existing_vals: HashSet<&Value> = existing_kept
                .iter()
                .filter_map(|r| r.get(ucol))
                .filter(|v| !v.is_null())
                .collect();
            let mut seen_new: HashSet<&Value> = HashSet::new();
            for nr in new_rows {
                let Some(v) = nr.get(ucol) else { continue };
                if v.is_null() {
                    continue;
                }
                if existing_vals.contains(v) {
                    return Err(ConstraintError::DuplicateUnique {
                        table: table.name.clone(),
                        column: ucol.to_string(),
                        value: display_value(v),
                    });
                }
                if !seen_new.insert(v) {
                    return Err(ConstraintError::DuplicateUniqueInBatch {
                        table: table.name.clone(),
                        column: ucol.to_string(),
                        value: display_value(v),
                    });
                }
            }
        }

        Ok(())
    }

    fn heap(&self, table_name: &str) -> Result<HeapTable, ExecutionError> {
        HeapTable::open(self.db_dir, table_name)
    }

    // ---------------- INSERT ----------------

    fn insert(&mut self, stmt: simpledb_core::Insert) -> Result<CommandOk, crate::error::Error> {
        let table = self.catalog.require_table(&stmt.table_name)?.clone();

        let table_cols = table.column_names();
        for c in &stmt.columns {
            if !table_cols.contains(c.as_str()) {
                return Err(ExecutionError::UnknownColumn {
                    context: "INSERT",
                    table: stmt.table_name.clone(),
                    column: c.clone(),
                }
                .into());
            }
        }

        let mut row: Row = table.columns.iter().map(|c| (c.name.clone(), Value::Null)).collect();
        for (c, v) in stmt.columns.iter().zip(stmt.values.into_iter()) {
            row.insert(c.clone(), v);
        }

        self.validate_insert_types(&table, &row)?;

        let heap = self.heap(&stmt.table_name)?;
        let existing = heap.scan_active()?;

        self.enforce_constraints_batch(&table, &existing, &[row.clone()], &HashSet::new())?;

        heap.insert(&row)?;
        Ok(CommandOk::new(1, "1 row inserted"))
    }

    // ---------------- SELECT ----------------

    fn select(&mut self, stmt: simpledb_core::Select) -> Result<QueryResult, crate::error::Error> {
        if !stmt.joins.is_empty() {
            return Err(ExecutionError::JoinNotImplemented.into());
        }

        let table = self.catalog.require_table(&stmt.from_table)?.clone();
        let heap = self.heap(&stmt.from_table)?;

        let out_cols: Vec<String> = match &stmt.columns {
            None => table.columns.iter().map(|c| c.name.clone()).collect(),
            Some(cols) => {
                let resolved: Vec<String> = cols
                    .iter()
                    .map(|c| self.resolve_col(&stmt.from_table, c, "SELECT"))
                    .collect::<Result<_, _>>()?;
                let table_cols = table.column_names();
                for c in &resolved {
                    if !table_cols.contains(c.as_str()) {
                        return Err(ExecutionError::UnknownColumn {
                            context: "SELECT",
                            table: stmt.from_table.clone(),
                            column: c.clone(),
                        }
                        .into());
                    }
                }
                resolved
            }
        };

        let mut rows_out = Vec::new();
        for (_, row) in heap.scan_active()? {
            if !self.row_matches_where(&stmt.from_table, &row, &stmt.where_clause)? {
                continue;
            }
            rows_out.push(out_cols.iter().map(|c| row.get(c).cloned().unwrap_or(Value::Null)).collect());
        }

        Ok(QueryResult { columns: out_cols, rows: rows_out })
    }

    // ---------------- UPDATE ----------------

    fn update(&mut self, stmt: simpledb_core::Update) -> Result<CommandOk, crate::error::Error> {
        let table = self.catalog.require_table(&stmt.table_name)?.clone();
        let heap = self.heap(&stmt.table_name)?;

        let table_cols = table.column_names();
        for a in &stmt.assignments {
            if !table_cols.contains(a.column.as_str()) {
                return Err(ExecutionError::UnknownColumn {
                    context: "UPDATE",
                    table: stmt.table_name.clone(),
                    column: a.column.clone(),
                }
                .into());
            }
        }

        let existing = heap.scan_active()?;
        let mut matches: Vec<&(i64, Row)> = Vec::new();
        for entry in &existing {
            let (_, row) = entry;
            if self.row_matches_where(&stmt.table_name, row, &stmt.where_clause)? {
                matches.push(entry);
            }
        }
        if matches.is_empty() {
            return Ok(CommandOk::new(0, "0 rows updated"));
        }

        let mut new_rows = Vec::with_capacity(matches.len());
        let mut exclude_rids = HashSet::new();

        for (rid, old) in &matches {
            exclude_rids.insert(*rid);

            let mut candidate: Row = table.columns.iter().map(|c| (c.name.clone(), old.get(&c.name).cloned().unwrap_or(Value::Null))).collect();
            for a in &stmt.assignments {
                candidate.insert(a.column.clone(), a.value.clone());
            }

            self.validate_insert_types(&table, &candidate)?;
            new_rows.push(candidate);
        }

        self.enforce_constraints_batch(&table, &existing, &new_rows, &exclude_rids)?;

        for ((rid, _), candidate) in matches.iter().zip(new_rows.iter()) {
            heap.insert(candidate)?;
            heap.tombstone(*rid)?;
        }

        Ok(CommandOk::new(matches.len(), format!("{} rows updated", matches.len())))
    }

    // ---------------- DELETE ----------------

    fn delete(&mut self, stmt: simpledb_core::Delete) -> Result<CommandOk, crate::error::Error> {
        self.catalog.require_table(&stmt.table_name)?;
        let heap = self.heap(&stmt.table_name)?;

        let existing = heap.scan_active()?;
        let mut count = 0usize;
        for (rid, row) in &existing {
            if self.row_matches_where(&stmt.table_name, row, &stmt.where_clause)? {
                heap.tombstone(*rid)?;
                count += 1;
            }
        }

        Ok(CommandOk::new(count, format!("{count} rows deleted")))
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::Integer(i) => i.to_string(),
        Value::Text(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "NULL".to_string(),
    }
}
