//! Persistent schema catalog.
//!
//! The catalog is a single JSON file (`catalog.json`) at the database root,
//! rewritten in full on every DDL statement. There is no WAL for catalog
//! changes -- a crash mid-write can corrupt it, same tradeoff the heap makes
//! for data files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use simpledb_core::{ColumnDef, TypeSpec};

use crate::error::ExecutionError;

const CATALOG_FILE: &str = "catalog.json";

const SUPPORTED_TYPES: &[&str] = &["INTEGER", "VARCHAR", "TEXT", "DATE", "BOOLEAN"];

/// Keys a heap record uses for its own bookkeeping (`rid`, `op`, and the
/// legacy `deleted` tombstone flag). A user column sharing one of these
/// names would be shadowed or misread on every scan, so `CREATE TABLE`
/// rejects them up front.
const RESERVED_COLUMN_NAMES: &[&str] = &["rid", "op", "deleted"];

/// `name` is the map key wherever an `IndexMeta` is stored (`Catalog::indexes`,
/// `TableMeta::indexes`) and is never written to `catalog.json` -- it's
/// restored from the key on load, matching the on-disk shape the Python
/// original's `catalog.py` `save()` produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    #[serde(skip)]
    pub name: String,
    pub table_name: String,
    pub column_name: String,
}

/// `name` is the `Catalog::tables` map key and, like `IndexMeta::name`, is
/// never persisted -- restored from the key on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    #[serde(skip)]
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: BTreeMap<String, IndexMeta>,
}

impl TableMeta {
    pub fn column_names(&self) -> std::collections::HashSet<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The PRIMARY KEY column, if one was declared. Only one is ever
    /// allowed (enforced in [`Catalog::validate_create_table`]).
    pub fn primary_key_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u32,
    pub tables: BTreeMap<String, TableMeta>,
    pub indexes: BTreeMap<String, IndexMeta>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            version: 1,
            tables: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    /// Loads the catalog from `<db_dir>/catalog.json`, or returns an empty
    /// catalog if the file doesn't exist yet.
    pub fn load(db_dir: &Path) -> Result<Self, ExecutionError> {
        let path = db_dir.join(CATALOG_FILE);
        if !path.exists() {
            return Ok(Self::empty());
        }
        let raw = std::fs::read_to_string(&path)?;
        let mut catalog: Catalog = serde_json::from_str(&raw)?;

        for (name, index) in catalog.indexes.iter_mut() {
            index.name = name.clone();
        }
        for (name, table) in catalog.tables.iter_mut() {
            table.name = name.clone();
            for (index_name, index) in table.indexes.iter_mut() {
                index.name = index_name.clone();
            }
        }

        Ok(catalog)
    }

    /// Rewrites the catalog file in full, pretty-printed with sorted keys
    /// (keys sort naturally since `tables`/`indexes` are `BTreeMap`s).
    pub fn save(&self, db_dir: &Path) -> Result<(), ExecutionError> {
        let path = db_dir.join(CATALOG_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn require_table(&self, table_name: &str) -> Result<&TableMeta, ExecutionError> {
        self.tables
            .get(table_name)
            .ok_or_else(|| ExecutionError::TableNotFound(table_name.to_string()))
    }

    pub fn validate_type(&self, typ: &TypeSpec) -> Result<(), ExecutionError> {
        let tname = typ.name.to_ascii_uppercase();
        if !SUPPORTED_TYPES.contains(&tname.as_str()) {
            return Err(ExecutionError::UnsupportedType(typ.name.clone()));
        }

        if tname == "VARCHAR" {
            if typ.params.len() != 1 || typ.params[0] <= 0 {
                return Err(ExecutionError::InvalidVarcharParams);
            }
        } else if !typ.params.is_empty() {
            return Err(ExecutionError::TypeAcceptsNoParams(tname));
        }

        Ok(())
    }

    pub fn validate_create_table(
        &self,
        table_name: &str,
        columns: &[ColumnDef],
    ) -> Result<(), ExecutionError> {
        if self.tables.contains_key(table_name) {
            return Err(ExecutionError::TableAlreadyExists(table_name.to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for c in columns {
            if !seen.insert(c.name.as_str()) {
                return Err(ExecutionError::DuplicateColumnName);
            }
            if RESERVED_COLUMN_NAMES.contains(&c.name.as_str()) {
                return Err(ExecutionError::ReservedColumnName(c.name.clone()));
            }
        }

        let pk_count = columns.iter().filter(|c| c.primary_key).count();
        if pk_count > 1 {
            return Err(ExecutionError::MultiplePrimaryKeys);
        }

        for c in columns {
            self.validate_type(&c.typ)?;
        }

        Ok(())
    }

    pub fn validate_create_index(
        &self,
        index_name: &str,
        table_name: &str,
        column_name: &str,
    ) -> Result<(), ExecutionError> {
        if self.indexes.contains_key(index_name) {
            return Err(ExecutionError::IndexAlreadyExists(index_name.to_string()));
        }

        let table = self.require_table(table_name)?;
        if !table.column_names().contains(column_name) {
            return Err(ExecutionError::ColumnNotFound {
                table: table_name.to_string(),
                column: column_name.to_string(),
            });
        }

        Ok(())
    }
}
