//! Append-only heap storage for a single table.
//!
//! Each table is a `data/<table>.jsonl` append log plus a
//! `data/<table>.meta.json` sidecar holding the next row id. Deletes are
//! tombstone records, never in-place rewrites; a full scan must see every
//! tombstone before it can decide which rids are still live.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use simpledb_core::Value;

use crate::error::ExecutionError;

/// A row as read back from the heap: its row id plus column values.
pub type Row = BTreeMap<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Meta {
    next_rid: i64,
}

#[derive(Debug)]
pub struct HeapTable {
    #[allow(dead_code)]
    table_name: String,
    data_path: PathBuf,
    meta_path: PathBuf,
}

impl HeapTable {
    /// Opens the table's data and metadata files, creating them if this is
    /// the first time the table is touched.
    pub fn open(db_dir: &Path, table_name: &str) -> Result<Self, ExecutionError> {
        let data_dir = db_dir.join("data");
        std::fs::create_dir_all(&data_dir)?;

        let data_path = data_dir.join(format!("{table_name}.jsonl"));
        let meta_path = data_dir.join(format!("{table_name}.meta.json"));

        if !data_path.exists() {
            std::fs::write(&data_path, "")?;
        }
        if !meta_path.exists() {
            let meta = Meta { next_rid: 1 };
            std::fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)?;
        }

        Ok(Self {
            table_name: table_name.to_string(),
            data_path,
            meta_path,
        })
    }

    fn load_meta(&self) -> Result<Meta, ExecutionError> {
        let raw = std::fs::read_to_string(&self.meta_path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save_meta(&self, meta: &Meta) -> Result<(), ExecutionError> {
        std::fs::write(&self.meta_path, serde_json::to_string_pretty(meta)?)?;
        Ok(())
    }

    fn append_line(&self, value: &serde_json::Value) -> Result<(), ExecutionError> {
        let mut f = OpenOptions::new().append(true).open(&self.data_path)?;
        writeln!(f, "{value}")?;
        Ok(())
    }

    /// Appends `row` as a new record and returns its assigned rid.
    pub fn insert(&self, row: &Row) -> Result<i64, ExecutionError> {
        let mut meta = self.load_meta()?;
        let rid = meta.next_rid;
        meta.next_rid = rid + 1;
        self.save_meta(&meta)?;

        let mut record = serde_json::Map::new();
        record.insert("rid".to_string(), serde_json::json!(rid));
        for (k, v) in row {
            record.insert(k.clone(), serde_json::to_value(v)?);
        }
        self.append_line(&serde_json::Value::Object(record))?;
        Ok(rid)
    }

    /// Appends a tombstone marking `rid` as logically deleted.
    pub fn tombstone(&self, rid: i64) -> Result<(), ExecutionError> {
        let record = serde_json::json!({ "op": "DELETE", "rid": rid });
        self.append_line(&record)
    }

    /// Returns every row that hasn't been tombstoned, in append order.
    ///
    /// A row's liveness can't be known until the whole log has been read,
    /// since a later line may tombstone an earlier one -- hence the full
    /// pass before yielding anything.
    pub fn scan_active(&self) -> Result<Vec<(i64, Row)>, ExecutionError> {
        let contents = std::fs::read_to_string(&self.data_path)?;

        let mut deleted = std::collections::HashSet::new();
        let mut rows: Vec<(i64, Row)> = Vec::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let obj: serde_json::Value = serde_json::from_str(line).map_err(|e| {
                ExecutionError::CorruptRecord {
                    path: self.data_path.display().to_string(),
                    source: e,
                }
            })?;

            let obj = obj.as_object().ok_or_else(|| ExecutionError::RecordNotAnObject {
                path: self.data_path.display().to_string(),
            })?;

            if obj.get("op").and_then(|v| v.as_str()) == Some("DELETE") {
                if let Some(rid) = obj.get("rid").and_then(|v| v.as_i64()) {
                    deleted.insert(rid);
                }
                continue;
            }

            let rid = match obj.get("rid").and_then(|v| v.as_i64()) {
                Some(r) => r,
                None => continue,
            };

            // Legacy tombstone form: a row record carrying `deleted: true`
            // instead of a separate DELETE record.
            if obj.get("deleted").and_then(|v| v.as_bool()) == Some(true) {
                deleted.insert(rid);
                continue;
            }

            let mut row = Row::new();
            for (k, v) in obj {
                if k == "rid" {
                    continue;
                }
                row.insert(k.clone(), serde_json::from_value(v.clone())?);
            }
            rows.push((rid, row));
        }

        Ok(rows.into_iter().filter(|(rid, _)| !deleted.contains(rid)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn insert_then_scan_returns_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let heap = HeapTable::open(dir.path(), "t").unwrap();
        let rid = heap.insert(&row(&[("name", Value::Text("a".into()))])).unwrap();
        assert_eq!(rid, 1);

        let rows = heap.scan_active().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 1);
        assert_eq!(rows[0].1.get("name"), Some(&Value::Text("a".into())));
    }

    #[test]
    fn rids_increment_across_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let heap = HeapTable::open(dir.path(), "t").unwrap();
        let a = heap.insert(&row(&[("n", Value::Integer(1))])).unwrap();
        let b = heap.insert(&row(&[("n", Value::Integer(2))])).unwrap();
        assert_eq!(b, a + 1);
    }

    #[test]
    fn tombstoned_rows_are_excluded_from_scan() {
        let dir = tempfile::tempdir().unwrap();
        let heap = HeapTable::open(dir.path(), "t").unwrap();
        let rid = heap.insert(&row(&[("n", Value::Integer(1))])).unwrap();
        heap.tombstone(rid).unwrap();
        assert!(heap.scan_active().unwrap().is_empty());
    }

    #[test]
    fn reopening_preserves_next_rid_counter() {
        let dir = tempfile::tempdir().unwrap();
        {
            let heap = HeapTable::open(dir.path(), "t").unwrap();
            heap.insert(&row(&[("n", Value::Integer(1))])).unwrap();
        }
        let heap = HeapTable::open(dir.path(), "t").unwrap();
        let rid = heap.insert(&row(&[("n", Value::Integer(2))])).unwrap();
        assert_eq!(rid, 2);
    }

    #[test]
    fn legacy_deleted_flag_is_treated_as_a_tombstone() {
        let dir = tempfile::tempdir().unwrap();
        let heap = HeapTable::open(dir.path(), "t").unwrap();
        let rid = heap.insert(&row(&[("n", Value::Integer(1))])).unwrap();

        let mut f = OpenOptions::new().append(true).open(&heap.data_path).unwrap();
        writeln!(f, "{}", serde_json::json!({ "rid": rid, "n": 1, "deleted": true })).unwrap();
        drop(f);

        assert!(heap.scan_active().unwrap().is_empty());
    }

    #[test]
    fn null_values_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let heap = HeapTable::open(dir.path(), "t").unwrap();
        heap.insert(&row(&[("n", Value::Null)])).unwrap();
        let rows = heap.scan_active().unwrap();
        assert_eq!(rows[0].1.get("n"), Some(&Value::Null));
    }
}
