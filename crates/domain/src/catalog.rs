//! In-memory snapshot of live schema metadata.
//!
//! Keys are stored upper-cased so lookups are case-insensitive; the
//! original casing is preserved as the map value for display.

use std::collections::HashMap;
use std::time::Instant;

use crate::column::ColumnDesc;

#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    databases: HashMap<String, String>,
    tables: HashMap<String, String>,
    columns: HashMap<String, Vec<ColumnDesc>>,
    fetched_at: Instant,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self {
            databases: HashMap::new(),
            tables: HashMap::new(),
            columns: HashMap::new(),
            fetched_at: Instant::now(),
        }
    }

    pub fn from_parts(
        databases: Vec<String>,
        tables: Vec<String>,
        columns: Vec<(String, Vec<ColumnDesc>)>,
    ) -> Self {
        Self {
            databases: databases
                .into_iter()
                .map(|db| (db.to_uppercase(), db))
                .collect(),
            tables: tables
                .into_iter()
                .map(|tbl| (tbl.to_uppercase(), tbl))
                .collect(),
            columns: columns
                .into_iter()
                .map(|(tbl, descs)| (tbl.to_uppercase(), descs))
                .collect(),
            fetched_at: Instant::now(),
        }
    }

    pub fn database(&self, name: &str) -> Option<&str> {
        self.databases.get(&name.to_uppercase()).map(String::as_str)
    }

    pub fn table(&self, name: &str) -> Option<&str> {
        self.tables.get(&name.to_uppercase()).map(String::as_str)
    }

    pub fn column_descs(&self, table: &str) -> Option<&[ColumnDesc]> {
        self.columns.get(&table.to_uppercase()).map(Vec::as_slice)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnDesc> {
        self.column_descs(table)?
            .iter()
            .find(|col| col.name.eq_ignore_ascii_case(column))
    }

    pub fn sorted_databases(&self) -> Vec<&str> {
        let mut dbs: Vec<&str> = self.databases.values().map(String::as_str).collect();
        dbs.sort_unstable();
        dbs
    }

    pub fn sorted_tables(&self) -> Vec<&str> {
        let mut tbls: Vec<&str> = self.tables.values().map(String::as_str).collect();
        tbls.sort_unstable();
        tbls
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn age_seconds(&self) -> u64 {
        self.fetched_at.elapsed().as_secs()
    }
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
