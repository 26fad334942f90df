//! Pivot flat catalog records into per-table maps.
//!
//! Every function is a single pass over its input. Multi-valued groups keep
//! input order; single-valued groups keep the last value seen, which only
//! matters when the catalog reports the same `(table, column)` twice.

use crate::models::{
    ColumnRecord, DefaultRecord, ForeignKeyRecord, ForeignKeyRef, IndexRecord, PrimaryKeyRecord,
};
use std::collections::BTreeMap;

/// Index members and uniqueness, keyed by index name inside a table map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Member columns in ordinal order
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness
    pub unique: bool,
}

/// The five grouped maps a snapshot is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMaps {
    /// Column records per table, catalog order
    pub columns: BTreeMap<String, Vec<ColumnRecord>>,
    /// Foreign key targets per table and column
    pub foreign_keys: BTreeMap<String, BTreeMap<String, ForeignKeyRef>>,
    /// Default expressions per table and column
    pub defaults: BTreeMap<String, BTreeMap<String, Option<String>>>,
    /// Primary key columns per table, key position order
    pub primary_keys: BTreeMap<String, Vec<String>>,
    /// Indexes per table and index name
    pub indexes: BTreeMap<String, BTreeMap<String, IndexEntry>>,
}

impl CatalogMaps {
    /// Pivots all five record sets at once
    pub fn from_records(
        columns: Vec<ColumnRecord>,
        foreign_keys: Vec<ForeignKeyRecord>,
        defaults: Vec<DefaultRecord>,
        primary_keys: Vec<PrimaryKeyRecord>,
        indexes: Vec<IndexRecord>,
    ) -> Self {
        Self {
            columns: group_columns(columns),
            foreign_keys: group_foreign_keys(foreign_keys),
            defaults: group_defaults(defaults),
            primary_keys: fold_primary_keys(primary_keys),
            indexes: group_indexes(indexes),
        }
    }
}

/// Groups columns by table, preserving catalog order within each table.
pub fn group_columns(rows: Vec<ColumnRecord>) -> BTreeMap<String, Vec<ColumnRecord>> {
    let mut tables: BTreeMap<String, Vec<ColumnRecord>> = BTreeMap::new();
    for row in rows {
        tables.entry(row.table.clone()).or_default().push(row);
    }
    tables
}

/// Maps table -> owning column -> foreign key target.
pub fn group_foreign_keys(
    rows: Vec<ForeignKeyRecord>,
) -> BTreeMap<String, BTreeMap<String, ForeignKeyRef>> {
    let mut tables: BTreeMap<String, BTreeMap<String, ForeignKeyRef>> = BTreeMap::new();
    for row in rows {
        let columns = tables.entry(row.table).or_default();
        if let Some(previous) = columns.insert(row.column.clone(), row.target) {
            tracing::debug!(
                "Column '{}' reported by more than one foreign key; replacing target '{}'",
                row.column,
                previous.referenced_table
            );
        }
    }
    tables
}

/// Maps table -> column -> raw default expression.
pub fn group_defaults(rows: Vec<DefaultRecord>) -> BTreeMap<String, BTreeMap<String, Option<String>>> {
    let mut tables: BTreeMap<String, BTreeMap<String, Option<String>>> = BTreeMap::new();
    for row in rows {
        tables
            .entry(row.table)
            .or_default()
            .insert(row.column, row.expression);
    }
    tables
}

/// Folds position-ordered key rows into one ordered column list per table.
pub fn fold_primary_keys(rows: Vec<PrimaryKeyRecord>) -> BTreeMap<String, Vec<String>> {
    let mut keys: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in rows {
        keys.entry(row.table).or_default().push(row.column);
    }
    keys
}

/// Maps table -> index name -> members and uniqueness.
pub fn group_indexes(rows: Vec<IndexRecord>) -> BTreeMap<String, BTreeMap<String, IndexEntry>> {
    let mut tables: BTreeMap<String, BTreeMap<String, IndexEntry>> = BTreeMap::new();
    for row in rows {
        tables.entry(row.table).or_default().insert(
            row.name,
            IndexEntry {
                columns: row.columns,
                unique: row.unique,
            },
        );
    }
    tables
}

/// Groups `(index, column)` pairs by index, preserving ordinal order.
pub fn group_index_columns(
    rows: impl IntoIterator<Item = (String, String)>,
) -> BTreeMap<String, Vec<String>> {
    let mut indexes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (index, column) in rows {
        indexes.entry(index).or_default().push(column);
    }
    indexes
}
