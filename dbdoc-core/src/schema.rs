//! Immutable schema snapshot and its read-only views.
//!
//! A [`Schema`] owns the grouped catalog maps produced by one introspection
//! pass. [`Table`], [`Column`] and [`Index`] are built on lookup and only
//! borrow slices of those maps, so the borrow checker guarantees they never
//! outlive the snapshot that produced them.
//!
//! Tables and indexes iterate sorted by name; columns keep catalog order and
//! index members keep ordinal order.

use crate::models::{ColumnRecord, Engine, ForeignKeyRef};
use crate::pivot::{CatalogMaps, IndexEntry};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Root of one introspection snapshot
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    engine: Engine,
    maps: CatalogMaps,
    warnings: Vec<String>,
    collected_at: DateTime<Utc>,
}

impl Schema {
    /// Assembles a snapshot from already pivoted maps.
    pub fn from_maps(
        name: impl Into<String>,
        engine: Engine,
        maps: CatalogMaps,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            engine,
            maps,
            warnings,
            collected_at: Utc::now(),
        }
    }

    /// Display name supplied by the caller; labels output only
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine the snapshot was read from
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// When the catalog queries completed
    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    /// Non-fatal inconsistencies found while building the snapshot
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The grouped maps backing every view
    pub fn maps(&self) -> &CatalogMaps {
        &self.maps
    }

    /// Number of tables with column metadata
    pub fn len(&self) -> usize {
        self.maps.columns.len()
    }

    /// True when the catalog reported no tables
    pub fn is_empty(&self) -> bool {
        self.maps.columns.is_empty()
    }

    /// Table names in sorted order
    pub fn table_names(&self) -> Vec<&str> {
        self.maps.columns.keys().map(String::as_str).collect()
    }

    /// All tables, sorted by name
    pub fn tables(&self) -> Vec<Table<'_>> {
        self.maps
            .columns
            .iter()
            .map(|(name, columns)| self.view(name, columns))
            .collect()
    }

    /// Looks up a table; `None` when the catalog reported no columns for it.
    pub fn table(&self, name: &str) -> Option<Table<'_>> {
        self.maps
            .columns
            .get_key_value(name)
            .map(|(name, columns)| self.view(name, columns))
    }

    fn view<'s>(&'s self, name: &'s str, columns: &'s [ColumnRecord]) -> Table<'s> {
        Table {
            name,
            columns,
            primary_key: self.maps.primary_keys.get(name).map(Vec::as_slice),
            foreign_keys: self.maps.foreign_keys.get(name),
            defaults: self.maps.defaults.get(name),
            indexes: self.maps.indexes.get(name),
        }
    }
}

/// Read-only view of one table
#[derive(Debug, Clone, Copy)]
pub struct Table<'s> {
    name: &'s str,
    columns: &'s [ColumnRecord],
    primary_key: Option<&'s [String]>,
    foreign_keys: Option<&'s BTreeMap<String, ForeignKeyRef>>,
    defaults: Option<&'s BTreeMap<String, Option<String>>>,
    indexes: Option<&'s BTreeMap<String, IndexEntry>>,
}

impl<'s> Table<'s> {
    /// Table name
    pub fn name(&self) -> &'s str {
        self.name
    }

    /// Column names in catalog order
    pub fn column_names(&self) -> Vec<&'s str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns in catalog order
    pub fn columns(&self) -> Vec<Column<'s>> {
        self.columns.iter().map(|record| self.column_view(record)).collect()
    }

    /// Looks up a column by name; `None` when the table has no such column.
    pub fn column(&self, name: &str) -> Option<Column<'s>> {
        self.columns
            .iter()
            .find(|record| record.name == name)
            .map(|record| self.column_view(record))
    }

    /// Primary key columns in key-position order
    pub fn primary_key(&self) -> Option<&'s [String]> {
        self.primary_key
    }

    /// Primary key as a single comma-joined description, e.g. `"order_id, line_no"`
    pub fn primary_key_description(&self) -> Option<String> {
        self.primary_key.map(|columns| columns.join(", "))
    }

    /// Indexes sorted by name
    pub fn indexes(&self) -> Vec<Index<'s>> {
        self.indexes
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|(name, entry)| Index {
                        table_name: self.name,
                        name,
                        entry,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Looks up an index by name; `None` when the table has no such index.
    pub fn index(&self, name: &str) -> Option<Index<'s>> {
        let (name, entry) = self.indexes?.get_key_value(name)?;
        Some(Index {
            table_name: self.name,
            name,
            entry,
        })
    }

    /// Columns carrying a foreign key, in catalog order
    pub fn foreign_key_columns(&self) -> Vec<Column<'s>> {
        self.columns()
            .into_iter()
            .filter(|column| column.references().is_some())
            .collect()
    }

    fn column_view(&self, record: &'s ColumnRecord) -> Column<'s> {
        Column {
            table_name: self.name,
            record,
            references: self
                .foreign_keys
                .and_then(|keys| keys.get(&record.name)),
            default: self
                .defaults
                .and_then(|defaults| defaults.get(&record.name))
                .and_then(Option::as_deref),
        }
    }
}

/// Read-only view of one column
#[derive(Debug, Clone, Copy)]
pub struct Column<'s> {
    table_name: &'s str,
    record: &'s ColumnRecord,
    references: Option<&'s ForeignKeyRef>,
    default: Option<&'s str>,
}

impl<'s> Column<'s> {
    /// Column name
    pub fn name(&self) -> &'s str {
        &self.record.name
    }

    /// Name of the owning table
    pub fn table_name(&self) -> &'s str {
        self.table_name
    }

    /// Engine-reported type name, not normalized across engines
    pub fn type_name(&self) -> &'s str {
        &self.record.type_name
    }

    /// Whether NULL is allowed
    pub fn nullable(&self) -> bool {
        self.record.nullable
    }

    /// Whether the columns query flagged a default
    pub fn has_default(&self) -> bool {
        self.record.has_default
    }

    /// Raw default expression, if the catalog stores one
    pub fn default_value(&self) -> Option<&'s str> {
        self.default
    }

    /// Length, `precision.scale`, or an engine convention; see [`ColumnRecord::length`]
    pub fn length(&self) -> Option<&'s str> {
        self.record.length.as_deref()
    }

    /// Foreign key target, if this column owns one
    pub fn references(&self) -> Option<&'s ForeignKeyRef> {
        self.references
    }
}

/// Read-only view of one index
#[derive(Debug, Clone, Copy)]
pub struct Index<'s> {
    table_name: &'s str,
    name: &'s str,
    entry: &'s IndexEntry,
}

impl<'s> Index<'s> {
    /// Index name
    pub fn name(&self) -> &'s str {
        self.name
    }

    /// Name of the owning table
    pub fn table_name(&self) -> &'s str {
        self.table_name
    }

    /// Member columns in ordinal order within the index
    pub fn column_names(&self) -> &'s [String] {
        &self.entry.columns
    }

    /// Whether the index enforces uniqueness
    pub fn unique(&self) -> bool {
        self.entry.unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefaultRecord, ForeignKeyRecord, IndexRecord, PrimaryKeyRecord};

    fn sample_schema() -> Schema {
        let column = |table: &str, name: &str, nullable: bool, has_default: bool| ColumnRecord {
            table: table.to_string(),
            name: name.to_string(),
            type_name: "int4".to_string(),
            nullable,
            has_default,
            length: Some("4".to_string()),
        };

        let maps = CatalogMaps::from_records(
            vec![
                column("orders", "id", false, false),
                column("orders", "cust_id", true, false),
                column("orders", "status", false, true),
                column("customers", "id", false, false),
            ],
            vec![ForeignKeyRecord {
                table: "orders".to_string(),
                column: "cust_id".to_string(),
                target: ForeignKeyRef {
                    referenced_table: "customers".to_string(),
                    referenced_key: "id".to_string(),
                },
            }],
            vec![DefaultRecord {
                table: "orders".to_string(),
                column: "status".to_string(),
                expression: Some("'new'".to_string()),
            }],
            vec![PrimaryKeyRecord {
                table: "orders".to_string(),
                column: "id".to_string(),
            }],
            vec![IndexRecord {
                table: "orders".to_string(),
                name: "orders_cust_idx".to_string(),
                unique: false,
                columns: vec!["cust_id".to_string(), "status".to_string()],
            }],
        );

        Schema::from_maps("shop", Engine::PostgreSQL, maps, Vec::new())
    }

    #[test]
    fn test_tables_are_sorted_by_name() {
        let schema = sample_schema();
        let names: Vec<&str> = schema.tables().iter().map(Table::name).collect();

        assert_eq!(names, vec!["customers", "orders"]);
        assert_eq!(schema.table_names(), names);
    }

    #[test]
    fn test_absent_lookups_return_none() {
        let schema = sample_schema();
        let orders = schema.table("orders").unwrap();

        assert!(schema.table("nonexistent").is_none());
        assert!(orders.column("nonexistent").is_none());
        assert!(orders.index("nonexistent").is_none());
        assert!(schema.table("customers").unwrap().index("orders_cust_idx").is_none());
    }

    #[test]
    fn test_column_view_joins_key_and_default() {
        let schema = sample_schema();
        let orders = schema.table("orders").unwrap();

        assert_eq!(orders.column_names(), vec!["id", "cust_id", "status"]);

        let cust_id = orders.column("cust_id").unwrap();
        let target = cust_id.references().unwrap();
        assert_eq!(target.referenced_table, "customers");
        assert_eq!(target.referenced_key, "id");
        assert!(cust_id.default_value().is_none());

        let status = orders.column("status").unwrap();
        assert!(status.has_default());
        assert_eq!(status.default_value(), Some("'new'"));
        assert!(!status.nullable());
        assert_eq!(status.table_name(), "orders");
    }

    #[test]
    fn test_primary_key_and_index_views() {
        let schema = sample_schema();
        let orders = schema.table("orders").unwrap();

        assert_eq!(orders.primary_key_description().as_deref(), Some("id"));
        assert!(schema.table("customers").unwrap().primary_key().is_none());

        let index = orders.index("orders_cust_idx").unwrap();
        assert_eq!(index.column_names(), ["cust_id", "status"]);
        assert!(!index.unique());
        assert_eq!(orders.indexes().len(), 1);
        assert_eq!(orders.foreign_key_columns().len(), 1);
    }
}
