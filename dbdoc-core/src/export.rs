//! Owned, serializable rendering of a snapshot for report generators.
//!
//! A [`SchemaDocument`] copies what a report needs out of a [`Schema`], so
//! it can be written as JSON and outlive the snapshot. The optional table
//! filter is applied here, after the full snapshot has been built.

use crate::models::{Engine, ForeignKeyRef};
use crate::schema::{Column, Index, Schema, Table};
use crate::{Result, error::DbDocError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Schema display name
    pub name: String,
    /// Engine the snapshot was read from
    pub engine: Engine,
    /// When the catalogs were read
    pub collected_at: DateTime<Utc>,
    /// Report title from the labels file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Report description from the labels file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Documented tables in name order
    pub tables: Vec<TableDocument>,
    /// Snapshot and filter warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// One table with its columns and indexes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    /// Table name
    pub name: String,
    /// Columns in catalog order
    pub columns: Vec<ColumnDocument>,
    /// Primary key columns in key position order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    /// Indexes in name order
    pub indexes: Vec<IndexDocument>,
}

/// One column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDocument {
    /// Column name
    pub name: String,
    /// Engine-reported type name
    pub type_name: String,
    /// Whether NULL is allowed
    pub nullable: bool,
    /// Whether the catalog flags a default
    pub has_default: bool,
    /// Raw default expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Length, precision or engine convention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    /// Foreign key target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKeyRef>,
}

/// One index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Index name
    pub name: String,
    /// Member columns in ordinal order
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness
    pub unique: bool,
}

impl From<Column<'_>> for ColumnDocument {
    fn from(column: Column<'_>) -> Self {
        Self {
            name: column.name().to_string(),
            type_name: column.type_name().to_string(),
            nullable: column.nullable(),
            has_default: column.has_default(),
            default_value: column.default_value().map(str::to_string),
            length: column.length().map(str::to_string),
            references: column.references().cloned(),
        }
    }
}

impl From<Index<'_>> for IndexDocument {
    fn from(index: Index<'_>) -> Self {
        Self {
            name: index.name().to_string(),
            columns: index.column_names().to_vec(),
            unique: index.unique(),
        }
    }
}

impl From<Table<'_>> for TableDocument {
    fn from(table: Table<'_>) -> Self {
        Self {
            name: table.name().to_string(),
            columns: table.columns().into_iter().map(Into::into).collect(),
            primary_key: table.primary_key().map(<[String]>::to_vec),
            indexes: table.indexes().into_iter().map(Into::into).collect(),
        }
    }
}

impl SchemaDocument {
    /// Renders `schema`, optionally restricted to the named tables.
    ///
    /// Filtered tables keep snapshot order (sorted by name). Names missing
    /// from the snapshot are recorded as document warnings.
    pub fn from_schema(schema: &Schema, filter: Option<&[String]>) -> Self {
        let mut warnings = schema.warnings().to_vec();

        let tables = match filter {
            None => schema.tables().into_iter().map(Into::into).collect(),
            Some(names) => {
                for name in names {
                    if schema.table(name).is_none() {
                        tracing::warn!("Requested table '{}' not found in schema", name);
                        warnings.push(format!("requested table '{}' not found", name));
                    }
                }
                schema
                    .tables()
                    .into_iter()
                    .filter(|table| names.iter().any(|name| name == table.name()))
                    .map(Into::into)
                    .collect()
            }
        };

        Self {
            name: schema.name().to_string(),
            engine: schema.engine(),
            collected_at: schema.collected_at(),
            title: None,
            description: None,
            tables,
            warnings,
        }
    }

    /// Sets report labels
    pub fn with_labels(mut self, title: Option<String>, description: Option<String>) -> Self {
        self.title = title;
        self.description = description;
        self
    }

    /// Looks up a rendered table by name
    pub fn table(&self, name: &str) -> Option<&TableDocument> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DbDocError::serialization("rendering schema document", e))
    }
}
