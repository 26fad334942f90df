//! Normalized catalog records.
//!
//! Each engine adapter turns its own flat catalog rows into these shapes
//! before anything is pivoted, so the snapshot layer never sees an
//! engine-specific encoding (nullability codes, trigger blobs, `indkey`
//! vectors and so on).

use serde::{Deserialize, Serialize};

/// Database engines with a catalog adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    /// Oracle Database
    Oracle,
    /// PostgreSQL
    PostgreSQL,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Oracle => write!(f, "Oracle"),
            Engine::PostgreSQL => write!(f, "PostgreSQL"),
        }
    }
}

/// One row of the columns query after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    /// Owning table
    pub table: String,
    /// Column name
    pub name: String,
    /// Engine-reported type name, kept verbatim
    pub type_name: String,
    /// Whether NULL is allowed
    pub nullable: bool,
    /// Whether the catalog flags a default
    pub has_default: bool,
    /// Character length, `precision.scale`, or an engine convention (Oracle dates report "11")
    pub length: Option<String>,
}

/// Target of a foreign key as reported by the catalog.
///
/// Dangling targets are representable: nothing checks that the referenced
/// table or key exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// Referenced table name
    pub referenced_table: String,
    /// Referenced primary-key constraint name (Oracle) or key column (Postgres)
    pub referenced_key: String,
}

/// One owning column of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRecord {
    /// Owning table
    pub table: String,
    /// Owning column
    pub column: String,
    /// Referenced table and key
    pub target: ForeignKeyRef,
}

/// Result of a foreign key discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKeyScan {
    /// Parsed foreign keys
    pub keys: Vec<ForeignKeyRecord>,
    /// Entries skipped under a lenient policy, one message each
    pub skipped: Vec<String>,
}

/// One column default expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRecord {
    /// Owning table
    pub table: String,
    /// Column name
    pub column: String,
    /// Raw SQL text; some catalogs flag a default without storing its source
    pub expression: Option<String>,
}

/// One primary key member. Rows arrive pre-ordered by key position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyRecord {
    /// Owning table
    pub table: String,
    /// Member column
    pub column: String,
}

/// An index with its member columns resolved in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// Owning table
    pub table: String,
    /// Index name
    pub name: String,
    /// Whether the index enforces uniqueness
    pub unique: bool,
    /// Member columns in ordinal order
    pub columns: Vec<String>,
}
