//! Row query executor contract.
//!
//! Every catalog query issued by an adapter goes through
//! [`RowQueryExecutor::fetch_all`]: one statement in, the complete result set
//! out. There is no caching and no retry. Timeouts and cancellation belong to
//! the connection the executor wraps.
//!
//! # Module Structure
//! - `fixture`: canned result sets keyed by query name, for tests and demos
//! - `postgres`: executor over an open `sqlx::PgPool` (feature `postgresql`)

use crate::{Result, error::DbDocError};
use async_trait::async_trait;

pub mod fixture;

#[cfg(feature = "postgresql")]
pub mod postgres;

pub use fixture::FixtureExecutor;

/// A named catalog statement.
///
/// Parameters are written with the engine's own placeholder syntax (`$1` for
/// Postgres, `:1` for Oracle) and always bound, never interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Engine-scoped name such as `postgres.columns`, used in diagnostics
    pub name: &'static str,
    /// Statement text
    pub sql: &'static str,
}

/// A single catalog cell, reduced to what the adapters need to interpret.
/// SQL NULL
/// Character data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValue {
    /// Any integer width
    Null,
    /// Boolean flag
    Text(String),
    Int(i64),
    Bool(bool),
}

impl std::fmt::Display for CatalogValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogValue::Null => write!(f, "NULL"),
            CatalogValue::Text(text) => write!(f, "{:?}", text),
            CatalogValue::Int(value) => write!(f, "{}", value),
            CatalogValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for CatalogValue {
    fn from(value: &str) -> Self {
        CatalogValue::Text(value.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(value: String) -> Self {
        CatalogValue::Text(value)
    }
}

impl From<i64> for CatalogValue {
    fn from(value: i64) -> Self {
        CatalogValue::Int(value)
    }
}

impl From<i32> for CatalogValue {
    fn from(value: i32) -> Self {
        CatalogValue::Int(i64::from(value))
    }
}

impl From<bool> for CatalogValue {
    fn from(value: bool) -> Self {
        CatalogValue::Bool(value)
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CatalogValue::Null, Into::into)
    }
}

/// One result row, tagged with the name of the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    query: &'static str,
    values: Vec<CatalogValue>,
}

impl CatalogRow {
    /// Creates an untagged row; the executor layer tags it on the way out.
    pub fn new(values: Vec<CatalogValue>) -> Self {
        Self { query: "", values }
    }

    pub(crate) fn tagged(mut self, query: &'static str) -> Self {
        self.query = query;
        self
    }

    /// Name of the query that produced this row
    pub fn query(&self) -> &'static str {
        self.query
    }

    /// Number of cells in the row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the row carries no cells
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw cell at `index`.
    ///
    /// # Errors
    /// Returns a catalog shape error when the row is shorter than expected.
    pub fn value(&self, index: usize, field: &str) -> Result<&CatalogValue> {
        self.values.get(index).ok_or_else(|| {
            DbDocError::unexpected_field(
                self.query,
                field,
                format!("row has {} cells, expected at least {}", self.len(), index + 1),
            )
        })
    }

    /// Reads a non-null text cell.
    pub fn text(&self, index: usize, field: &str) -> Result<String> {
        match self.value(index, field)? {
            CatalogValue::Text(text) => Ok(text.clone()),
            other => Err(DbDocError::unexpected_field(
                self.query,
                field,
                format!("expected text, found {}", other),
            )),
        }
    }

    /// Reads a nullable text cell.
    pub fn optional_text(&self, index: usize, field: &str) -> Result<Option<String>> {
        match self.value(index, field)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Text(text) => Ok(Some(text.clone())),
            other => Err(DbDocError::unexpected_field(
                self.query,
                field,
                format!("expected text or NULL, found {}", other),
            )),
        }
    }

    /// Reads any cell as display text, `None` for NULL.
    ///
    /// Drivers disagree on whether computed columns come back as numbers or
    /// strings; this accessor accepts either.
    pub fn rendered(&self, index: usize, field: &str) -> Result<Option<String>> {
        Ok(match self.value(index, field)? {
            CatalogValue::Null => None,
            CatalogValue::Text(text) => Some(text.clone()),
            CatalogValue::Int(value) => Some(value.to_string()),
            CatalogValue::Bool(value) => Some(value.to_string()),
        })
    }

    /// Reads a non-null integer cell, accepting numeric text.
    pub fn int(&self, index: usize, field: &str) -> Result<i64> {
        match self.value(index, field)? {
            CatalogValue::Int(value) => Ok(*value),
            CatalogValue::Text(text) => text.trim().parse().map_err(|_| {
                DbDocError::unexpected_field(
                    self.query,
                    field,
                    format!("expected integer, found {:?}", text),
                )
            }),
            other => Err(DbDocError::unexpected_field(
                self.query,
                field,
                format!("expected integer, found {}", other),
            )),
        }
    }
}

/// Builds a [`CatalogRow`] from heterogeneous values.
///
/// ```rust
/// use dbdoc_core::catalog_row;
/// use dbdoc_core::executor::CatalogValue;
///
/// let row = catalog_row!["users", "id", 1, true, CatalogValue::Null];
/// assert_eq!(row.len(), 5);
/// ```
#[macro_export]
macro_rules! catalog_row {
    ($($value:expr),* $(,)?) => {
        $crate::executor::CatalogRow::new(vec![
            $($crate::executor::CatalogValue::from($value)),*
        ])
    };
}

/// Issues one statement against an open connection.
#[async_trait]
pub trait RowQueryExecutor: Send + Sync {
    /// Executes `query` with `params` bound positionally and returns every row.
    ///
    /// # Errors
    /// Returns a connectivity error when the statement cannot be executed.
    async fn fetch_all(&self, query: &CatalogQuery, params: &[&str]) -> Result<Vec<CatalogRow>>;
}

/// Runs a catalog query and tags the rows with its name.
pub(crate) async fn run_query(
    conn: &dyn RowQueryExecutor,
    query: &CatalogQuery,
    params: &[&str],
) -> Result<Vec<CatalogRow>> {
    let started = std::time::Instant::now();
    let rows = conn.fetch_all(query, params).await.map_err(|e| {
        tracing::error!("Catalog query '{}' failed: {}", query.name, e);
        e
    })?;

    tracing::debug!(
        "Catalog query '{}' returned {} rows in {:.3}s",
        query.name,
        rows.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(rows.into_iter().map(|row| row.tagged(query.name)).collect())
}
