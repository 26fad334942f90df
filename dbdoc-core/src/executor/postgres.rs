//! Row query executor over an already-open PostgreSQL pool.
//!
//! The pool is borrowed from the caller: this module never connects, never
//! closes, and applies no timeout of its own. Catalog queries cast their
//! output to `text`, `integer` or `boolean`, so decoding only needs to
//! distinguish those three families.

use super::{CatalogQuery, CatalogRow, CatalogValue, RowQueryExecutor};
use crate::{Result, error::DbDocError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};

/// [`RowQueryExecutor`] backed by a `sqlx` PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgCatalogExecutor {
    pool: PgPool,
}

impl PgCatalogExecutor {
    /// Wraps an open pool. Cloning a `PgPool` is cheap and shares connections.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The wrapped pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RowQueryExecutor for PgCatalogExecutor {
    async fn fetch_all(&self, query: &CatalogQuery, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let mut statement = sqlx::query(query.sql);
        for param in params {
            statement = statement.bind(*param);
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(|e| {
            DbDocError::connectivity(format!("query '{}'", query.name), e)
        })?;

        rows.iter().map(|row| decode_row(query, row)).collect()
    }
}

/// Converts a `PgRow` into positional catalog values.
fn decode_row(query: &CatalogQuery, row: &PgRow) -> Result<CatalogRow> {
    let mut values = Vec::with_capacity(row.len());

    for (index, column) in row.columns().iter().enumerate() {
        let decoded = match column.type_info().name() {
            "BOOL" => row
                .try_get::<Option<bool>, _>(index)
                .map(CatalogValue::from),
            "INT2" => row
                .try_get::<Option<i16>, _>(index)
                .map(|v| CatalogValue::from(v.map(i64::from))),
            "INT4" => row
                .try_get::<Option<i32>, _>(index)
                .map(CatalogValue::from),
            "INT8" => row
                .try_get::<Option<i64>, _>(index)
                .map(CatalogValue::from),
            _ => row
                .try_get::<Option<String>, _>(index)
                .map(CatalogValue::from),
        };

        let value = decoded.map_err(|e| {
            DbDocError::unexpected_field(
                query.name,
                column.name(),
                format!("cannot decode {} value: {}", column.type_info().name(), e),
            )
        })?;
        values.push(value);
    }

    Ok(CatalogRow::new(values))
}
