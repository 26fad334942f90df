//! Oracle schema adapter.
//!
//! Reads the `USER_*` dictionary views through any [`RowQueryExecutor`].
//! No Oracle driver is bundled; callers supply an executor over their own
//! connection.
//!
//! Foreign keys come from a direct join of `R` constraints to the
//! constraints they reference, so the referenced key is a constraint name
//! rather than a column name.

pub mod queries;


use super::SchemaAdapter;
use super::config::{IndexColumnStrategy, IntrospectionConfig};
use super::helpers::{boolean_flag, nullable_from_yes_no};
use crate::error::DbDocError;
use crate::executor::{CatalogRow, RowQueryExecutor, run_query};
use crate::models::{
    ColumnRecord, DefaultRecord, Engine, ForeignKeyRecord, ForeignKeyRef, ForeignKeyScan,
    IndexRecord, PrimaryKeyRecord,
};
use crate::pivot::group_index_columns;
use crate::Result;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};

/// Schema adapter for Oracle catalogs
#[derive(Debug, Clone, Default)]
pub struct OracleAdapter {
    config: IntrospectionConfig,
}

/// Maps `USER_INDEXES.UNIQUENESS` to a flag.
fn uniqueness(row: &CatalogRow, index: usize) -> Result<bool> {
    let code = row.text(index, "uniqueness")?;
    match code.as_str() {
        "UNIQUE" => Ok(true),
        "NONUNIQUE" => Ok(false),
        _ => Err(DbDocError::unexpected_field(
            row.query(),
            "uniqueness",
            format!("unrecognized uniqueness code {:?}", code),
        )),
    }
}

impl OracleAdapter {
    /// Creates an adapter with the given configuration
    pub fn new(config: IntrospectionConfig) -> Self {
        Self { config }
    }

    async fn resolve_batched(
        conn: &dyn RowQueryExecutor,
        headers: Vec<(String, String, bool)>,
    ) -> Result<Vec<IndexRecord>> {
        let rows = run_query(conn, &queries::INDEX_COLUMNS, &[]).await?;
        let pairs = rows
            .iter()
            .map(|row| Ok((row.text(0, "index_name")?, row.text(1, "column_name")?)))
            .collect::<Result<Vec<_>>>()?;
        let mut members = group_index_columns(pairs);

        Ok(headers
            .into_iter()
            .map(|(table, name, unique)| IndexRecord {
                columns: members.remove(&name).unwrap_or_default(),
                table,
                name,
                unique,
            })
            .collect())
    }

    async fn resolve_per_index(
        conn: &dyn RowQueryExecutor,
        headers: Vec<(String, String, bool)>,
        concurrency: usize,
    ) -> Result<Vec<IndexRecord>> {
        futures::stream::iter(headers)
            .map(|(table, name, unique)| async move {
                let rows =
                    run_query(conn, &queries::INDEX_MEMBER_COLUMNS, &[name.as_str()]).await?;
                let columns = rows
                    .iter()
                    .map(|row| row.text(0, "column_name"))
                    .collect::<Result<Vec<_>>>()?;

                Ok::<_, DbDocError>(IndexRecord {
                    table,
                    name,
                    unique,
                    columns,
                })
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }
}

#[async_trait]
impl SchemaAdapter for OracleAdapter {
    fn engine(&self) -> Engine {
        Engine::Oracle
    }

    fn config(&self) -> &IntrospectionConfig {
        &self.config
    }

    async fn fetch_columns(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<ColumnRecord>> {
        let rows = run_query(conn, &queries::COLUMNS, &[]).await?;

        rows.iter()
            .map(|row| {
                Ok(ColumnRecord {
                    table: row.text(0, "table_name")?,
                    name: row.text(1, "column_name")?,
                    type_name: row.text(2, "data_type")?,
                    nullable: nullable_from_yes_no(row, 3)?,
                    has_default: boolean_flag(row, 4, "has_default")?,
                    length: row.rendered(5, "data_length")?,
                })
            })
            .collect()
    }

    async fn fetch_foreign_keys(&self, conn: &dyn RowQueryExecutor) -> Result<ForeignKeyScan> {
        let rows = run_query(conn, &queries::FOREIGN_KEYS, &[]).await?;

        let keys = rows
            .iter()
            .map(|row| {
                Ok(ForeignKeyRecord {
                    table: row.text(0, "table_name")?,
                    column: row.text(1, "column_name")?,
                    target: ForeignKeyRef {
                        referenced_table: row.text(2, "referenced_table")?,
                        referenced_key: row.text(3, "referenced_constraint")?,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ForeignKeyScan {
            keys,
            skipped: Vec::new(),
        })
    }

    async fn fetch_defaults(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<DefaultRecord>> {
        let rows = run_query(conn, &queries::DEFAULTS, &[]).await?;

        rows.iter()
            .map(|row| {
                Ok(DefaultRecord {
                    table: row.text(0, "table_name")?,
                    column: row.text(1, "column_name")?,
                    // DATA_DEFAULT is a LONG and keeps the trailing whitespace of the DDL
                    expression: row
                        .optional_text(2, "data_default")?
                        .map(|text| text.trim_end().to_string()),
                })
            })
            .collect()
    }

    async fn fetch_primary_keys(
        &self,
        conn: &dyn RowQueryExecutor,
    ) -> Result<Vec<PrimaryKeyRecord>> {
        let rows = run_query(conn, &queries::PRIMARY_KEYS, &[]).await?;

        rows.iter()
            .map(|row| {
                Ok(PrimaryKeyRecord {
                    table: row.text(0, "table_name")?,
                    column: row.text(1, "column_name")?,
                })
            })
            .collect()
    }

    async fn fetch_indexes(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<IndexRecord>> {
        let rows = run_query(conn, &queries::INDEXES, &[]).await?;
        let headers = rows
            .iter()
            .map(|row| {
                Ok((
                    row.text(0, "table_name")?,
                    row.text(1, "index_name")?,
                    uniqueness(row, 2)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        match self.config.index_columns {
            IndexColumnStrategy::Batched => Self::resolve_batched(conn, headers).await,
            IndexColumnStrategy::PerIndex => {
                Self::resolve_per_index(conn, headers, self.config.index_query_concurrency).await
            }
        }
    }
}
