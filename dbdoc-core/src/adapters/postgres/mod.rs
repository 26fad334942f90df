//! Postgres schema adapter.
//!
//! # Module Structure
//! - `queries`: Named catalog statements
//! - `triggers`: Foreign key discovery from legacy referential triggers
//! - `keys`: `indkey` resolution for primary keys and index members
//! - `type_mapping`: Column length normalization
//!
//! Foreign keys come either from the legacy trigger heuristic or from the
//! native constraint catalog, selected with [`ForeignKeyDiscovery`]. Both
//! paths produce the same records, so nothing downstream can tell them apart.

pub mod queries;
pub mod triggers;
pub mod type_mapping;

mod keys;

#[cfg(test)]
mod tests;

use super::SchemaAdapter;
use super::config::{IndexColumnStrategy, IntrospectionConfig};
use super::helpers::{boolean_flag, nullable_from_not_null_flag};
use crate::error::DbDocError;
use crate::executor::{RowQueryExecutor, run_query};
use crate::models::{
    ColumnRecord, DefaultRecord, Engine, ForeignKeyRecord, ForeignKeyRef, ForeignKeyScan,
    IndexRecord, PrimaryKeyRecord,
};
use crate::Result;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use keys::{AttributeNames, parse_indkey};

pub use triggers::{TRIGGER_ARG_FIELDS, parse_trigger_args, split_trigger_args};
pub use type_mapping::column_length;

/// Where foreign keys are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyDiscovery {
    /// Parse the packed arguments of legacy referential triggers
    #[default]
    Triggers,
    /// Read `pg_constraint` directly (8.0 and later)
    Constraints,
}

/// Schema adapter for Postgres catalogs
#[derive(Debug, Clone, Default)]
pub struct PostgresAdapter {
    config: IntrospectionConfig,
    foreign_keys: ForeignKeyDiscovery,
}

/// One row of the index list before member resolution
struct IndexHeader {
    table: String,
    name: String,
    indkey: Vec<i64>,
    unique: bool,
}

impl PostgresAdapter {
    /// Creates an adapter using trigger-based foreign key discovery
    pub fn new(config: IntrospectionConfig) -> Self {
        Self {
            config,
            foreign_keys: ForeignKeyDiscovery::default(),
        }
    }

    /// Selects the foreign key discovery path
    pub fn with_foreign_key_discovery(mut self, discovery: ForeignKeyDiscovery) -> Self {
        self.foreign_keys = discovery;
        self
    }

    /// Foreign key discovery path in use
    pub fn foreign_key_discovery(&self) -> ForeignKeyDiscovery {
        self.foreign_keys
    }

    async fn attribute_names(conn: &dyn RowQueryExecutor) -> Result<AttributeNames> {
        let rows = run_query(conn, &queries::ATTRIBUTE_NAMES, &[]).await?;
        AttributeNames::from_rows(&rows)
    }

    async fn fetch_constraint_keys(conn: &dyn RowQueryExecutor) -> Result<ForeignKeyScan> {
        let rows = run_query(conn, &queries::FOREIGN_KEY_CONSTRAINTS, &[]).await?;

        let keys = rows
            .iter()
            .map(|row| {
                Ok(ForeignKeyRecord {
                    table: row.text(0, "table_name")?,
                    column: row.text(1, "column_name")?,
                    target: ForeignKeyRef {
                        referenced_table: row.text(2, "referenced_table")?,
                        referenced_key: row.text(3, "referenced_column")?,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ForeignKeyScan {
            keys,
            skipped: Vec::new(),
        })
    }

    async fn fetch_index_headers(conn: &dyn RowQueryExecutor) -> Result<Vec<IndexHeader>> {
        let rows = run_query(conn, &queries::INDEXES, &[]).await?;

        rows.iter()
            .map(|row| {
                Ok(IndexHeader {
                    table: row.text(0, "table_name")?,
                    name: row.text(1, "index_name")?,
                    indkey: parse_indkey(row.query(), &row.text(2, "indkey")?)?,
                    unique: boolean_flag(row, 3, "indisunique")?,
                })
            })
            .collect()
    }

    async fn resolve_batched(
        conn: &dyn RowQueryExecutor,
        headers: Vec<IndexHeader>,
    ) -> Result<Vec<IndexRecord>> {
        let names = Self::attribute_names(conn).await?;

        Ok(headers
            .into_iter()
            .map(|header| {
                let owner = format!("index '{}'", header.name);
                let columns = names.resolve(&header.table, &owner, &header.indkey);
                IndexRecord {
                    table: header.table,
                    name: header.name,
                    unique: header.unique,
                    columns,
                }
            })
            .collect())
    }

    async fn resolve_per_index(
        conn: &dyn RowQueryExecutor,
        headers: Vec<IndexHeader>,
        concurrency: usize,
    ) -> Result<Vec<IndexRecord>> {
        futures::stream::iter(headers)
            .map(|header| async move {
                let params = [header.table.as_str(), header.name.as_str()];
                let rows = run_query(conn, &queries::INDEX_MEMBER_COLUMNS, &params).await?;
                let names = AttributeNames::from_member_rows(&header.table, &rows)?;
                let owner = format!("index '{}'", header.name);
                let columns = names.resolve(&header.table, &owner, &header.indkey);

                Ok::<_, DbDocError>(IndexRecord {
                    table: header.table,
                    name: header.name,
                    unique: header.unique,
                    columns,
                })
            })
            .buffered(concurrency)
            .try_collect()
            .await
    }
}

#[async_trait]
impl SchemaAdapter for PostgresAdapter {
    fn engine(&self) -> Engine {
        Engine::PostgreSQL
    }

    fn config(&self) -> &IntrospectionConfig {
        &self.config
    }

    async fn fetch_columns(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<ColumnRecord>> {
        let rows = run_query(conn, &queries::COLUMNS, &[]).await?;

        rows.iter()
            .map(|row| {
                let type_name = row.text(2, "type_name")?;
                let attlen = row.int(3, "attlen")?;
                let typmod = row.int(6, "atttypmod")?;

                Ok(ColumnRecord {
                    table: row.text(0, "table_name")?,
                    name: row.text(1, "column_name")?,
                    nullable: nullable_from_not_null_flag(row, 4)?,
                    has_default: boolean_flag(row, 5, "atthasdef")?,
                    length: column_length(&type_name, attlen, typmod),
                    type_name,
                })
            })
            .collect()
    }

    async fn fetch_foreign_keys(&self, conn: &dyn RowQueryExecutor) -> Result<ForeignKeyScan> {
        match self.foreign_keys {
            ForeignKeyDiscovery::Triggers => {
                let rows = run_query(conn, &queries::FOREIGN_KEY_TRIGGERS, &[]).await?;
                triggers::collect_foreign_keys(&rows, self.config.foreign_key_policy)
            }
            ForeignKeyDiscovery::Constraints => Self::fetch_constraint_keys(conn).await,
        }
    }

    async fn fetch_defaults(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<DefaultRecord>> {
        let rows = run_query(conn, &queries::DEFAULTS, &[]).await?;

        rows.iter()
            .map(|row| {
                Ok(DefaultRecord {
                    table: row.text(0, "table_name")?,
                    column: row.text(1, "column_name")?,
                    expression: row.optional_text(2, "default_expression")?,
                })
            })
            .collect()
    }

    async fn fetch_primary_keys(
        &self,
        conn: &dyn RowQueryExecutor,
    ) -> Result<Vec<PrimaryKeyRecord>> {
        let rows = run_query(conn, &queries::PRIMARY_KEYS, &[]).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let names = Self::attribute_names(conn).await?;
        let mut keys = Vec::new();

        for row in &rows {
            let table = row.text(0, "table_name")?;
            let attnums = parse_indkey(row.query(), &row.text(1, "indkey")?)?;

            for column in names.resolve(&table, "primary key", &attnums) {
                keys.push(PrimaryKeyRecord {
                    table: table.clone(),
                    column,
                });
            }
        }

        Ok(keys)
    }

    async fn fetch_indexes(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<IndexRecord>> {
        let headers = Self::fetch_index_headers(conn).await?;
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
