//! Schema adapter contract and factory.
//!
//! One adapter per engine supplies the five catalog fetches; the shared
//! [`build_schema`] runs them, pivots the results and hands back one
//! immutable [`Schema`]. Callers depend on [`SchemaAdapter`] only, usually
//! through `Box<dyn SchemaAdapter>` from [`create_adapter`].
//!
//! # Module Structure
//! - `config`: Introspection configuration (IntrospectionConfig, IndexColumnStrategy, ForeignKeyPolicy)
//! - `helpers`: Flag and nullability normalization shared by both engines
//! - Engine modules (oracle, postgres)

use crate::executor::RowQueryExecutor;
use crate::models::{
    ColumnRecord, DefaultRecord, Engine, ForeignKeyScan, IndexRecord, PrimaryKeyRecord,
};
use crate::pivot::CatalogMaps;
use crate::schema::Schema;
use crate::{Result, validation};
use async_trait::async_trait;

pub mod config;
pub mod helpers;
pub mod oracle;
pub mod postgres;

pub use config::{ForeignKeyPolicy, IndexColumnStrategy, IntrospectionConfig};
pub use oracle::OracleAdapter;
pub use postgres::{ForeignKeyDiscovery, PostgresAdapter};

/// Engine-specific catalog access behind one object-safe contract.
///
/// Each fetch issues its catalog queries through the supplied executor and
/// returns normalized records. Fetches never depend on one another, so
/// [`build_schema`] may run them concurrently.
#[async_trait]
pub trait SchemaAdapter: Send + Sync {
    /// Engine whose catalogs this adapter reads
    fn engine(&self) -> Engine;

    /// Configuration applied to every introspection pass
    fn config(&self) -> &IntrospectionConfig;

    /// Columns of every user table, in catalog order within each table.
    ///
    /// # Errors
    /// Connectivity errors, or a catalog shape error on an unrecognized
    /// nullability or default flag.
    async fn fetch_columns(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<ColumnRecord>>;

    /// Foreign key owning columns with their targets.
    ///
    /// # Errors
    /// Connectivity errors, or a catalog shape error on a malformed entry
    /// under [`ForeignKeyPolicy::Strict`].
    async fn fetch_foreign_keys(&self, conn: &dyn RowQueryExecutor) -> Result<ForeignKeyScan>;

    /// Default expressions of columns whose catalog entry flags a default.
    async fn fetch_defaults(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<DefaultRecord>>;

    /// Primary key members, ordered by table then key position.
    async fn fetch_primary_keys(&self, conn: &dyn RowQueryExecutor)
    -> Result<Vec<PrimaryKeyRecord>>;

    /// Indexes with member columns in ordinal order.
    async fn fetch_indexes(&self, conn: &dyn RowQueryExecutor) -> Result<Vec<IndexRecord>>;

    /// Builds a snapshot from an already-open connection.
    ///
    /// `display_name` labels the snapshot only; it never scopes a query.
    ///
    /// # Errors
    /// Any fatal error from any fetch aborts the whole snapshot.
    async fn open(&self, conn: &dyn RowQueryExecutor, display_name: &str) -> Result<Schema> {
        build_schema(self, conn, display_name).await
    }
}

/// Runs the five catalog fetches and assembles one snapshot.
///
/// The fetches are issued concurrently and the first failure wins; nothing
/// is pivoted until every fetch has succeeded.
///
/// # Errors
/// Returns a configuration error for an invalid [`IntrospectionConfig`],
/// otherwise the first connectivity or catalog shape error encountered.
pub async fn build_schema<A>(
    adapter: &A,
    conn: &dyn RowQueryExecutor,
    display_name: &str,
) -> Result<Schema>
where
    A: SchemaAdapter + ?Sized,
{
    adapter.config().validate()?;

    let started = std::time::Instant::now();
    tracing::debug!(
        "Starting {} catalog introspection for '{}'",
        adapter.engine(),
        display_name
    );

    let (columns, foreign_keys, defaults, primary_keys, indexes) = futures::try_join!(
        adapter.fetch_columns(conn),
        adapter.fetch_foreign_keys(conn),
        adapter.fetch_defaults(conn),
        adapter.fetch_primary_keys(conn),
        adapter.fetch_indexes(conn),
    )?;

    let ForeignKeyScan { keys, skipped } = foreign_keys;
    let maps = CatalogMaps::from_records(columns, keys, defaults, primary_keys, indexes);

    let mut warnings = skipped;
    if adapter.config().verify_references {
        warnings.extend(validation::verify_references(&maps));
    }

    let schema = Schema::from_maps(display_name, adapter.engine(), maps, warnings);

    tracing::info!(
        "Introspected {} tables from {} schema '{}' in {:.2}s ({} warnings)",
        schema.len(),
        schema.engine(),
        schema.name(),
        started.elapsed().as_secs_f64(),
        schema.warnings().len()
    );

    Ok(schema)
}

/// Creates the adapter for `engine`.
///
/// The Postgres adapter uses [`ForeignKeyDiscovery::Triggers`]; construct
/// [`PostgresAdapter`] directly to pick constraint-based discovery.
pub fn create_adapter(engine: Engine, config: IntrospectionConfig) -> Box<dyn SchemaAdapter> {
    match engine {
        Engine::Oracle => Box::new(OracleAdapter::new(config)),
        Engine::PostgreSQL => Box::new(PostgresAdapter::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_adapter_by_engine() {
        let oracle = create_adapter(Engine::Oracle, IntrospectionConfig::default());
        let postgres = create_adapter(Engine::PostgreSQL, IntrospectionConfig::default());

        assert_eq!(oracle.engine(), Engine::Oracle);
        assert_eq!(postgres.engine(), Engine::PostgreSQL);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_any_query() {
        let config = IntrospectionConfig::new().with_index_query_concurrency(0);
        let adapter = create_adapter(Engine::Oracle, config);
        let conn = crate::executor::FixtureExecutor::new();

        let error = adapter.open(&conn, "ORCL").await.unwrap_err();

        assert!(matches!(error, crate::error::DbDocError::Configuration { .. }));
        assert!(conn.calls().is_empty());
    }
}
