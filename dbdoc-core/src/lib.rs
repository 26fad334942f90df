//! Schema introspection model and catalog adapters for dbdoc.
//!
//! This crate reads structural metadata (tables, columns, keys, defaults,
//! indexes) from a live database's system catalogs and assembles it into one
//! immutable [`Schema`] snapshot that documentation generators walk.
//!
//! # Guarantees
//! - All catalog access is read-only and goes through [`RowQueryExecutor`]
//! - The connection is borrowed: the core never opens or closes it
//! - Snapshots are all-or-nothing: any fatal error aborts construction
//! - Tables and indexes iterate sorted by name
//!
//! # Architecture
//! - `executor`: one statement in, all rows out
//! - `adapters`: per-engine catalog queries normalized into shared records
//! - `pivot`: flat records grouped into per-table maps
//! - `schema`: the snapshot and its borrowed Table/Column/Index views
//! - `validation`: dangling-reference warnings at build time
//! - `export`: owned, serializable documents for report generators
//! - `properties`: Java-style properties files for report labels
//!
//! # Example
//! ```rust
//! use dbdoc_core::adapters::{IntrospectionConfig, create_adapter};
//! use dbdoc_core::executor::FixtureExecutor;
//! use dbdoc_core::models::Engine;
//!
//! let adapter = create_adapter(Engine::Oracle, IntrospectionConfig::default());
//! let conn = FixtureExecutor::new();
//! let schema = futures::executor::block_on(adapter.open(&conn, "ORCL")).unwrap();
//! assert!(schema.table("MISSING").is_none());
//! ```

pub mod adapters;
pub mod error;
pub mod executor;
pub mod export;
pub mod logging;
pub mod models;
pub mod pivot;
pub mod properties;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use adapters::{
    ForeignKeyDiscovery, ForeignKeyPolicy, IndexColumnStrategy, IntrospectionConfig,
    OracleAdapter, PostgresAdapter, SchemaAdapter, build_schema, create_adapter,
};
pub use error::{DbDocError, Result};
pub use executor::{CatalogQuery, CatalogRow, CatalogValue, FixtureExecutor, RowQueryExecutor};
pub use export::SchemaDocument;
pub use models::{Engine, ForeignKeyRef};
pub use properties::Properties;
pub use schema::{Column, Index, Schema, Table};

#[cfg(feature = "postgresql")]
pub use executor::postgres::PgCatalogExecutor;
