//! Introspection configuration shared by all engine adapters.

use crate::{Result, error::DbDocError};

/// How index member columns are resolved once the index list is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexColumnStrategy {
    /// One join query per engine covering every index
    #[default]
    Batched,
    /// One parameterized follow-up query per index
    PerIndex,
}

/// What to do with a foreign key entry the adapter cannot interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyPolicy {
    /// Abort the snapshot with a catalog shape error
    #[default]
    Strict,
    /// Skip the entry and record a snapshot warning
    Lenient,
}

/// Configuration for one introspection pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectionConfig {
    /// How index member columns are resolved
    pub index_columns: IndexColumnStrategy,
    /// Upper bound on in-flight per-index follow-up queries
    pub index_query_concurrency: usize,
    /// Handling of foreign key entries that cannot be parsed
    pub foreign_key_policy: ForeignKeyPolicy,
    /// Check key and index columns against table columns at build time
    pub verify_references: bool,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            index_columns: IndexColumnStrategy::Batched,
            index_query_concurrency: 4,
            foreign_key_policy: ForeignKeyPolicy::Strict,
            verify_references: true,
        }
    }
}

impl IntrospectionConfig {
    /// Creates a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the index column resolution strategy
    pub fn with_index_columns(mut self, strategy: IndexColumnStrategy) -> Self {
        self.index_columns = strategy;
        self
    }

    /// Sets the per-index query concurrency
    pub fn with_index_query_concurrency(mut self, concurrency: usize) -> Self {
        self.index_query_concurrency = concurrency;
        self
    }

    /// Sets the foreign key policy
    pub fn with_foreign_key_policy(mut self, policy: ForeignKeyPolicy) -> Self {
        self.foreign_key_policy = policy;
        self
    }

    /// Enables or disables reference verification
    pub fn with_verify_references(mut self, verify: bool) -> Self {
        self.verify_references = verify;
        self
    }

    /// Validates configuration values
    pub fn validate(&self) -> Result<()> {
        if self.index_query_concurrency == 0 {
            return Err(DbDocError::configuration(
                "index_query_concurrency must be greater than 0",
            ));
        }

        if self.index_query_concurrency > 64 {
            return Err(DbDocError::configuration(
                "index_query_concurrency cannot exceed 64",
            ));
        }

        Ok(())
    }
}
