//! Fixture executor serving canned catalog rows.
//!
//! Responses are keyed by [`CatalogQuery::name`](super::CatalogQuery), so a
//! fixture survives edits to the SQL text. Queries without a registered
//! response return an empty result set, which mirrors a catalog that simply
//! has nothing of that kind.

use super::{CatalogQuery, CatalogRow, RowQueryExecutor};
use crate::{Result, error::DbDocError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory [`RowQueryExecutor`] for tests and offline demonstrations.
#[derive(Debug, Default)]
pub struct FixtureExecutor {
    responses: HashMap<&'static str, Vec<CatalogRow>>,
    parameterized: HashMap<(&'static str, Vec<String>), Vec<CatalogRow>>,
    failures: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FixtureExecutor {
    /// Creates an executor with no registered responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows returned by a parameterless query
    pub fn with_rows(mut self, query: &CatalogQuery, rows: Vec<CatalogRow>) -> Self {
        self.responses.insert(query.name, rows);
        self
    }

    /// Registers the rows returned by a query for one exact parameter list
    pub fn with_parameterized_rows(
        mut self,
        query: &CatalogQuery,
        params: &[&str],
        rows: Vec<CatalogRow>,
    ) -> Self {
        let key = (query.name, params.iter().map(|p| (*p).to_string()).collect());
        self.parameterized.insert(key, rows);
        self
    }

    /// Makes every execution of `query` fail as a lost connection would
    pub fn failing(mut self, query: &CatalogQuery) -> Self {
        self.failures.insert(query.name);
        self
    }

    /// Names of the queries executed so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, query: &CatalogQuery) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.name.to_string());
        }
    }
}

#[async_trait]
impl RowQueryExecutor for FixtureExecutor {
    async fn fetch_all(&self, query: &CatalogQuery, params: &[&str]) -> Result<Vec<CatalogRow>> {
        self.record(query);

        if self.failures.contains(query.name) {
            return Err(DbDocError::connectivity(
                format!("query '{}'", query.name),
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionAborted,
                    "fixture connection closed",
                ),
            ));
        }

        let rows = if params.is_empty() {
            self.responses.get(query.name)
        } else {
            let key = (query.name, params.iter().map(|p| (*p).to_string()).collect());
            self.parameterized.get(&key)
        };

        Ok(rows.cloned().unwrap_or_default())
    }
}
