//! Resolution of `pg_index.indkey` vectors into column names.
//!
//! `indkey` is an `int2vector` rendered as space-separated attribute
//! numbers in key order, e.g. `"1 3"`. An entry of `0` marks an expression
//! member, which has no column name.

use crate::error::DbDocError;
use crate::executor::CatalogRow;
use crate::Result;
use std::collections::HashMap;

/// Parses an `indkey` text rendering into attribute numbers, keeping order.
pub(crate) fn parse_indkey(query: &str, raw: &str) -> Result<Vec<i64>> {
    raw.split_whitespace()
        .map(|token| {
            token.parse::<i64>().map_err(|_| {
                DbDocError::unexpected_field(
                    query,
                    "indkey",
                    format!("invalid attribute number {:?} in {:?}", token, raw),
                )
            })
        })
        .collect()
}

/// Attribute names keyed by `(table, attnum)`.
#[derive(Debug, Default)]
pub(crate) struct AttributeNames {
    names: HashMap<(String, i64), String>,
}

impl AttributeNames {
    /// Builds the lookup from `(table, attnum, attname)` rows.
    pub(crate) fn from_rows(rows: &[CatalogRow]) -> Result<Self> {
        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            let table = row.text(0, "table_name")?;
            let attnum = row.int(1, "attnum")?;
            let name = row.text(2, "column_name")?;
            names.insert((table, attnum), name);
        }
        Ok(Self { names })
    }

    /// Builds the lookup for one table from `(attnum, attname)` rows.
    pub(crate) fn from_member_rows(table: &str, rows: &[CatalogRow]) -> Result<Self> {
        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            let attnum = row.int(0, "attnum")?;
            let name = row.text(1, "column_name")?;
            names.insert((table.to_string(), attnum), name);
        }
        Ok(Self { names })
    }

    /// Maps attribute numbers to names in the given order.
    ///
    /// Expression members and numbers without a live attribute are skipped
    /// with a warning naming `owner`.
    pub(crate) fn resolve(&self, table: &str, owner: &str, attnums: &[i64]) -> Vec<String> {
        let mut columns = Vec::with_capacity(attnums.len());
        for &attnum in attnums {
            if attnum == 0 {
                tracing::warn!(
                    "{} on table '{}' has an expression member; skipping it",
                    owner,
                    table
                );
                continue;
            }

            match self.names.get(&(table.to_string(), attnum)) {
                Some(name) => columns.push(name.clone()),
                None => tracing::warn!(
                    "{} on table '{}' names unknown attribute number {}",
                    owner,
                    table,
                    attnum
                ),
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_row;

    #[test]
    fn test_parse_indkey_keeps_order() {
        assert_eq!(parse_indkey("q", "3 1 2").unwrap(), vec![3, 1, 2]);
        assert_eq!(parse_indkey("q", "1").unwrap(), vec![1]);
        assert!(parse_indkey("q", "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_indkey_rejects_garbage() {
        let error = parse_indkey("postgres.indexes", "1 x").unwrap_err();

        assert!(error.is_catalog_shape());
        assert!(error.to_string().contains("postgres.indexes"));
    }

    #[test]
    fn test_resolve_in_key_order_and_skip_unknowns() {
        let rows = vec![
            catalog_row!["orders", 1, "id"],
            catalog_row!["orders", 2, "customer_id"],
            catalog_row!["orders", 3, "placed_at"],
        ];
        let names = AttributeNames::from_rows(&rows).unwrap();

        assert_eq!(
            names.resolve("orders", "index 'x'", &[3, 0, 1, 9]),
            vec!["placed_at", "id"]
        );
        assert!(names.resolve("other", "primary key", &[1]).is_empty());
    }

    #[test]
    fn test_member_rows_are_scoped_to_table() {
        let rows = vec![catalog_row![2, "email"], catalog_row!["1", "id"]];
        let names = AttributeNames::from_member_rows("users", &rows).unwrap();

        assert_eq!(names.resolve("users", "index", &[2, 1]), vec!["email", "id"]);
    }
}
