//! Normalization helpers shared by the engine adapters.
//!
//! Engines encode the same facts differently: Oracle reports nullability as
//! `'Y'`/`'N'`, Postgres reports a not-null flag that drivers hand back as a
//! boolean, `'t'`/`'f'` or `1`/`0`. Everything is reduced to `bool` here, and
//! anything outside the documented codes is a catalog shape error.

use crate::executor::{CatalogRow, CatalogValue};
use crate::{Result, error::DbDocError};

/// Interprets a boolean-like catalog flag.
///
/// | raw value              | result  |
/// |------------------------|---------|
/// | `true`, `1`, `'t'`, `'1'` | `true`  |
/// | `false`, `0`, `'f'`, `'0'` | `false` |
///
/// # Errors
/// Any other value, including NULL, is a catalog shape error.
pub fn boolean_flag(row: &CatalogRow, index: usize, field: &str) -> Result<bool> {
    match row.value(index, field)? {
        CatalogValue::Bool(flag) => Ok(*flag),
        CatalogValue::Int(1) => Ok(true),
        CatalogValue::Int(0) => Ok(false),
        CatalogValue::Text(code) if code == "t" || code == "1" => Ok(true),
        CatalogValue::Text(code) if code == "f" || code == "0" => Ok(false),
        other => Err(DbDocError::unexpected_field(
            row.query(),
            field,
            format!("unrecognized boolean code {}", other),
        )),
    }
}

/// Oracle `NULLABLE`: `'Y'` means nullable, `'N'` means not null.
///
/// # Errors
/// Any other code is a catalog shape error.
pub fn nullable_from_yes_no(row: &CatalogRow, index: usize) -> Result<bool> {
    match row.value(index, "nullable")? {
        CatalogValue::Text(code) if code == "Y" => Ok(true),
        CatalogValue::Text(code) if code == "N" => Ok(false),
        other => Err(DbDocError::unexpected_field(
            row.query(),
            "nullable",
            format!("unrecognized nullability code {}", other),
        )),
    }
}

/// Postgres `attnotnull`: the column is nullable when the flag is false.
///
/// # Errors
/// Any code outside the boolean-like set is a catalog shape error.
pub fn nullable_from_not_null_flag(row: &CatalogRow, index: usize) -> Result<bool> {
    boolean_flag(row, index, "attnotnull").map(|not_null| !not_null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_row;

    #[test]
    fn test_oracle_nullability_mapping() {
        let row = catalog_row!["Y", "N", "y", CatalogValue::Null];

        assert!(nullable_from_yes_no(&row, 0).unwrap());
        assert!(!nullable_from_yes_no(&row, 1).unwrap());
        assert!(nullable_from_yes_no(&row, 2).unwrap_err().is_catalog_shape());
        assert!(nullable_from_yes_no(&row, 3).unwrap_err().is_catalog_shape());
    }

    #[test]
    fn test_postgres_nullability_mapping() {
        let row = catalog_row![true, false, 1, 0, "t", "f", "1", "0"];
        let expected = [false, true, false, true, false, true, false, true];

        for (index, nullable) in expected.into_iter().enumerate() {
            assert_eq!(
                nullable_from_not_null_flag(&row, index).unwrap(),
                nullable,
                "cell {}",
                index
            );
        }
    }

    #[test]
    fn test_postgres_nullability_rejects_unknown_codes() {
        let row = catalog_row!["Y", 2, "true", CatalogValue::Null];

        for index in 0..row.len() {
            let error = nullable_from_not_null_flag(&row, index).unwrap_err();
            assert!(error.is_catalog_shape(), "cell {}", index);
        }
    }
}
