//! Foreign key discovery from legacy referential triggers.
//!
//! Before native constraint catalogs, a `REFERENCES` clause was implemented
//! as three constraint triggers (`RI_FKey_check_ins`, `..._upd`, `..._del`)
//! whose arguments carry the whole key definition packed into one blob:
//!
//! ```text
//! constraint \0 owning table \0 referenced table \0 match type \0 column \0 referenced key \0
//! ```
//!
//! Only single-column keys fit this shape. Depending on how the bytes reach
//! the client the blob is either raw text with literal NUL separators, or
//! the `bytea` escape format, where NUL and every high-bit byte appear as
//! `\nnn` octal escapes and a backslash is doubled.

use crate::adapters::config::ForeignKeyPolicy;
use crate::error::DbDocError;
use crate::executor::CatalogRow;
use crate::models::{ForeignKeyRecord, ForeignKeyRef, ForeignKeyScan};
use crate::Result;

/// Number of fields in a well-formed trigger argument blob, trailing blank included
pub const TRIGGER_ARG_FIELDS: usize = 7;

/// Decodes the `bytea` escape format back into raw bytes.
fn unescape_bytea(raw: &str) -> Result<Vec<u8>> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            decoded.push(bytes[i]);
            i += 1;
            continue;
        }

        if bytes.get(i + 1) == Some(&b'\\') {
            decoded.push(b'\\');
            i += 2;
            continue;
        }

        let octal = bytes
            .get(i + 1..i + 4)
            .and_then(|digits| std::str::from_utf8(digits).ok())
            .filter(|digits| digits.bytes().all(|d| (b'0'..=b'7').contains(&d)))
            .and_then(|digits| u8::from_str_radix(digits, 8).ok())
            .ok_or_else(|| {
                DbDocError::catalog_shape(format!(
                    "error parsing trigger args for foreign key: invalid escape at byte {} in {:?}",
                    i, raw
                ))
            })?;
        decoded.push(octal);
        i += 4;
    }

    Ok(decoded)
}

/// Splits a packed trigger argument blob on its NUL separators.
///
/// A blob holding a literal NUL is taken as already decoded. Otherwise it is
/// read as the `bytea` escape format: escapes are decoded first, then the
/// bytes are split on NUL and each field must be valid UTF-8.
///
/// # Errors
/// Returns a catalog shape error for a malformed escape or a field that is
/// not valid UTF-8.
pub fn split_trigger_args(raw: &str) -> Result<Vec<String>> {
    if raw.contains('\0') {
        return Ok(raw.split('\0').map(str::to_string).collect());
    }

    unescape_bytea(raw)?
        .split(|byte| *byte == 0)
        .map(|field| {
            String::from_utf8(field.to_vec()).map_err(|e| {
                DbDocError::catalog_shape(format!(
                    "error parsing trigger args for foreign key: field is not UTF-8 ({}) in {:?}",
                    e, raw
                ))
            })
        })
        .collect()
}

/// Parses one blob into the foreign key it describes.
///
/// # Errors
/// Returns a catalog shape error listing every split field when the blob
/// does not split into exactly [`TRIGGER_ARG_FIELDS`] fields, or when the
/// blob itself cannot be decoded.
pub fn parse_trigger_args(raw: &str) -> Result<ForeignKeyRecord> {
    let fields = split_trigger_args(raw)?;

    match fields.as_slice() {
        [_constraint, owner_table, referenced_table, _match_type, column, referenced_key, _blank] => {
            Ok(ForeignKeyRecord {
                table: owner_table.clone(),
                column: column.clone(),
                target: ForeignKeyRef {
                    referenced_table: referenced_table.clone(),
                    referenced_key: referenced_key.clone(),
                },
            })
        }
        _ => Err(DbDocError::catalog_shape(format!(
            "error parsing trigger args for foreign key: expected {} fields, found {}: {:?}",
            TRIGGER_ARG_FIELDS,
            fields.len(),
            fields
        ))),
    }
}

/// Interprets rows of the foreign key trigger query under `policy`.
///
/// Rows are `(trigger name, trigger table, packed arguments)`.
pub(crate) fn collect_foreign_keys(
    rows: &[CatalogRow],
    policy: ForeignKeyPolicy,
) -> Result<ForeignKeyScan> {
    let mut scan = ForeignKeyScan::default();

    for row in rows {
        let trigger = row.text(0, "trigger_name")?;
        let table = row.text(1, "trigger_table")?;
        let args = row.text(2, "trigger_args")?;

        match parse_trigger_args(&args) {
            Ok(key) => scan.keys.push(key),
            Err(error) => match policy {
                ForeignKeyPolicy::Strict => {
                    tracing::error!(
                        "Trigger '{}' on table '{}' has malformed arguments",
                        trigger,
                        table
                    );
                    return Err(DbDocError::catalog_shape(format!(
                        "trigger '{}' on table '{}': {}",
                        trigger, table, error
                    )));
                }
                ForeignKeyPolicy::Lenient => {
                    let message = format!(
                        "skipped foreign key trigger '{}' on table '{}': {}",
                        trigger, table, error
                    );
                    tracing::warn!("{}", message);
                    scan.skipped.push(message);
                }
            },
        }
    }

    tracing::debug!(
        "Parsed {} foreign keys from triggers ({} skipped)",
        scan.keys.len(),
        scan.skipped.len()
    );

    Ok(scan)
}
