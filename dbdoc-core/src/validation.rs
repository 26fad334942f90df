//! Reference checks run once per snapshot.
//!
//! Catalogs can be inconsistent (half-dropped objects, legacy trigger
//! arguments naming renamed columns), so a dangling reference is reported
//! as a warning and never aborts introspection. Foreign key targets are not
//! checked: they may legitimately point outside the introspected schema.

use crate::pivot::CatalogMaps;
use std::collections::{BTreeMap, HashSet};

/// Returns one warning per key, index or default column missing from its table.
pub fn verify_references(maps: &CatalogMaps) -> Vec<String> {
    let known: BTreeMap<&str, HashSet<&str>> = maps
        .columns
        .iter()
        .map(|(table, columns)| {
            (
                table.as_str(),
                columns.iter().map(|c| c.name.as_str()).collect(),
            )
        })
        .collect();

    let mut warnings = Vec::new();

    for (table, key) in &maps.primary_keys {
        check_members(&known, table, "primary key", key.iter(), &mut warnings);
    }

    for (table, indexes) in &maps.indexes {
        for (index, entry) in indexes {
            let role = format!("index '{}'", index);
            check_members(&known, table, &role, entry.columns.iter(), &mut warnings);
        }
    }

    for (table, keys) in &maps.foreign_keys {
        check_members(&known, table, "foreign key", keys.keys(), &mut warnings);
    }

    for (table, defaults) in &maps.defaults {
        check_members(&known, table, "default", defaults.keys(), &mut warnings);
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    warnings
}

fn check_members<'a>(
    known: &BTreeMap<&str, HashSet<&str>>,
    table: &str,
    role: &str,
    members: impl Iterator<Item = &'a String>,
    warnings: &mut Vec<String>,
) {
    let Some(columns) = known.get(table) else {
        warnings.push(format!(
            "{} references table '{}', which has no column metadata",
            role, table
        ));
        return;
    };

    for member in members {
        if !columns.contains(member.as_str()) {
            warnings.push(format!(
                "{} of table '{}' names unknown column '{}'",
                role, table, member
            ));
        }
    }
}
