//! Identifier transforms between database and generated-source casing.
//!
//! Table names are snake_case and become PascalCase class names; column
//! names stay verbatim snake_case (valid Python attribute idiom, applied
//! uniformly). No singularization anywhere: `users` becomes `Users`, not
//! `User`.

use convert_case::{Case, Casing};
use std::collections::BTreeMap;

use crate::error::GeneratorError;

/// Class name for a table: capitalize each underscore-delimited segment and
/// concatenate (`fzu_notices` -> `FzuNotices`).
pub fn type_name(table_name: &str) -> String {
    table_name.to_case(Case::Pascal)
}

/// Attribute name for a column. Kept verbatim.
pub fn field_name(column_name: &str) -> String {
    column_name.to_string()
}

/// Module (file stem) for a table's generated source.
pub fn module_name(table_name: &str) -> String {
    table_name.to_lowercase()
}

/// Stem of a foreign-key column: `author_id` -> `author`.
///
/// Columns without the `_id` suffix keep their full name.
pub fn column_stem(column_name: &str) -> String {
    match column_name.strip_suffix("_id") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => column_name.to_string(),
    }
}

/// Fail fast when two distinct tables transform to the same type name.
///
/// Partial output under a collision would silently overwrite one model with
/// another, so this runs before any file is written.
pub fn ensure_unique_type_names(tables: &[String]) -> Result<(), GeneratorError> {
    let mut by_type: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for table in tables {
        by_type.entry(type_name(table)).or_default().push(table.clone());
    }

    for (type_name, sources) in by_type {
        if sources.len() > 1 {
            return Err(GeneratorError::NameCollision {
                type_name,
                tables: sources,
            });
        }
    }

    Ok(())
}
