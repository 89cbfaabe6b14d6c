//! Generation report and non-fatal warnings.

use serde::Serialize;
use std::fmt;

/// Non-fatal condition recorded during mapping or resolution.
///
/// Warnings degrade output (opaque fallback type, skipped relation field)
/// but never abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Native type has no explicit mapping; the column degraded to the
    /// opaque text storage type.
    UnmappableType { column: String, native_type: String },
    /// A foreign key targets a table outside the requested generation set;
    /// the relation is recorded but its field is not rendered.
    DanglingRelation {
        source_column: String,
        target_table: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnmappableType { column, native_type } => {
                write!(
                    f,
                    "column '{}' has unmapped native type '{}', using opaque text",
                    column, native_type
                )
            }
            Warning::DanglingRelation {
                source_column,
                target_table,
            } => {
                write!(
                    f,
                    "foreign key '{}' targets '{}' which is outside the generation set",
                    source_column, target_table
                )
            }
        }
    }
}

/// Outcome of one table's generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Written,
    Failed { message: String },
}

/// Per-table record in the [`GenerationReport`].
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    pub class_name: String,
    /// Path of the written module, absent when the write failed.
    pub file: Option<String>,
    #[serde(flatten)]
    pub status: TableStatus,
    pub warnings: Vec<Warning>,
}

/// Result of one orchestrated generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub output_dir: String,
    pub generated_at: String,
    pub tables: Vec<TableReport>,
}

impl GenerationReport {
    /// True when at least one table failed to write.
    pub fn has_failures(&self) -> bool {
        self.tables
            .iter()
            .any(|t| matches!(t.status, TableStatus::Failed { .. }))
    }

    /// Total warnings across all tables.
    pub fn warning_count(&self) -> usize {
        self.tables.iter().map(|t| t.warnings.len()).sum()
    }
}
