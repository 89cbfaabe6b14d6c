//! Error types for the generation pipeline.
//!
//! Fatal conditions are represented by [`GeneratorError`]; recoverable
//! conditions (unmapped types, dangling relations) are warnings carried in
//! the generation report, not errors.

use std::fmt;
use std::path::PathBuf;

/// Fatal error raised by the generator.
#[derive(Debug)]
pub enum GeneratorError {
    /// Cannot reach or authenticate to the database.
    Connectivity(String),
    /// One or more requested tables are absent from the catalog.
    /// Carries every missing name, not just the first.
    TablesNotFound(Vec<String>),
    /// Two distinct tables transform to the same type name.
    NameCollision {
        type_name: String,
        tables: Vec<String>,
    },
    /// Failed to write a generated file.
    Io { path: PathBuf, message: String },
    /// Invalid or unreadable configuration.
    Config(String),
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Connectivity(msg) => {
                write!(f, "Database connection failed: {}", msg)
            }
            GeneratorError::TablesNotFound(tables) => {
                write!(f, "Tables not found in catalog: {}", tables.join(", "))
            }
            GeneratorError::NameCollision { type_name, tables } => {
                write!(
                    f,
                    "Tables {} all map to type name '{}'",
                    tables.join(", "),
                    type_name
                )
            }
            GeneratorError::Io { path, message } => {
                write!(f, "Failed to write {}: {}", path.display(), message)
            }
            GeneratorError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for GeneratorError {}

impl GeneratorError {
    /// Process exit code for this error class.
    ///
    /// The CLI contract distinguishes success (0), connectivity failure (2),
    /// schema errors (3), and output I/O failure (4). Configuration problems
    /// use the generic failure code 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            GeneratorError::Config(_) => 1,
            GeneratorError::Connectivity(_) => 2,
            GeneratorError::TablesNotFound(_) | GeneratorError::NameCollision { .. } => 3,
            GeneratorError::Io { .. } => 4,
        }
    }
}
