//! # Modelgen: SQLAlchemy Model Generation from Live PostgreSQL Schemas
//!
//! Modelgen introspects a PostgreSQL database's catalog and emits
//! strongly-typed SQLAlchemy declarative models, one module per table plus a
//! shared base and a package index.
//!
//! ## Pipeline
//!
//! - **Schema inspection**: read-only catalog queries behind the
//!   [`SchemaInspector`] contract
//! - **Type mapping**: fixed native-type lookup with an opaque fallback for
//!   anything unknown
//! - **Relationship resolution**: foreign keys become paired
//!   many-to-one / one-to-many relation fields
//! - **Rendering**: deterministic per-table source emission; re-runs against
//!   an unchanged schema are byte-identical apart from one timestamp line
//!
//! ## Example
//!
//! ```rust,no_run
//! use modelgen::codegen::{generate, GenerationRequest};
//! use modelgen::schema::PgInspector;
//!
//! fn main() -> Result<(), modelgen::GeneratorError> {
//!     let inspector = PgInspector::connect("postgres://postgres@localhost/appdb")?;
//!     let report = generate(
//!         inspector,
//!         &GenerationRequest {
//!             tables: None,
//!             output_dir: "models".into(),
//!             generated_at: None,
//!         },
//!     )?;
//!     println!("generated {} tables", report.tables.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod schema;

// Code generation pipeline
pub mod codegen;

// Re-export key types
pub use config::{load_config, ConnectionConfig, GeneratorConfig};
pub use error::GeneratorError;
pub use schema::{ColumnMetadata, ForeignKeyMetadata, PgInspector, SchemaInspector, TableMetadata};

// Re-export codegen types
pub use codegen::{
    generate, GenerationReport, GenerationRequest, ModelIR, RelationKind, Relationship,
    TableReport, TableStatus, Warning,
};
