//! In-memory schema graph built from catalog introspection.
//!
//! These types are read once per generator invocation and never mutated
//! afterwards; everything downstream (type mapping, relationship resolution,
//! rendering) treats them as immutable input.

pub mod inspector;

pub use inspector::{PgInspector, SchemaInspector};

/// A single column as described by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    pub name: String,
    /// Native type name, lowercased, without parameterization
    /// (e.g. "character varying", "numeric", "varchar[]").
    pub native_type: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub default_expr: Option<String>,
    pub comment: Option<String>,
}

/// A foreign-key constraint column pair.
///
/// Self-referencing keys (`target_table` equal to the owning table) are
/// valid and resolve to a named reference field, never an expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyMetadata {
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// One table: ordered columns plus its foreign keys.
///
/// Column order matches the catalog's physical order; generated field order
/// is derived from it, so it must be preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<ColumnMetadata>,
    pub foreign_keys: Vec<ForeignKeyMetadata>,
}

impl TableMetadata {
    /// Names of the primary-key columns, in column order.
    ///
    /// More than one entry means a composite key.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, primary_key: bool) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            native_type: "integer".to_string(),
            length: None,
            precision: None,
            scale: None,
            nullable: false,
            is_primary_key: primary_key,
            is_auto_increment: false,
            default_expr: None,
            comment: None,
        }
    }

    #[test]
    fn test_composite_primary_key_columns_preserve_order() {
        let table = TableMetadata {
            name: "order_items".to_string(),
            columns: vec![
                column("order_id", true),
                column("line_no", true),
                column("quantity", false),
            ],
            foreign_keys: vec![],
        };

        assert_eq!(table.primary_key_columns(), vec!["order_id", "line_no"]);
    }

    #[test]
    fn test_column_lookup() {
        let table = TableMetadata {
            name: "users".to_string(),
            columns: vec![column("id", true)],
            foreign_keys: vec![],
        };

        assert!(table.column("id").is_some());
        assert!(table.column("missing").is_none());
    }
}
