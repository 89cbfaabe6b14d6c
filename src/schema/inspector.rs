//! Catalog introspection behind the [`SchemaInspector`] contract.
//!
//! The two-method contract keeps the rest of the pipeline independent of the
//! database engine: alternate engines are added as new implementations, and
//! the mapper, resolver, and renderer never see a connection. All queries go
//! against `information_schema`/`pg_catalog` only; no data rows are read.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Nullable, Text};
use tracing::debug;

use crate::error::GeneratorError;
use crate::schema::{ColumnMetadata, ForeignKeyMetadata, TableMetadata};

/// Read-only view of the database's schema metadata.
pub trait SchemaInspector {
    /// All base-table names in the target schema, sorted.
    fn list_tables(&mut self) -> Result<Vec<String>, GeneratorError>;

    /// Full metadata for the given tables, in the given order.
    ///
    /// Reports every missing table at once via
    /// [`GeneratorError::TablesNotFound`]; never silently skips one.
    fn describe(&mut self, tables: &[String]) -> Result<Vec<TableMetadata>, GeneratorError>;
}

const LIST_TABLES_SQL: &str = "\
SELECT table_name::text AS table_name \
FROM information_schema.tables \
WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
ORDER BY table_name";

const COLUMNS_SQL: &str = "\
SELECT c.column_name::text AS column_name, \
       c.data_type::text AS data_type, \
       c.udt_name::text AS udt_name, \
       c.character_maximum_length::int4 AS character_maximum_length, \
       c.numeric_precision::int4 AS numeric_precision, \
       c.numeric_scale::int4 AS numeric_scale, \
       c.is_nullable::text AS is_nullable, \
       c.is_identity::text AS is_identity, \
       c.column_default::text AS column_default, \
       col_description(format('%I.%I', c.table_schema, c.table_name)::regclass::oid, \
                       c.ordinal_position::int4) AS column_comment \
FROM information_schema.columns c \
WHERE c.table_schema = 'public' AND c.table_name = $1 \
ORDER BY c.ordinal_position";

const PRIMARY_KEY_SQL: &str = "\
SELECT kcu.column_name::text AS column_name \
FROM information_schema.table_constraints tc \
JOIN information_schema.key_column_usage kcu \
  ON kcu.constraint_name = tc.constraint_name \
 AND kcu.table_schema = tc.table_schema \
WHERE tc.table_schema = 'public' \
  AND tc.table_name = $1 \
  AND tc.constraint_type = 'PRIMARY KEY' \
ORDER BY kcu.ordinal_position";

const FOREIGN_KEY_SQL: &str = "\
SELECT kcu.column_name::text AS source_column, \
       ccu.table_name::text AS target_table, \
       ccu.column_name::text AS target_column \
FROM information_schema.table_constraints tc \
JOIN information_schema.key_column_usage kcu \
  ON kcu.constraint_name = tc.constraint_name \
 AND kcu.table_schema = tc.table_schema \
JOIN information_schema.constraint_column_usage ccu \
  ON ccu.constraint_name = tc.constraint_name \
 AND ccu.table_schema = tc.table_schema \
WHERE tc.table_schema = 'public' \
  AND tc.table_name = $1 \
  AND tc.constraint_type = 'FOREIGN KEY' \
ORDER BY tc.constraint_name, kcu.ordinal_position";

#[derive(QueryableByName)]
struct TableNameRow {
    #[diesel(sql_type = Text)]
    table_name: String,
}

#[derive(QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    data_type: String,
    #[diesel(sql_type = Text)]
    udt_name: String,
    #[diesel(sql_type = Nullable<Integer>)]
    character_maximum_length: Option<i32>,
    #[diesel(sql_type = Nullable<Integer>)]
    numeric_precision: Option<i32>,
    #[diesel(sql_type = Nullable<Integer>)]
    numeric_scale: Option<i32>,
    #[diesel(sql_type = Text)]
    is_nullable: String,
    #[diesel(sql_type = Text)]
    is_identity: String,
    #[diesel(sql_type = Nullable<Text>)]
    column_default: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    column_comment: Option<String>,
}

#[derive(QueryableByName)]
struct PrimaryKeyRow {
    #[diesel(sql_type = Text)]
    column_name: String,
}

#[derive(QueryableByName)]
struct ForeignKeyRow {
    #[diesel(sql_type = Text)]
    source_column: String,
    #[diesel(sql_type = Text)]
    target_table: String,
    #[diesel(sql_type = Text)]
    target_column: String,
}

/// PostgreSQL implementation of [`SchemaInspector`].
///
/// Holds a single connection; the orchestrator keeps the inspector alive only
/// for the inspection phase, so the connection is released (dropped) before
/// any rendering or file writing starts.
pub struct PgInspector {
    conn: PgConnection,
}

impl PgInspector {
    /// Connect to the database described by `database_url`.
    ///
    /// The URL should carry a bounded `connect_timeout` (see
    /// [`crate::config::ConnectionConfig::database_url`]); establishment
    /// failures and timeouts surface as [`GeneratorError::Connectivity`].
    pub fn connect(database_url: &str) -> Result<Self, GeneratorError> {
        let conn = PgConnection::establish(database_url)
            .map_err(|e| GeneratorError::Connectivity(e.to_string()))?;
        Ok(PgInspector { conn })
    }

    fn describe_one(&mut self, table: &str) -> Result<TableMetadata, GeneratorError> {
        debug!(table, "describing table");

        let column_rows: Vec<ColumnRow> = sql_query(COLUMNS_SQL)
            .bind::<Text, _>(table)
            .load(&mut self.conn)
            .map_err(|e| GeneratorError::Connectivity(format!("column query failed: {}", e)))?;

        let pk_rows: Vec<PrimaryKeyRow> = sql_query(PRIMARY_KEY_SQL)
            .bind::<Text, _>(table)
            .load(&mut self.conn)
            .map_err(|e| GeneratorError::Connectivity(format!("primary key query failed: {}", e)))?;
        let primary_keys: Vec<String> = pk_rows.into_iter().map(|r| r.column_name).collect();

        let fk_rows: Vec<ForeignKeyRow> = sql_query(FOREIGN_KEY_SQL)
            .bind::<Text, _>(table)
            .load(&mut self.conn)
            .map_err(|e| GeneratorError::Connectivity(format!("foreign key query failed: {}", e)))?;

        let columns = column_rows
            .into_iter()
            .map(|row| {
                let is_primary_key = primary_keys.iter().any(|pk| pk == &row.column_name);
                let is_auto_increment = row.is_identity == "YES"
                    || row
                        .column_default
                        .as_deref()
                        .map(|d| d.starts_with("nextval("))
                        .unwrap_or(false);

                ColumnMetadata {
                    name: row.column_name,
                    native_type: native_type_of(&row.data_type, &row.udt_name),
                    length: row.character_maximum_length.map(|v| v as u32),
                    precision: row.numeric_precision.map(|v| v as u32),
                    scale: row.numeric_scale.map(|v| v as u32),
                    nullable: row.is_nullable == "YES",
                    is_primary_key,
                    is_auto_increment,
                    default_expr: row.column_default,
                    comment: row.column_comment,
                }
            })
            .collect();

        let foreign_keys = fk_rows
            .into_iter()
            .map(|row| ForeignKeyMetadata {
                source_column: row.source_column,
                target_table: row.target_table,
                target_column: row.target_column,
            })
            .collect();

        Ok(TableMetadata {
            name: table.to_string(),
            columns,
            foreign_keys,
        })
    }
}

impl SchemaInspector for PgInspector {
    fn list_tables(&mut self) -> Result<Vec<String>, GeneratorError> {
        debug!("listing tables");
        let rows: Vec<TableNameRow> = sql_query(LIST_TABLES_SQL)
            .load(&mut self.conn)
            .map_err(|e| GeneratorError::Connectivity(format!("table listing failed: {}", e)))?;
        Ok(rows.into_iter().map(|r| r.table_name).collect())
    }

    fn describe(&mut self, tables: &[String]) -> Result<Vec<TableMetadata>, GeneratorError> {
        let known = self.list_tables()?;

        let missing: Vec<String> = tables
            .iter()
            .filter(|t| !known.contains(t))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(GeneratorError::TablesNotFound(missing));
        }

        tables.iter().map(|t| self.describe_one(t)).collect()
    }
}

/// Canonical native type name from the catalog's `data_type`/`udt_name` pair.
///
/// Arrays come back as `data_type = 'ARRAY'` with an underscore-prefixed
/// element in `udt_name`; those become `"<element>[]"` so the type mapper can
/// recurse on the element.
fn native_type_of(data_type: &str, udt_name: &str) -> String {
    if data_type.eq_ignore_ascii_case("ARRAY") {
        format!("{}[]", udt_name.trim_start_matches('_').to_lowercase())
    } else if data_type.eq_ignore_ascii_case("USER-DEFINED") {
        udt_name.to_lowercase()
    } else {
        data_type.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_type_plain() {
        assert_eq!(native_type_of("character varying", "varchar"), "character varying");
        assert_eq!(native_type_of("integer", "int4"), "integer");
    }

    #[test]
    fn test_native_type_array_uses_element() {
        assert_eq!(native_type_of("ARRAY", "_varchar"), "varchar[]");
        assert_eq!(native_type_of("ARRAY", "_int4"), "int4[]");
    }

    #[test]
    fn test_native_type_user_defined_falls_back_to_udt() {
        assert_eq!(native_type_of("USER-DEFINED", "citext"), "citext");
    }
}
