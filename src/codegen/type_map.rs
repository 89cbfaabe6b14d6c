//! Native column types to SQLAlchemy storage types.
//!
//! The lookup table is a process-wide immutable map constructed on first
//! use. Mapping is pure: identical column metadata always yields identical
//! output. Unknown native types degrade to the opaque `Text` storage type
//! with a warning; the mapper never fails a run.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

use crate::codegen::report::Warning;
use crate::schema::ColumnMetadata;

/// Resolved storage type plus the richer Python-side semantic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeMapping {
    /// SQLAlchemy column type expression, e.g. `String(50)` or
    /// `DateTime(timezone=True)`.
    pub storage: String,
    /// Semantic Python type, e.g. `decimal.Decimal` or `uuid.UUID`.
    pub python_hint: String,
}

/// `native type -> (SQLAlchemy constructor, Python hint)`, keyed by the
/// lowercased, parameter-stripped type name. Both the catalog's verbose
/// names (`character varying`) and the short udt aliases (`varchar`,
/// `int4`) are present so array elements resolve too.
fn lookup_table() -> &'static IndexMap<&'static str, (&'static str, &'static str)> {
    static TABLE: OnceLock<IndexMap<&'static str, (&'static str, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        IndexMap::from([
            ("smallint", ("SmallInteger", "int")),
            ("int2", ("SmallInteger", "int")),
            ("integer", ("Integer", "int")),
            ("int", ("Integer", "int")),
            ("int4", ("Integer", "int")),
            ("serial", ("Integer", "int")),
            ("bigint", ("BigInteger", "int")),
            ("int8", ("BigInteger", "int")),
            ("bigserial", ("BigInteger", "int")),
            ("numeric", ("Numeric", "decimal.Decimal")),
            ("decimal", ("Numeric", "decimal.Decimal")),
            ("real", ("Float", "float")),
            ("float4", ("Float", "float")),
            ("double precision", ("Float", "float")),
            ("float8", ("Float", "float")),
            ("boolean", ("Boolean", "bool")),
            ("bool", ("Boolean", "bool")),
            ("character varying", ("String", "str")),
            ("varchar", ("String", "str")),
            ("character", ("String", "str")),
            ("char", ("String", "str")),
            ("bpchar", ("String", "str")),
            ("text", ("Text", "str")),
            ("date", ("Date", "datetime.date")),
            ("time", ("Time", "datetime.time")),
            ("time without time zone", ("Time", "datetime.time")),
            ("time with time zone", ("Time", "datetime.time")),
            ("timetz", ("Time", "datetime.time")),
            ("timestamp", ("DateTime", "datetime.datetime")),
            ("timestamp without time zone", ("DateTime", "datetime.datetime")),
            ("timestamp with time zone", ("DateTime(timezone=True)", "datetime.datetime")),
            ("timestamptz", ("DateTime(timezone=True)", "datetime.datetime")),
            ("json", ("JSON", "dict")),
            ("jsonb", ("JSONB", "dict")),
            ("uuid", ("UUID(as_uuid=True)", "uuid.UUID")),
            ("bytea", ("LargeBinary", "bytes")),
        ])
    })
}

fn parameter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "varchar(50)" -> "varchar", "timestamp(6) with time zone" -> "timestamp with time zone"
    RE.get_or_init(|| Regex::new(r"\s*\([^)]*\)").expect("valid regex"))
}

/// Lowercase and strip parameterization from a native type name.
pub fn normalize_native_type(native_type: &str) -> String {
    let stripped = parameter_regex().replace_all(native_type, "");
    stripped.trim().to_lowercase()
}

/// Map one column's native type to its field type.
///
/// Array types map recursively: the element is resolved first, then wrapped
/// as `ARRAY(<element>)`. Unknown types (and unknown or nested array
/// elements) degrade to the opaque `Text` storage type and record an
/// [`Warning::UnmappableType`].
pub fn map(column: &ColumnMetadata) -> (FieldTypeMapping, Vec<Warning>) {
    let normalized = normalize_native_type(&column.native_type);

    if let Some(element) = normalized.strip_suffix("[]") {
        return map_array(column, element);
    }

    match lookup_table().get(normalized.as_str()) {
        Some((constructor, hint)) => (
            FieldTypeMapping {
                storage: parameterize(constructor, column),
                python_hint: (*hint).to_string(),
            },
            Vec::new(),
        ),
        None => opaque_fallback(column),
    }
}

fn map_array(column: &ColumnMetadata, element: &str) -> (FieldTypeMapping, Vec<Warning>) {
    // Nested arrays and unmapped element types degrade to ARRAY(Text).
    let element = element.trim();
    if element.ends_with("[]") {
        return degraded_array(column);
    }

    match lookup_table().get(element) {
        Some((constructor, hint)) => (
            FieldTypeMapping {
                // Element parameterization is not recorded by the catalog
                // for arrays, so the bare constructor is used.
                storage: format!("ARRAY({})", constructor),
                python_hint: format!("list[{}]", hint),
            },
            Vec::new(),
        ),
        None => degraded_array(column),
    }
}

fn degraded_array(column: &ColumnMetadata) -> (FieldTypeMapping, Vec<Warning>) {
    (
        FieldTypeMapping {
            storage: "ARRAY(Text)".to_string(),
            python_hint: "list".to_string(),
        },
        vec![Warning::UnmappableType {
            column: column.name.clone(),
            native_type: column.native_type.clone(),
        }],
    )
}

fn opaque_fallback(column: &ColumnMetadata) -> (FieldTypeMapping, Vec<Warning>) {
    (
        FieldTypeMapping {
            storage: "Text".to_string(),
            python_hint: "str".to_string(),
        },
        vec![Warning::UnmappableType {
            column: column.name.clone(),
            native_type: column.native_type.clone(),
        }],
    )
}

/// Attach length or precision/scale to constructors that accept them.
fn parameterize(constructor: &str, column: &ColumnMetadata) -> String {
    match constructor {
        "String" => match column.length {
            Some(length) => format!("String({})", length),
            None => "String".to_string(),
        },
        "Numeric" => match (column.precision, column.scale) {
            (Some(precision), Some(scale)) => format!("Numeric({}, {})", precision, scale),
            (Some(precision), None) => format!("Numeric({})", precision),
            _ => "Numeric".to_string(),
        },
        other => other.to_string(),
    }
}
