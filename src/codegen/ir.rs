//! Renderer-ready intermediate representation of one generated model.
//!
//! Built per table from the schema graph, the type mapper, and the resolved
//! relationships. The renderer consumes this and nothing else.

use crate::codegen::naming;
use crate::codegen::relationships::{RelationKind, Relationship};
use crate::codegen::report::Warning;
use crate::codegen::type_map;
use crate::schema::{ColumnMetadata, TableMetadata};

/// Column default translated to target syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerDefault {
    /// `now()` / `CURRENT_TIMESTAMP` -> `server_default=func.now()`.
    Now,
    /// Any other literal expression, rendered as `server_default=text("...")`.
    Expr(String),
}

/// One generated column field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIR {
    pub name: String,
    pub storage: String,
    pub python_hint: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub server_default: Option<ServerDefault>,
    pub comment: Option<String>,
}

/// One generated relation field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationIR {
    pub field_name: String,
    pub related_table: String,
    pub related_class: String,
    pub kind: RelationKind,
    /// Class carrying the foreign-key column (the "many" side).
    pub source_class: String,
    pub source_column: String,
    pub back_populates: String,
    pub cascade_delete: bool,
    /// Primary-key field for the `remote_side` of a self-reference.
    pub remote_side: Option<String>,
    pub dangling: bool,
}

/// Everything the renderer needs for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIR {
    pub class_name: String,
    pub table_name: String,
    pub fields: Vec<FieldIR>,
    pub relations: Vec<RelationIR>,
}

impl ModelIR {
    /// Primary-key field names, in declaration order.
    pub fn primary_key_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| f.name.as_str())
            .collect()
    }
}

fn translate_default(column: &ColumnMetadata) -> Option<ServerDefault> {
    let expr = column.default_expr.as_deref()?.trim();
    if expr.is_empty() || expr.starts_with("nextval(") {
        // Sequence defaults are expressed as autoincrement, not a default.
        return None;
    }
    let lowered = expr.to_lowercase();
    if lowered.contains("now()") || lowered.contains("current_timestamp") {
        return Some(ServerDefault::Now);
    }
    Some(ServerDefault::Expr(expr.to_string()))
}

/// Assemble the IR for one table.
///
/// `relations` is the full resolved set; only relations owned by this table
/// are taken, in resolver order. Type-mapper warnings are surfaced for the
/// generation report.
pub fn build_model_ir(
    table: &TableMetadata,
    relations: &[Relationship],
) -> (ModelIR, Vec<Warning>) {
    let mut warnings = Vec::new();

    let fields = table
        .columns
        .iter()
        .map(|column| {
            let (mapping, mut field_warnings) = type_map::map(column);
            warnings.append(&mut field_warnings);
            FieldIR {
                name: naming::field_name(&column.name),
                storage: mapping.storage,
                python_hint: mapping.python_hint,
                nullable: column.nullable,
                primary_key: column.is_primary_key,
                auto_increment: column.is_auto_increment,
                server_default: translate_default(column),
                comment: column.comment.clone(),
            }
        })
        .collect();

    let primary_key = table.primary_key_columns().first().map(|s| s.to_string());

    let relation_irs = relations
        .iter()
        .filter(|r| r.owner_table == table.name)
        .map(|r| {
            let self_referencing =
                r.kind == RelationKind::ManyToOne && r.related_table == table.name;
            RelationIR {
                field_name: r.field_name.clone(),
                related_table: r.related_table.clone(),
                related_class: r.related_class.clone(),
                kind: r.kind,
                source_class: naming::type_name(&r.source_table),
                source_column: r.source_column.clone(),
                back_populates: r.back_populates.clone(),
                cascade_delete: r.cascade_delete,
                remote_side: if self_referencing {
                    primary_key.clone()
                } else {
                    None
                },
                dangling: r.dangling,
            }
        })
        .collect();

    let ir = ModelIR {
        class_name: naming::type_name(&table.name),
        table_name: table.name.clone(),
        fields,
        relations: relation_irs,
    };

    (ir, warnings)
}
