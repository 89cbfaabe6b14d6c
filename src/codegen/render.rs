//! SQLAlchemy source rendering from [`ModelIR`].
//!
//! Single-pass and deterministic: the same IR always renders byte-identical
//! output. The generation timestamp is confined to one docstring line so
//! diffs elsewhere stay stable across re-runs.

use crate::codegen::ir::{FieldIR, ModelIR, RelationIR, ServerDefault};
use crate::codegen::relationships::RelationKind;

/// Import preamble emitted at the top of every model module.
///
/// Kept identical across modules regardless of which types a table uses, so
/// output never reshuffles when a column changes type.
const MODEL_IMPORTS: &str = "\
from sqlalchemy import Column, Integer, SmallInteger, BigInteger, String, Text, Boolean, DateTime, Date, Time, Numeric, Float, JSON, LargeBinary, text
from sqlalchemy.dialects.postgresql import UUID, JSONB, ARRAY
from sqlalchemy.orm import relationship
from sqlalchemy.sql import func
from datetime import datetime, date, time
from decimal import Decimal
from typing import Optional, List
import uuid

from .base import Base
";

/// Escape a string for use inside a double-quoted Python literal.
fn escape_python_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn render_column(field: &FieldIR) -> String {
    let mut parts = vec![field.storage.clone()];

    if field.primary_key {
        parts.push("primary_key=True".to_string());
        if field.auto_increment {
            parts.push("autoincrement=True".to_string());
        }
    }

    if !field.nullable && !field.primary_key {
        parts.push("nullable=False".to_string());
    }

    match &field.server_default {
        Some(ServerDefault::Now) => parts.push("server_default=func.now()".to_string()),
        Some(ServerDefault::Expr(expr)) => {
            parts.push(format!("server_default=text(\"{}\")", escape_python_string(expr)));
        }
        None => {}
    }

    if let Some(comment) = &field.comment {
        parts.push(format!("comment=\"{}\"", escape_python_string(comment)));
    }

    format!("    {} = Column({})\n", field.name, parts.join(", "))
}

fn render_relation(relation: &RelationIR) -> String {
    let mut parts = vec![format!("\"{}\"", relation.related_class)];

    match relation.kind {
        RelationKind::ManyToOne => {
            // Local column object; disambiguates multi-edge associations.
            parts.push(format!("foreign_keys=[{}]", relation.source_column));
            if let Some(remote) = &relation.remote_side {
                parts.push(format!("remote_side=[{}]", remote));
            }
        }
        RelationKind::OneToMany => {
            parts.push(format!(
                "foreign_keys=\"[{}.{}]\"",
                relation.source_class, relation.source_column
            ));
        }
    }

    parts.push(format!("back_populates=\"{}\"", relation.back_populates));

    if relation.cascade_delete && relation.kind == RelationKind::OneToMany {
        parts.push("cascade=\"all, delete-orphan\"".to_string());
    }

    format!(
        "    {} = relationship({})\n",
        relation.field_name,
        parts.join(", ")
    )
}

/// Render one table's model module.
///
/// `generated_at` lands on exactly one line of the class docstring.
pub fn render_model(ir: &ModelIR, generated_at: &str) -> String {
    let mut out = String::new();

    out.push_str(MODEL_IMPORTS);
    out.push_str("\n\n");

    out.push_str(&format!("class {}(Base):\n", ir.class_name));
    out.push_str("    \"\"\"\n");
    out.push_str(&format!("    {} table model.\n", ir.table_name));
    out.push_str("\n");
    out.push_str(&format!("    Generated at: {}\n", generated_at));
    out.push_str("    \"\"\"\n");
    out.push_str(&format!("    __tablename__ = \"{}\"\n", ir.table_name));
    out.push_str("\n");

    for field in &ir.fields {
        out.push_str(&render_column(field));
    }

    let rendered_relations: Vec<&RelationIR> =
        ir.relations.iter().filter(|r| !r.dangling).collect();
    if !rendered_relations.is_empty() {
        out.push_str("\n");
        for relation in rendered_relations {
            out.push_str(&render_relation(relation));
        }
    }

    let repr_key = ir
        .primary_key_fields()
        .first()
        .copied()
        .or_else(|| ir.fields.first().map(|f| f.name.as_str()));
    out.push_str("\n");
    out.push_str("    def __repr__(self) -> str:\n");
    match repr_key {
        Some(key) => out.push_str(&format!(
            "        return f\"<{}({{self.{}}})>\"\n",
            ir.class_name, key
        )),
        None => out.push_str(&format!("        return \"<{}>\"\n", ir.class_name)),
    }

    out
}

/// Render the shared base module, once per output package.
pub fn render_base() -> String {
    "\
\"\"\"Shared declarative base for generated models.\"\"\"
from sqlalchemy import Column, Integer, DateTime
from sqlalchemy.ext.declarative import declarative_base
from sqlalchemy.sql import func

Base = declarative_base()


class BaseModel(Base):
    \"\"\"Abstract base with the shared id/created/updated convention.\"\"\"
    __abstract__ = True

    id = Column(Integer, primary_key=True, autoincrement=True)
    created_at = Column(DateTime(timezone=True), server_default=func.now())
    updated_at = Column(DateTime(timezone=True), onupdate=func.now())

    def to_dict(self):
        return {c.name: getattr(self, c.name) for c in self.__table__.columns}
"
    .to_string()
}

/// Render the package index re-exporting the base and every generated type.
///
/// `entries` pairs each module (file stem) with its class name, in
/// generation order.
pub fn render_index(entries: &[(String, String)]) -> String {
    let mut out = String::new();

    out.push_str("from .base import Base, BaseModel\n");
    for (module, class_name) in entries {
        out.push_str(&format!("from .{} import {}\n", module, class_name));
    }

    out.push_str("\n__all__ = [\n");
    out.push_str("    \"Base\",\n");
    out.push_str("    \"BaseModel\",\n");
    for (_, class_name) in entries {
        out.push_str(&format!("    \"{}\",\n", class_name));
    }
    out.push_str("]\n");

    out
}
