//! Relationship derivation from foreign-key constraints.
//!
//! Every foreign key on table A referencing table B yields a `ManyToOne`
//! relation owned by A and a mirrored `OneToMany` owned by B. Relation field
//! names come from the FK column stem on the many side (`author_id` ->
//! `author`) and the owning table's name on the collection side; table names
//! are plural by convention so the collection name is used verbatim, with a
//! column-stem qualifier appended only when two relations on the same class
//! would collide (multiple edges to the same target).

use std::collections::{BTreeMap, BTreeSet};

use crate::codegen::naming;
use crate::schema::TableMetadata;

/// Direction of a derived relation, seen from its owning class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    ManyToOne,
    OneToMany,
}

/// One side of a derived association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Table whose generated class declares this field.
    pub owner_table: String,
    pub field_name: String,
    /// Table on the other end of the association.
    pub related_table: String,
    pub related_class: String,
    pub kind: RelationKind,
    /// Table carrying the foreign key (the "many" side), with its column.
    pub source_table: String,
    pub source_column: String,
    pub target_column: String,
    /// Field name of the mirrored relation on the related class.
    pub back_populates: String,
    /// Child rows cannot outlive the parent (FK column is NOT NULL); the
    /// collection side renders a delete-orphan cascade.
    pub cascade_delete: bool,
    /// The related table is outside the requested generation set; the
    /// relation is recorded but its field is not rendered.
    pub dangling: bool,
}

/// Reserve a field name on a class, qualifying on collision.
fn unique_name(base: &str, qualifier: &str, taken: &mut BTreeSet<String>) -> String {
    let mut candidate = base.to_string();
    if taken.contains(&candidate) {
        candidate = format!("{}_{}", base, qualifier);
    }
    let mut counter = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}{}", base, qualifier, counter);
        counter += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Derive both sides of every foreign-key association in `tables`.
///
/// `requested` is the selective-generation set: relations pointing at tables
/// outside it are flagged dangling, never dropped, so the orchestrator can
/// record them and the renderer can skip their fields. Self-referencing keys
/// are valid; both sides land on the same class with distinct field names.
pub fn resolve(tables: &[TableMetadata], requested: &[String]) -> Vec<Relationship> {
    // Field namespaces, one per class, seeded with the column names so a
    // relation can never shadow a mapped column.
    let mut taken: BTreeMap<String, BTreeSet<String>> = tables
        .iter()
        .map(|t| {
            (
                t.name.clone(),
                t.columns.iter().map(|c| c.name.clone()).collect(),
            )
        })
        .collect();

    let mut relations = Vec::new();

    for table in tables {
        for fk in &table.foreign_keys {
            let stem = naming::column_stem(&fk.source_column);
            let not_null = table
                .column(&fk.source_column)
                .map(|c| !c.nullable)
                .unwrap_or(false);

            let many_field = unique_name(
                &stem,
                "rel",
                taken.entry(table.name.clone()).or_default(),
            );
            let collection_field = unique_name(
                &table.name,
                &stem,
                taken.entry(fk.target_table.clone()).or_default(),
            );

            let many_dangling = !requested.contains(&fk.target_table);
            let collection_dangling = !requested.contains(&table.name);

            relations.push(Relationship {
                owner_table: table.name.clone(),
                field_name: many_field.clone(),
                related_table: fk.target_table.clone(),
                related_class: naming::type_name(&fk.target_table),
                kind: RelationKind::ManyToOne,
                source_table: table.name.clone(),
                source_column: fk.source_column.clone(),
                target_column: fk.target_column.clone(),
                back_populates: collection_field.clone(),
                cascade_delete: false,
                dangling: many_dangling,
            });

            relations.push(Relationship {
                owner_table: fk.target_table.clone(),
                field_name: collection_field,
                related_table: table.name.clone(),
                related_class: naming::type_name(&table.name),
                kind: RelationKind::OneToMany,
                source_table: table.name.clone(),
                source_column: fk.source_column.clone(),
                target_column: fk.target_column.clone(),
                back_populates: many_field,
                cascade_delete: not_null,
                dangling: collection_dangling,
            });
        }
    }

    relations
}
