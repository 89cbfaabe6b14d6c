//! Integration tests for the generation pipeline.
//!
//! These drive the orchestrator end-to-end against an in-memory schema
//! inspector, checking the spec-level behaviors: idempotent re-runs,
//! selective generation with dangling relations, composite keys, and
//! self-references.

use std::fs;
use std::path::Path;

use modelgen::codegen::{generate, GenerationRequest, TableStatus, Warning};
use modelgen::schema::{ColumnMetadata, ForeignKeyMetadata, SchemaInspector, TableMetadata};
use modelgen::GeneratorError;

/// Inspector backed by fixture metadata instead of a live catalog.
struct MockInspector {
    tables: Vec<TableMetadata>,
}

impl SchemaInspector for MockInspector {
    fn list_tables(&mut self) -> Result<Vec<String>, GeneratorError> {
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    fn describe(&mut self, tables: &[String]) -> Result<Vec<TableMetadata>, GeneratorError> {
        let missing: Vec<String> = tables
            .iter()
            .filter(|name| !self.tables.iter().any(|t| &t.name == *name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(GeneratorError::TablesNotFound(missing));
        }

        Ok(tables
            .iter()
            .filter_map(|name| self.tables.iter().find(|t| &t.name == name).cloned())
            .collect())
    }
}

fn column(name: &str, native_type: &str) -> ColumnMetadata {
    ColumnMetadata {
        name: name.to_string(),
        native_type: native_type.to_string(),
        length: None,
        precision: None,
        scale: None,
        nullable: true,
        is_primary_key: false,
        is_auto_increment: false,
        default_expr: None,
        comment: None,
    }
}

fn serial_pk() -> ColumnMetadata {
    let mut col = column("id", "integer");
    col.nullable = false;
    col.is_primary_key = true;
    col.is_auto_increment = true;
    col.default_expr = Some("nextval('seq'::regclass)".to_string());
    col
}

fn fk(source: &str, table: &str) -> ForeignKeyMetadata {
    ForeignKeyMetadata {
        source_column: source.to_string(),
        target_table: table.to_string(),
        target_column: "id".to_string(),
    }
}

/// users, posts (author_id -> users), comments (post_id -> posts), and a
/// self-referencing categories table.
fn blog_schema() -> Vec<TableMetadata> {
    let mut name = column("name", "character varying");
    name.length = Some(32);
    name.nullable = false;

    let mut created_at = column("created_at", "timestamp with time zone");
    created_at.nullable = false;
    created_at.default_expr = Some("now()".to_string());

    let mut author_id = column("author_id", "integer");
    author_id.nullable = false;

    let mut title = column("title", "character varying");
    title.length = Some(200);
    title.nullable = false;

    let mut post_id = column("post_id", "integer");
    post_id.nullable = false;

    vec![
        TableMetadata {
            name: "users".to_string(),
            columns: vec![serial_pk(), name, created_at],
            foreign_keys: vec![],
        },
        TableMetadata {
            name: "posts".to_string(),
            columns: vec![serial_pk(), author_id, title],
            foreign_keys: vec![fk("author_id", "users")],
        },
        TableMetadata {
            name: "comments".to_string(),
            columns: vec![serial_pk(), post_id, column("body", "text")],
            foreign_keys: vec![fk("post_id", "posts")],
        },
        TableMetadata {
            name: "categories".to_string(),
            columns: vec![serial_pk(), column("parent_id", "integer")],
            foreign_keys: vec![fk("parent_id", "categories")],
        },
    ]
}

fn request(dir: &Path, tables: Option<Vec<&str>>) -> GenerationRequest {
    GenerationRequest {
        tables: tables.map(|t| t.iter().map(|s| s.to_string()).collect()),
        output_dir: dir.to_path_buf(),
        generated_at: Some("2026-01-01 00:00:00".to_string()),
    }
}

fn read(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).unwrap_or_else(|e| panic!("missing {}: {}", file, e))
}

#[test]
fn test_full_generation_writes_package() {
    let dir = tempfile::tempdir().unwrap();
    let inspector = MockInspector {
        tables: blog_schema(),
    };

    let report = generate(inspector, &request(dir.path(), None)).unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.tables.len(), 4);

    for file in ["__init__.py", "base.py", "users.py", "posts.py", "comments.py", "categories.py"] {
        assert!(dir.path().join(file).exists(), "expected {}", file);
    }

    let index = read(dir.path(), "__init__.py");
    assert!(index.contains("from .base import Base, BaseModel"));
    for class_name in ["Users", "Posts", "Comments", "Categories"] {
        assert!(index.contains(class_name), "index missing {}", class_name);
    }

    let posts = read(dir.path(), "posts.py");
    assert!(posts.contains("__tablename__ = \"posts\""));
    assert!(posts.contains("title = Column(String(200), nullable=False)"));
    assert!(posts.contains(
        "author = relationship(\"Users\", foreign_keys=[author_id], back_populates=\"posts\")"
    ));

    // Mirrored collection on the one side, with delete-orphan cascade since
    // the foreign key is NOT NULL.
    let users = read(dir.path(), "users.py");
    assert!(users.contains("posts = relationship(\"Posts\""));
    assert!(users.contains("cascade=\"all, delete-orphan\""));
    assert!(users.contains("server_default=func.now()"));
}

#[test]
fn test_selective_generation_reports_dangling_relation() {
    let dir = tempfile::tempdir().unwrap();
    let inspector = MockInspector {
        tables: blog_schema(),
    };

    let report = generate(inspector, &request(dir.path(), Some(vec!["comments"]))).unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.tables.len(), 1);
    assert_eq!(
        report.tables[0].warnings,
        vec![Warning::DanglingRelation {
            source_column: "post_id".to_string(),
            target_table: "posts".to_string(),
        }]
    );

    // Only the requested table is written, plus the shared package files.
    assert!(dir.path().join("comments.py").exists());
    assert!(!dir.path().join("users.py").exists());
    assert!(!dir.path().join("posts.py").exists());

    // The dangling relation field is omitted from the rendered module.
    let comments = read(dir.path(), "comments.py");
    assert!(!comments.contains("= relationship("));

    let index = read(dir.path(), "__init__.py");
    assert!(index.contains("Comments"));
    assert!(!index.contains("Posts"));
}

#[test]
fn test_generation_is_idempotent() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();

    let first = generate(
        MockInspector {
            tables: blog_schema(),
        },
        &request(first_dir.path(), None),
    )
    .unwrap();
    let second = generate(
        MockInspector {
            tables: blog_schema(),
        },
        &request(second_dir.path(), None),
    )
    .unwrap();

    assert_eq!(first.tables.len(), second.tables.len());

    for file in ["__init__.py", "base.py", "users.py", "posts.py", "comments.py", "categories.py"] {
        assert_eq!(
            read(first_dir.path(), file),
            read(second_dir.path(), file),
            "{} differs between runs",
            file
        );
    }
}

#[test]
fn test_rerun_into_same_directory_is_stable() {
    let dir = tempfile::tempdir().unwrap();

    generate(
        MockInspector {
            tables: blog_schema(),
        },
        &request(dir.path(), None),
    )
    .unwrap();
    let first = read(dir.path(), "users.py");

    generate(
        MockInspector {
            tables: blog_schema(),
        },
        &request(dir.path(), None),
    )
    .unwrap();
    let second = read(dir.path(), "users.py");

    assert_eq!(first, second);
}

#[test]
fn test_missing_tables_all_reported() {
    let dir = tempfile::tempdir().unwrap();
    let inspector = MockInspector {
        tables: blog_schema(),
    };

    let err = generate(
        inspector,
        &request(dir.path(), Some(vec!["comments", "nope", "gone"])),
    )
    .unwrap_err();

    match err {
        GeneratorError::TablesNotFound(missing) => {
            assert_eq!(missing, vec!["nope".to_string(), "gone".to_string()]);
        }
        other => panic!("expected TablesNotFound, got {:?}", other),
    }

    assert!(!dir.path().join("comments.py").exists());
}

#[test]
fn test_name_collision_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let inspector = MockInspector {
        tables: vec![
            TableMetadata {
                name: "user_data".to_string(),
                columns: vec![serial_pk()],
                foreign_keys: vec![],
            },
            TableMetadata {
                name: "user__data".to_string(),
                columns: vec![serial_pk()],
                foreign_keys: vec![],
            },
        ],
    };

    let err = generate(inspector, &request(dir.path(), None)).unwrap_err();
    assert!(matches!(err, GeneratorError::NameCollision { .. }));

    let leftover: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftover.is_empty(), "no files may be written on collision");
}

#[test]
fn test_composite_primary_key_rendered_fully() {
    let dir = tempfile::tempdir().unwrap();

    let mut order_id = column("order_id", "integer");
    order_id.nullable = false;
    order_id.is_primary_key = true;
    let mut line_no = column("line_no", "integer");
    line_no.nullable = false;
    line_no.is_primary_key = true;

    let inspector = MockInspector {
        tables: vec![TableMetadata {
            name: "order_items".to_string(),
            columns: vec![order_id, line_no, column("quantity", "integer")],
            foreign_keys: vec![],
        }],
    };

    let report = generate(inspector, &request(dir.path(), None)).unwrap();
    assert!(!report.has_failures());

    let source = read(dir.path(), "order_items.py");
    assert!(source.contains("order_id = Column(Integer, primary_key=True)"));
    assert!(source.contains("line_no = Column(Integer, primary_key=True)"));
    assert!(!source.contains("quantity = Column(Integer, primary_key=True)"));
}

#[test]
fn test_self_reference_renders_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let inspector = MockInspector {
        tables: blog_schema(),
    };

    generate(inspector, &request(dir.path(), None)).unwrap();

    let source = read(dir.path(), "categories.py");
    assert!(source.contains("parent = relationship(\"Categories\""));
    assert!(source.contains("remote_side=[id]"));
    assert!(source.contains("categories = relationship(\"Categories\""));
    // The reference field is distinct from the primary identifier.
    assert!(source.contains("id = Column(Integer, primary_key=True, autoincrement=True)"));
}

#[test]
fn test_unmapped_type_degrades_and_warns() {
    let dir = tempfile::tempdir().unwrap();
    let inspector = MockInspector {
        tables: vec![TableMetadata {
            name: "accounts".to_string(),
            columns: vec![serial_pk(), column("balance", "money")],
            foreign_keys: vec![],
        }],
    };

    let report = generate(inspector, &request(dir.path(), None)).unwrap();

    assert!(!report.has_failures());
    assert_eq!(
        report.tables[0].warnings,
        vec![Warning::UnmappableType {
            column: "balance".to_string(),
            native_type: "money".to_string(),
        }]
    );

    let source = read(dir.path(), "accounts.py");
    assert!(source.contains("balance = Column(Text)"));
}

#[test]
fn test_report_records_written_status() {
    let dir = tempfile::tempdir().unwrap();
    let inspector = MockInspector {
        tables: blog_schema(),
    };

    let report = generate(inspector, &request(dir.path(), None)).unwrap();

    for table in &report.tables {
        assert_eq!(table.status, TableStatus::Written);
        assert!(table.file.is_some());
    }
}
