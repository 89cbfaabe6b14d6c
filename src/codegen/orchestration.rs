//! High-level orchestration of the generation pipeline.
//!
//! Coordinates inspector -> mapper -> resolver -> renderer for a selected
//! table set, writes the output package, and assembles the generation
//! report. The database connection lives only inside the inspection phase;
//! it is released before any rendering or file writing starts.

use std::path::PathBuf;

use chrono::Local;
use tracing::{info, warn};

use crate::codegen::report::{GenerationReport, TableReport, TableStatus, Warning};
use crate::codegen::{fs_utils, ir, naming, relationships, render};
use crate::error::GeneratorError;
use crate::schema::{SchemaInspector, TableMetadata};

/// One generation run's parameters.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Explicit table selection; `None` generates every table.
    pub tables: Option<Vec<String>>,
    /// Target package directory, created if absent.
    pub output_dir: PathBuf,
    /// Pinned generation timestamp. Defaults to the current local time;
    /// fixing it makes re-runs byte-identical.
    pub generated_at: Option<String>,
}

struct Inspection {
    requested: Vec<String>,
    described: Vec<TableMetadata>,
}

/// Inspection phase, scoped so the connection is dropped on every exit path
/// (success and failure) before rendering begins.
fn inspect_phase<I: SchemaInspector>(
    mut inspector: I,
    request: &GenerationRequest,
) -> Result<Inspection, GeneratorError> {
    let all = inspector.list_tables()?;

    let requested = match &request.tables {
        Some(selection) => {
            let missing: Vec<String> = selection
                .iter()
                .filter(|t| !all.contains(t))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(GeneratorError::TablesNotFound(missing));
            }
            let mut deduped = Vec::new();
            for table in selection {
                if !deduped.contains(table) {
                    deduped.push(table.clone());
                }
            }
            deduped
        }
        None => all.clone(),
    };

    // The full set is always described so cross-table relations resolve
    // correctly even under selective generation.
    let described = inspector.describe(&all)?;

    Ok(Inspection { requested, described })
}

/// Run the whole pipeline and write the output package.
///
/// Takes the inspector by value: it is consumed by the inspection phase and
/// its connection released before any file is written. Name collisions abort
/// before writes; per-table I/O failures are recorded in the report and the
/// remaining tables are still attempted.
pub fn generate<I: SchemaInspector>(
    inspector: I,
    request: &GenerationRequest,
) -> Result<GenerationReport, GeneratorError> {
    let inspection = inspect_phase(inspector, request)?;

    naming::ensure_unique_type_names(&inspection.requested)?;

    let relations = relationships::resolve(&inspection.described, &inspection.requested);

    let generated_at = request
        .generated_at
        .clone()
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

    let requested_tables: Vec<&TableMetadata> = inspection
        .requested
        .iter()
        .filter_map(|name| inspection.described.iter().find(|t| &t.name == name))
        .collect();

    info!(
        tables = requested_tables.len(),
        output_dir = %request.output_dir.display(),
        "generating models"
    );

    let mut table_reports = Vec::new();
    let mut index_entries = Vec::new();

    for table in requested_tables {
        let (model_ir, mut warnings) = ir::build_model_ir(table, &relations);

        for relation in model_ir.relations.iter().filter(|r| r.dangling) {
            warnings.push(Warning::DanglingRelation {
                source_column: relation.source_column.clone(),
                target_table: relation.related_table.clone(),
            });
        }
        for warning in &warnings {
            warn!(table = %table.name, "{}", warning);
        }

        let source = render::render_model(&model_ir, &generated_at);
        let module = naming::module_name(&table.name);
        let path = request.output_dir.join(format!("{}.py", module));

        match fs_utils::write_source(&path, &source) {
            Ok(()) => {
                index_entries.push((module, model_ir.class_name.clone()));
                table_reports.push(TableReport {
                    table: table.name.clone(),
                    class_name: model_ir.class_name,
                    file: Some(path.display().to_string()),
                    status: TableStatus::Written,
                    warnings,
                });
            }
            Err(e) => {
                warn!(table = %table.name, "{}", e);
                table_reports.push(TableReport {
                    table: table.name.clone(),
                    class_name: model_ir.class_name,
                    file: None,
                    status: TableStatus::Failed {
                        message: e.to_string(),
                    },
                    warnings,
                });
            }
        }
    }

    // Package-level files: the shared base and the index enumerating every
    // type written by this run.
    fs_utils::write_source(request.output_dir.join("base.py"), &render::render_base())?;
    fs_utils::write_source(
        request.output_dir.join("__init__.py"),
        &render::render_index(&index_entries),
    )?;

    Ok(GenerationReport {
        output_dir: request.output_dir.display().to_string(),
        generated_at,
        tables: table_reports,
    })
}
