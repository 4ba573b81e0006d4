//! Flat CSV export importer (flat source)
//!
//! The flat export variant describes each table in its own
//! semicolon-delimited structure CSV (one `P` row naming the table, `V`
//! rows declaring its fields), with a single cross-table link CSV
//! (`varset_1`/`varset_2` parent/child pairs) and a single value-dictionary
//! CSV (`dico_name`/`code` rows). The reconciler produces the same
//! intermediate collections as the tree extractor.
//!
//! Folder layout: `1_structure/*.csv`, `2_link/link.csv`, `4_dico/dico.csv`.

use std::collections::HashMap;
use std::path::Path;

use super::{Conversion, Extraction, FieldDecl, ImportError, RelationDecl, TableFragment};
use crate::convert::assembler;
use crate::models::{DictionaryDef, DictionaryValue, SchemaMap};

/// Identifier column convention of the flat export: parents and children
/// both carry `id_data`, and foreign keys are named `<parent>.id_data`.
pub const FLAT_ID_COLUMN: &str = "id_data";

const DELIMITER: u8 = b';';

/// Importer for flat CSV export folders.
#[derive(Default)]
pub struct FlatExportImporter;

impl FlatExportImporter {
    pub fn new() -> Self {
        Self
    }

    /// Convert an export folder to canonical metadata.
    pub fn metadata_dir(&self, folder: impl AsRef<Path>) -> Result<Conversion, ImportError> {
        let parts = read_export_folder(folder.as_ref())?;
        self.metadata_parts(&parts.structures, &parts.link, &parts.dico)
    }

    /// Convert already-read CSV contents to canonical metadata.
    ///
    /// `structures` holds one structure-CSV body per table; `link` and
    /// `dico` are the link and dictionary CSV bodies.
    pub fn metadata_parts(
        &self,
        structures: &[String],
        link: &str,
        dico: &str,
    ) -> Result<Conversion, ImportError> {
        let extraction = self.extract(structures, link, dico)?;
        let conversion = assembler::assemble_form(&extraction, FLAT_ID_COLUMN, false);
        tracing::info!(
            tables = conversion.metadata.tables.len(),
            relationships = conversion.metadata.relationships.len(),
            "converted flat export"
        );
        Ok(conversion)
    }

    /// Flattened storage-type projection of an export folder.
    pub fn schema_dir(&self, folder: impl AsRef<Path>) -> Result<SchemaMap, ImportError> {
        let parts = read_export_folder(folder.as_ref())?;
        let extraction = self.extract(&parts.structures, &parts.link, &parts.dico)?;
        Ok(assembler::form_schema(&extraction))
    }

    /// Reconcile the structure/link/dictionary CSVs into the shared
    /// intermediate shape.
    pub fn extract(
        &self,
        structures: &[String],
        link: &str,
        dico: &str,
    ) -> Result<Extraction, ImportError> {
        let dictionaries = parse_dico_csv(dico)?;
        let mut extraction = Extraction {
            dictionaries,
            ..Extraction::default()
        };
        for body in structures {
            extraction.tables.push(parse_structure_csv(body)?);
        }
        extraction.relations = parse_link_csv(link)?;
        Ok(extraction)
    }
}

fn reader_for(body: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(body.as_bytes())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, ImportError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| ImportError::MalformedSource(format!("missing required CSV column '{name}'")))
}

/// One structure CSV: the `P` row names the table, every `V` row declares
/// a field. `radio` fields reference a dictionary via the `dico` column.
fn parse_structure_csv(body: &str) -> Result<TableFragment, ImportError> {
    let mut reader = reader_for(body);
    let headers = reader.headers()?.clone();
    let type_idx = column_index(&headers, "type")?;
    let varset_idx = column_index(&headers, "varset")?;
    let name_idx = column_index(&headers, "field_name")?;
    let ftype_idx = column_index(&headers, "field_type")?;
    let dico_idx = headers.iter().position(|h| h.trim() == "dico");

    let mut table_name: Option<String> = None;
    let mut fields = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).map(str::trim).filter(|s| !s.is_empty());
        match cell(type_idx) {
            Some("P") => table_name = cell(varset_idx).map(str::to_string),
            Some("V") => {
                let Some(name) = cell(name_idx) else { continue };
                let field_type = cell(ftype_idx);
                let dico = match field_type {
                    Some("radio") => dico_idx.and_then(cell),
                    _ => None,
                };
                fields.push(FieldDecl {
                    name: name.to_string(),
                    field_type: field_type.map(str::to_string),
                    dico: dico.map(str::to_string),
                });
            }
            _ => {}
        }
    }

    let name = table_name.ok_or_else(|| {
        ImportError::MalformedSource("structure CSV has no 'P' row naming its table".to_string())
    })?;
    Ok(TableFragment { name, fields })
}

/// Link CSV: each row is one parent/child table pair.
fn parse_link_csv(body: &str) -> Result<Vec<RelationDecl>, ImportError> {
    let mut reader = reader_for(body);
    let headers = reader.headers()?.clone();
    let parent_idx = column_index(&headers, "varset_1")?;
    let child_idx = column_index(&headers, "varset_2")?;

    let mut relations = Vec::new();
    for record in reader.records() {
        let record = record?;
        let (Some(parent), Some(child)) = (record.get(parent_idx), record.get(child_idx)) else {
            continue;
        };
        if parent.trim().is_empty() || child.trim().is_empty() {
            continue;
        }
        relations.push(RelationDecl {
            parent: parent.trim().to_string(),
            child: child.trim().to_string(),
        });
    }
    Ok(relations)
}

/// Dictionary CSV: `dico_name`/`code` rows, grouped into one definition
/// per dictionary name in encounter order.
fn parse_dico_csv(body: &str) -> Result<Vec<DictionaryDef>, ImportError> {
    let mut reader = reader_for(body);
    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, "dico_name")?;
    let code_idx = column_index(&headers, "code")?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<DictionaryValue>> = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let (Some(name), Some(code)) = (record.get(name_idx), record.get(code_idx)) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if !grouped.contains_key(name) {
            order.push(name.to_string());
        }
        grouped
            .entry(name.to_string())
            .or_default()
            .push(DictionaryValue::new(code.trim()));
    }
    Ok(order
        .into_iter()
        .map(|id| {
            let values = grouped.remove(&id).unwrap_or_default();
            DictionaryDef { id, values }
        })
        .collect())
}

struct FolderParts {
    structures: Vec<String>,
    link: String,
    dico: String,
}

/// Read the fixed folder layout, surfacing missing pieces as
/// [`ImportError::SourceNotFound`].
fn read_export_folder(folder: &Path) -> Result<FolderParts, ImportError> {
    let structure_dir = folder.join("1_structure");
    if !structure_dir.is_dir() {
        return Err(ImportError::SourceNotFound {
            path: structure_dir,
        });
    }

    let mut csv_paths: Vec<_> = std::fs::read_dir(&structure_dir)
        .map_err(|source| ImportError::Io {
            path: structure_dir.clone(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|e| e == "csv").unwrap_or(false))
        .collect();
    csv_paths.sort();

    let mut structures = Vec::new();
    for path in csv_paths {
        structures.push(super::ddl::read_source_file(&path)?);
    }

    let link = super::ddl::read_source_file(&folder.join("2_link").join("link.csv"))?;
    let dico = super::ddl::read_source_file(&folder.join("4_dico").join("dico.csv"))?;
    Ok(FolderParts {
        structures,
        link,
        dico,
    })
}
