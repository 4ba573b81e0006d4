//! Import functionality
//!
//! Provides parsers for the four supported schema sources:
//! - Nested form-builder JSON exports (tree source)
//! - Flat CSV export folders with link/dictionary tables (flat source)
//! - Raw SQL `CREATE TABLE` dumps (DDL source)
//! - XML database structure dumps
//!
//! Every importer produces the same canonical output: a
//! [`MetadataDocument`](crate::models::MetadataDocument) plus resolved
//! dictionary entries, or the flattened schema projection.

pub mod ddl;
pub mod flat;
pub mod formtree;
pub mod xml;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::{DictionaryDef, DictionaryEntry, MetadataDocument};

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// A designated input file or folder does not exist
    #[error("source not found: {path}")]
    SourceNotFound { path: PathBuf },
    /// The source exists but cannot be parsed into the expected shape
    #[error("malformed source: {0}")]
    MalformedSource(String),
    /// A relationship names a table or column absent from the extracted set.
    ///
    /// Policy: conversions log and drop dangling relationships rather than
    /// abort; this variant surfaces only from callers that opt into strict
    /// resolution (document validation).
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::MalformedSource(format!("invalid JSON: {err}"))
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::MalformedSource(format!("invalid CSV: {err}"))
    }
}

impl From<quick_xml::Error> for ImportError {
    fn from(err: quick_xml::Error) -> Self {
        ImportError::MalformedSource(format!("invalid XML: {err}"))
    }
}

/// A field declaration as encountered in a source, before type mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDecl {
    /// Column name
    pub name: String,
    /// Raw source type token; `None` when the source declared no type
    pub field_type: Option<String>,
    /// Dictionary identifier for categorical fields referencing one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dico: Option<String>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, field_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.map(str::to_string),
            dico: None,
        }
    }

    pub fn with_dico(name: impl Into<String>, field_type: &str, dico: Option<&str>) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type.to_string()),
            dico: dico.map(str::to_string),
        }
    }
}

/// One extracted table: a logical name and its field declarations in
/// encounter order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableFragment {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

impl TableFragment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }
}

/// A declared parent/child table link, before resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationDecl {
    pub parent: String,
    pub child: String,
}

/// The shared intermediate shape produced by the tree and flat extractors,
/// consumed by the assembler's two projections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// One fragment per logical table, merged and in first-seen order
    pub tables: Vec<TableFragment>,
    /// Dictionary definitions declared by the source
    pub dictionaries: Vec<DictionaryDef>,
    /// Declared table links
    pub relations: Vec<RelationDecl>,
}

/// Result of a metadata-mode conversion: the canonical document plus the
/// resolved categorical value dictionaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "conversion results should be written out or inspected"]
pub struct Conversion {
    pub metadata: MetadataDocument,
    pub dictionaries: Vec<DictionaryEntry>,
}

// Re-export for convenience
pub use ddl::DdlImporter;
pub use flat::FlatExportImporter;
pub use formtree::FormExportImporter;
pub use xml::XmlImporter;
