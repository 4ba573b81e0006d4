//! Metadata Standardizer - schema-to-metadata conversion engine
//!
//! Normalizes heterogeneous schema descriptions into one canonical
//! multi-table metadata representation:
//! - Nested form-builder JSON exports (recursive tree extraction)
//! - Flat CSV export folders with link/dictionary tables
//! - Raw SQL `CREATE TABLE` dumps
//! - XML database structure dumps
//!
//! Every source converges on the same [`models::MetadataDocument`]
//! (tables, columns with semantic types, primary keys, relationships)
//! plus resolved categorical value dictionaries, or on the lighter
//! storage-type schema projection.
//!
//! # Example
//!
//! ```rust
//! use metadata_standardizer::import::DdlImporter;
//!
//! let sql = "CREATE TABLE `t` (
//!   `id` int NOT NULL,
//!   `name` varchar(50),
//!   PRIMARY KEY (`id`)
//! ) ENGINE=InnoDB;";
//! let conversion = DdlImporter::new().metadata(sql).unwrap();
//! assert_eq!(conversion.metadata.tables["t"].primary_key, "id");
//! ```

pub mod convert;
pub mod detect;
pub mod import;
pub mod models;
pub mod typing;
pub mod validation;

// Re-export commonly used types
pub use detect::{Confidence, Detection, SourceKind};
pub use import::{
    Conversion, DdlImporter, Extraction, FieldDecl, FlatExportImporter, FormExportImporter,
    ImportError, RelationDecl, TableFragment, XmlImporter,
};
pub use models::{
    ColumnDescriptor, DictionaryDef, DictionaryEntry, DictionaryValue, MetadataDocument,
    Relationship, SchemaMap, TableDescriptor, METADATA_SPEC_VERSION,
};
pub use validation::{MetadataValidator, ValidationReport};
