//! Canonical multi-table metadata document
//!
//! The unified output shape shared by every importer: tables keyed by name,
//! each with ordered columns, plus the relationship list. Table and column
//! maps preserve insertion order so the emitted JSON mirrors the order in
//! which columns were encountered in the source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dialect tag written into every produced document.
pub const METADATA_SPEC_VERSION: &str = "MULTI_TABLE_V1";

/// Canonical metadata document: the unified output of all importers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataDocument {
    /// Schema dialect identifier (always [`METADATA_SPEC_VERSION`])
    #[serde(rename = "METADATA_SPEC_VERSION")]
    pub spec_version: String,
    /// Table descriptors keyed by table name
    pub tables: IndexMap<String, TableDescriptor>,
    /// Parent/child relationships between tables
    pub relationships: Vec<Relationship>,
}

impl MetadataDocument {
    /// Create an empty document carrying the current dialect tag.
    pub fn new() -> Self {
        Self {
            spec_version: METADATA_SPEC_VERSION.to_string(),
            tables: IndexMap::new(),
            relationships: Vec::new(),
        }
    }
}

impl Default for MetadataDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor for a single table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TableDescriptor {
    /// Column serving as unique row identifier, empty if undetermined
    pub primary_key: String,
    /// Column descriptors keyed by column name, in encounter order
    pub columns: IndexMap<String, ColumnDescriptor>,
    /// Reserved extension point, populated by downstream tooling
    pub column_relationships: Vec<serde_json::Value>,
}

/// Descriptor for a single column.
///
/// `sdtype` is carried as a string because unrecognized source type tokens
/// pass through verbatim rather than failing the conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    /// Semantic type: `id`, `numerical`, `categorical`, `datetime`, `text`,
    /// `boolean`, or a raw source token passed through
    pub sdtype: String,
    /// Storage width/precision tag (`Int64`, `Float`), numerical columns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer_representation: Option<String>,
    /// strftime-style pattern, datetime columns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime_format: Option<String>,
}

impl ColumnDescriptor {
    /// Plain column with only a semantic type.
    pub fn new(sdtype: impl Into<String>) -> Self {
        Self {
            sdtype: sdtype.into(),
            computer_representation: None,
            datetime_format: None,
        }
    }

    /// Numerical column with a storage representation.
    pub fn numerical(representation: &str) -> Self {
        Self {
            sdtype: "numerical".to_string(),
            computer_representation: Some(representation.to_string()),
            datetime_format: None,
        }
    }

    /// Datetime column with a format pattern.
    pub fn datetime(format: &str) -> Self {
        Self {
            sdtype: "datetime".to_string(),
            computer_representation: None,
            datetime_format: Some(format.to_string()),
        }
    }

    /// Identifier column (`sdtype = id`, no other attributes).
    pub fn id() -> Self {
        Self::new("id")
    }

    /// Re-tag this column as an identifier, dropping every attribute other
    /// than the semantic type. Used when a primary/foreign key constraint
    /// overrides the declared storage type.
    pub fn retag_as_id(&mut self) {
        self.sdtype = "id".to_string();
        self.computer_representation = None;
        self.datetime_format = None;
    }
}

/// Foreign-key relationship between two tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub parent_table_name: String,
    pub child_table_name: String,
    pub parent_primary_key: String,
    pub child_foreign_key: String,
}

/// Flattened schema projection: `{table: {column: storage_type}}`.
///
/// Discards primary-key and relationship structure; used when the consumer
/// needs raw storage types rather than semantic types.
pub type SchemaMap = IndexMap<String, IndexMap<String, String>>;
