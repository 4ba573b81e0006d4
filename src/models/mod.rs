//! Data models for the canonical metadata representation

pub mod dictionary;
pub mod metadata;

pub use dictionary::{DictionaryDef, DictionaryEntry, DictionaryValue};
pub use metadata::{
    ColumnDescriptor, MetadataDocument, Relationship, SchemaMap, TableDescriptor,
    METADATA_SPEC_VERSION,
};
