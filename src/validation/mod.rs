//! Validation functionality
//!
//! Structural conformance checks over canonical metadata documents,
//! including referential soundness of relationships.

pub mod metadata;

pub use metadata::{MetadataValidator, ValidationIssue, ValidationReport};
