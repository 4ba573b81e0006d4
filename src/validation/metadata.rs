//! Metadata document validation
//!
//! Checks an already-built (or externally supplied) canonical document
//! for structural conformance: tables present, every table has columns,
//! declared primary keys resolve, and every relationship references
//! existing tables and columns with the child foreign key tagged `id`.

use serde::{Deserialize, Serialize};

use crate::models::MetadataDocument;

/// One finding, with the entity it concerns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    /// Table (or `parent->child` pair for relationships) the issue concerns
    pub subject: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[must_use = "validation reports should be checked for errors and warnings"]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validator for canonical metadata documents.
#[derive(Default)]
pub struct MetadataValidator;

impl MetadataValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, document: &MetadataDocument) -> ValidationReport {
        let mut report = ValidationReport::default();

        if document.tables.is_empty() {
            report
                .errors
                .push(ValidationIssue::new("document", "no tables defined"));
        }

        for (name, table) in &document.tables {
            if table.columns.is_empty() {
                report
                    .errors
                    .push(ValidationIssue::new(name, "table has no columns"));
            }
            if table.primary_key.is_empty() {
                report
                    .warnings
                    .push(ValidationIssue::new(name, "no primary key defined"));
            } else if !table.columns.contains_key(&table.primary_key) {
                report.errors.push(ValidationIssue::new(
                    name,
                    format!(
                        "primary key '{}' is not a column of the table",
                        table.primary_key
                    ),
                ));
            }
        }

        for relationship in &document.relationships {
            let subject = format!(
                "{}->{}",
                relationship.parent_table_name, relationship.child_table_name
            );
            let Some(parent) = document.tables.get(&relationship.parent_table_name) else {
                report.errors.push(ValidationIssue::new(
                    &subject,
                    format!("parent table '{}' not found", relationship.parent_table_name),
                ));
                continue;
            };
            let Some(child) = document.tables.get(&relationship.child_table_name) else {
                report.errors.push(ValidationIssue::new(
                    &subject,
                    format!("child table '{}' not found", relationship.child_table_name),
                ));
                continue;
            };
            if relationship.parent_primary_key != parent.primary_key {
                report.errors.push(ValidationIssue::new(
                    &subject,
                    format!(
                        "parent_primary_key '{}' does not match the parent's primary key '{}'",
                        relationship.parent_primary_key, parent.primary_key
                    ),
                ));
            }
            match child.columns.get(&relationship.child_foreign_key) {
                None => {
                    report.errors.push(ValidationIssue::new(
                        &subject,
                        format!(
                            "child foreign key '{}' is not a column of the child table",
                            relationship.child_foreign_key
                        ),
                    ));
                }
                Some(column) if column.sdtype != "id" => {
                    report.warnings.push(ValidationIssue::new(
                        &subject,
                        format!(
                            "child foreign key '{}' is typed '{}', expected 'id'",
                            relationship.child_foreign_key, column.sdtype
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        report
    }
}
