//! SQL DDL importer
//!
//! Regex-driven scanner over mysqldump-style SQL text. Isolates each
//! ``CREATE TABLE `name` ( ... ) ENGINE`` block, separates column
//! declarations from table-level constraints, and captures `PRIMARY KEY`
//! and `FOREIGN KEY ... REFERENCES` constraints. Key columns are re-tagged
//! `id` during assembly, overriding the declared storage type.
//!
//! A preprocessing pass strips versioned view-definition comment blocks
//! (`/*!50001 CREATE TABLE ... ENGINE=...*/;`) that would otherwise be
//! mis-matched as tables.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Conversion, ImportError};
use crate::convert::assembler;
use crate::models::{Relationship, SchemaMap};

// Static regex patterns compiled once
static RE_VERSIONED_VIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)/\*!50001\s+CREATE TABLE .*?ENGINE=.*?\*/;").expect("Invalid regex")
});
static RE_CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)CREATE TABLE `(\w+)` \((.*?)\) ENGINE").expect("Invalid regex")
});
static RE_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*`(\w+)`\s+([^\n,]+),?").expect("Invalid regex"));
static RE_FOREIGN_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)FOREIGN KEY\s*\(`(\w+)`\)\s+REFERENCES\s+`(\w+)`\s+\(`(\w+)`\)")
        .expect("Invalid regex")
});
static RE_BACKTICKED: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(\w+)`").expect("Invalid regex"));

const CONSTRAINT_KEYWORDS: [&str; 4] = ["PRIMARY KEY", "UNIQUE KEY", "KEY", "CONSTRAINT"];

/// One parsed `CREATE TABLE` block: columns with their raw type tokens,
/// plus the primary-key column when a constraint named one.
#[derive(Debug, Clone)]
pub struct DdlTable {
    pub name: String,
    /// `(column_name, raw_type_token)` in declaration order
    pub columns: Vec<(String, String)>,
    pub primary_key: Option<String>,
}

/// Intermediate shape produced by the DDL scanner, consumed by the
/// assembler. Unlike the tree/flat sources, keys come from explicit
/// constraints rather than synthesized identifier columns.
#[derive(Debug, Clone, Default)]
pub struct DdlExtraction {
    pub tables: Vec<DdlTable>,
    /// Relationship candidates captured from `FOREIGN KEY` constraints
    pub foreign_keys: Vec<Relationship>,
}

/// Importer for raw SQL `CREATE TABLE` dumps.
#[derive(Default)]
pub struct DdlImporter;

impl DdlImporter {
    pub fn new() -> Self {
        Self
    }

    /// Convert DDL text to canonical metadata.
    pub fn metadata(&self, sql: &str) -> Result<Conversion, ImportError> {
        let extraction = self.extract(sql)?;
        let metadata = assembler::assemble_ddl(&extraction);
        tracing::info!(
            tables = metadata.tables.len(),
            relationships = metadata.relationships.len(),
            "converted DDL dump"
        );
        Ok(Conversion {
            metadata,
            dictionaries: Vec::new(),
        })
    }

    /// Convert a DDL file to canonical metadata.
    pub fn metadata_file(&self, path: impl AsRef<Path>) -> Result<Conversion, ImportError> {
        self.metadata(&read_source_file(path.as_ref())?)
    }

    /// Flattened storage-type projection of DDL text.
    pub fn schema(&self, sql: &str) -> Result<SchemaMap, ImportError> {
        let extraction = self.extract(sql)?;
        Ok(assembler::ddl_schema(&extraction))
    }

    /// Scan the DDL text into the intermediate shape.
    ///
    /// DDL with no matching `CREATE TABLE` block is malformed: the caller
    /// handed over something that is not a table dump.
    pub fn extract(&self, sql: &str) -> Result<DdlExtraction, ImportError> {
        let sql = RE_VERSIONED_VIEW.replace_all(sql, "");
        let mut extraction = DdlExtraction::default();

        for block in RE_CREATE_TABLE.captures_iter(&sql) {
            let table_name = block[1].to_string();
            let body = &block[2];
            let mut table = DdlTable {
                name: table_name.clone(),
                columns: Vec::new(),
                primary_key: None,
            };

            for line in body.trim().lines() {
                let line = line.trim().trim_end_matches(',');
                if line.is_empty() || line.starts_with("--") {
                    continue;
                }
                if is_constraint(line) {
                    if let Some(fk) = RE_FOREIGN_KEY.captures(line) {
                        extraction.foreign_keys.push(Relationship {
                            parent_table_name: fk[2].to_string(),
                            child_table_name: table_name.clone(),
                            parent_primary_key: fk[3].to_string(),
                            child_foreign_key: fk[1].to_string(),
                        });
                    } else if line.to_uppercase().starts_with("PRIMARY KEY") {
                        if let Some(pk) = RE_BACKTICKED.captures(line) {
                            table.primary_key = Some(pk[1].to_string());
                        }
                    }
                    continue;
                }
                if let Some(col) = RE_COLUMN.captures(line) {
                    table.columns.push((col[1].to_string(), col[2].to_string()));
                }
            }
            extraction.tables.push(table);
        }

        if extraction.tables.is_empty() {
            return Err(ImportError::MalformedSource(
                "no CREATE TABLE blocks found in DDL".to_string(),
            ));
        }
        Ok(extraction)
    }
}

fn is_constraint(line: &str) -> bool {
    let upper = line.to_uppercase();
    CONSTRAINT_KEYWORDS.iter().any(|k| upper.starts_with(k))
}

pub(crate) fn read_source_file(path: &Path) -> Result<String, ImportError> {
    if !path.exists() {
        return Err(ImportError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
