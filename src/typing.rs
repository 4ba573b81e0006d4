//! Type mapping tables
//!
//! Translates source-specific field-type tokens into canonical types. Two
//! token families exist: form tokens (nested form exports and flat CSV
//! exports) and SQL physical tokens (DDL and XML structure dumps). Each
//! family maps in two modes: metadata (semantic typing, a
//! [`ColumnDescriptor`]) and schema (raw storage typing, a plain string).
//!
//! Unknown tokens never fail: they pass through verbatim so downstream
//! callers always get *some* output even for non-portable custom types.

use crate::models::ColumnDescriptor;

/// Map a form field-type token to its metadata-mode descriptor.
///
/// An absent token maps to `categorical`; unrecognized tokens pass through
/// as the raw `sdtype`.
pub fn form_metadata_type(token: Option<&str>) -> ColumnDescriptor {
    let Some(token) = token else {
        return ColumnDescriptor::new("categorical");
    };
    match token {
        "textfield" | "text" | "text_multiline" | "textmultiline" | "list" => {
            ColumnDescriptor::id()
        }
        "integer" => ColumnDescriptor::numerical("Int64"),
        "decimal" => ColumnDescriptor::numerical("Float"),
        "date" => ColumnDescriptor::datetime("%Y-%m-%d"),
        "time" => ColumnDescriptor::datetime("%H:%M:%S"),
        "single" | "radio" | "checkbox" | "multiples" | "multiple" | "choice" | "calculated" => {
            ColumnDescriptor::new("categorical")
        }
        // `boolean` falls through: the raw token already is the canonical type
        other => ColumnDescriptor::new(other),
    }
}

/// Map a form field-type token to its schema-mode storage type.
///
/// An absent token maps to `str`; unrecognized tokens pass through.
pub fn form_schema_type(token: Option<&str>) -> String {
    let Some(token) = token else {
        return "str".to_string();
    };
    match token {
        "textfield" | "text" | "single" | "radio" | "text_multiline" | "list"
        | "textmultiline" | "multiples" | "multiple" | "choice" | "calculated" => "str",
        "integer" => "Int64",
        "decimal" => "Float",
        "date" | "checkbox" | "time" => "object",
        other => other,
    }
    .to_string()
}

/// Map a SQL physical type token to its metadata-mode descriptor.
///
/// The token is reduced to its bare keyword first, so `varchar(50)` and
/// `decimal(10,2) unsigned` map like `varchar` and `decimal`.
pub fn sql_metadata_type(token: &str) -> ColumnDescriptor {
    match sql_storage_type(token).as_str() {
        "Int8" | "Int16" | "Int32" | "Int64" => ColumnDescriptor::numerical("Int64"),
        "Float" => ColumnDescriptor::numerical("Float"),
        "str" => ColumnDescriptor::new("text"),
        "datetime" => ColumnDescriptor::datetime("%Y-%m-%d"),
        other => ColumnDescriptor::new(other),
    }
}

/// Map a SQL physical type token to its schema-mode storage type.
pub fn sql_storage_type(token: &str) -> String {
    match base_type_token(token).to_lowercase().as_str() {
        "varchar" | "char" | "text" | "longtext" | "mediumtext" | "longblob" | "mediumblob"
        | "binary" => "str".to_string(),
        "bigint" => "Int64".to_string(),
        "int" => "Int32".to_string(),
        "smallint" => "Int16".to_string(),
        "tinyint" => "Int8".to_string(),
        "double" | "decimal" | "float" => "Float".to_string(),
        "date" | "datetime" | "timestamp" => "datetime".to_string(),
        _ => base_type_token(token).to_string(),
    }
}

/// Bare type keyword: everything before the first parenthesized width and
/// before any trailing modifiers (`decimal(10,2) unsigned` -> `decimal`).
pub fn base_type_token(raw: &str) -> &str {
    let head = raw.split_whitespace().next().unwrap_or(raw);
    head.split('(').next().unwrap_or(head)
}
