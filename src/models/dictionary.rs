//! Categorical value dictionaries
//!
//! Form-builder exports carry value dictionaries referenced by categorical
//! fields. [`DictionaryDef`] is the intermediate definition as extracted
//! from the source; [`DictionaryEntry`] is the resolved side-channel output
//! emitted alongside the metadata document.

use serde::{Deserialize, Serialize};

/// One allowed value inside a dictionary definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DictionaryValue {
    /// Category code
    pub code: String,
    /// Archived values are excluded from resolved entries
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
}

impl DictionaryValue {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            archived: false,
        }
    }
}

/// Dictionary definition as declared by the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DictionaryDef {
    /// Dictionary identifier referenced by categorical fields
    pub id: String,
    /// Allowed values, in declaration order
    pub values: Vec<DictionaryValue>,
}

impl DictionaryDef {
    /// Category codes with archived values excluded.
    pub fn active_codes(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|v| !v.archived)
            .map(|v| v.code.clone())
            .collect()
    }
}

/// Resolved categorical value index for one column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DictionaryEntry {
    /// Table owning the categorical column
    pub table_name: String,
    /// Column name
    pub col: String,
    /// Dictionary identifier the column referenced
    #[serde(rename = "type")]
    pub dictionary_type: String,
    /// Allowed category codes, archived codes excluded
    pub values: Vec<String>,
}
