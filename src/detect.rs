//! Source-kind detection
//!
//! Guesses which source family a filesystem path holds, for callers that
//! do not know the input type up front. Detection is heuristic and never
//! authoritative: the result carries a confidence level.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The source families the converters accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Nested form-builder JSON export
    FormExport,
    /// Flat CSV export folder (`1_structure` / `2_link` / `4_dico`)
    FlatExport,
    /// Raw SQL dump
    Sql,
    /// XML structure dump
    Xml,
    /// Folder of plain CSV data files
    CsvFolder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Outcome of a detection pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub kind: SourceKind,
    pub confidence: Confidence,
    /// Human-readable evidence for the guess
    pub details: Vec<String>,
}

/// Inspect a path and guess its source family.
///
/// Returns `Ok(None)` when nothing recognizable is found; errors only on
/// a missing path.
pub fn detect_source(path: impl AsRef<Path>) -> Result<Option<Detection>> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("path does not exist: {}", path.display());
    }

    if path.is_file() {
        return detect_file(path);
    }
    detect_folder(path)
}

fn detect_file(path: &Path) -> Result<Option<Detection>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let detection = match extension.as_str() {
        "json" => {
            // Probe the content: a parsable JSON object is a strong signal
            let confidence = match std::fs::read_to_string(path)
                .ok()
                .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
            {
                Some(serde_json::Value::Object(_)) => Confidence::High,
                Some(_) => Confidence::Medium,
                None => Confidence::Low,
            };
            Detection {
                kind: SourceKind::FormExport,
                confidence,
                details: vec!["JSON file, probably a form-builder export".to_string()],
            }
        }
        "xml" => Detection {
            kind: SourceKind::Xml,
            confidence: Confidence::High,
            details: vec!["XML file detected".to_string()],
        },
        "sql" => Detection {
            kind: SourceKind::Sql,
            confidence: Confidence::High,
            details: vec!["SQL file detected".to_string()],
        },
        _ => return Ok(None),
    };
    Ok(Some(detection))
}

fn detect_folder(path: &Path) -> Result<Option<Detection>> {
    let entries: Vec<_> = std::fs::read_dir(path)
        .with_context(|| format!("cannot read folder {}", path.display()))?
        .filter_map(|e| e.ok())
        .collect();

    let csv_count = entries
        .iter()
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .count();
    let has_subdirs = entries.iter().any(|e| e.path().is_dir());

    if path.join("1_structure").is_dir() {
        return Ok(Some(Detection {
            kind: SourceKind::FlatExport,
            confidence: Confidence::High,
            details: vec!["folder contains a 1_structure subfolder".to_string()],
        }));
    }
    if csv_count > 0 && !has_subdirs {
        return Ok(Some(Detection {
            kind: SourceKind::CsvFolder,
            confidence: Confidence::High,
            details: vec![format!("folder contains {csv_count} CSV files")],
        }));
    }
    if has_subdirs {
        return Ok(Some(Detection {
            kind: SourceKind::FlatExport,
            confidence: Confidence::Medium,
            details: vec!["folder structure, probably a flat export".to_string()],
        }));
    }
    Ok(None)
}
