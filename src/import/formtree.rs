//! Nested form-builder export importer (tree source)
//!
//! Walks the arbitrarily nested, weakly-typed export document of a
//! form-builder project. Nodes carry an `attrs` mapping and a `child`
//! list/single-node/absent; classification into a [`NodeKind`] is a pure
//! function over `attrs`, and the recursion is purely functional — each
//! call returns its contribution and the caller concatenates.
//!
//! Three sibling subtrees tagged `id=pages`, `id=dicos` and `id=relations`
//! feed the three intermediate collections: table fragments, dictionary
//! definitions and declared table links.

use serde_json::Value;
use tracing::{info, warn};

use super::{Conversion, Extraction, FieldDecl, ImportError, RelationDecl, TableFragment};
use crate::convert::assembler;
use crate::models::{DictionaryDef, DictionaryValue, SchemaMap};

/// Synthetic identifier column injected on every table of a tree source.
pub const TREE_ID_COLUMN: &str = "sys_id";

/// What a node contributes, decided purely from its `attrs`.
#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    /// A form page: names a table via `varset`, owns the fields beneath it
    TableBoundary { varset: String },
    /// A plain field typed by its render type
    Field {
        name: String,
        render_type: Option<String>,
    },
    /// A categorical field referencing a value dictionary
    DictionaryField {
        name: String,
        render_type: String,
        dico: Option<String>,
    },
    /// A boolean toggle field
    BooleanField { name: String },
    /// A computed/derived column named after its label
    ComputedField { label: String },
    /// Recognized but deliberately ignored (rendering artifacts, external
    /// data sources)
    Skip,
    /// Contributes nothing; traversal still descends into children
    Unknown,
}

fn attr<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get("attrs")?.get(key)?.as_str()
}

/// Child nodes, tolerating the `child` slot being a list, a single node,
/// or absent.
fn children(node: &Value) -> Vec<&Value> {
    match node.get("child") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    }
}

/// Classify a node by its tag attributes.
fn classify(node: &Value) -> NodeKind {
    let node_type = attr(node, "type");
    let subtype = attr(node, "subtype");
    let render_type = attr(node, "render-type");

    match (node_type, subtype) {
        (Some("component"), Some("page")) if render_type == Some("form") => {
            match attr(node, "varset") {
                Some(varset) => NodeKind::TableBoundary {
                    varset: varset.to_string(),
                },
                None => NodeKind::Unknown,
            }
        }
        (Some("component"), _) if render_type != Some("form") => {
            // A field needs a name; nodes without one contribute nothing
            let Some(name) = attr(node, "name") else {
                return NodeKind::Unknown;
            };
            match render_type {
                Some(rt @ ("radio" | "single" | "multiples")) => NodeKind::DictionaryField {
                    name: name.to_string(),
                    render_type: rt.to_string(),
                    dico: attr(node, "dico").map(str::to_string),
                },
                _ if subtype == Some("boolean") && attr(node, "labelPosition").is_some() => {
                    NodeKind::BooleanField {
                        name: name.to_string(),
                    }
                }
                _ if subtype == Some("tableColumn") => NodeKind::Skip,
                _ => NodeKind::Field {
                    name: name.to_string(),
                    render_type: render_type.map(str::to_string),
                },
            }
        }
        (Some("datasource"), Some("custom")) => {
            if attr(node, "mode") == Some("xml") {
                NodeKind::Skip
            } else {
                NodeKind::ComputedField {
                    label: attr(node, "label").unwrap_or_default().to_string(),
                }
            }
        }
        _ => NodeKind::Unknown,
    }
}

/// Derived column name for a computed field: lower-cased label with
/// accented latin characters transliterated to ASCII (ligatures expanded,
/// combining diacritics dropped) and everything outside `[a-z0-9_]`
/// replaced by `_`.
fn derived_column_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.to_lowercase().chars() {
        match c {
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ß' => out.push_str("ss"),
            // Combining diacritics contribute nothing
            '\u{0300}'..='\u{036f}' => {}
            other => {
                let folded = fold_accent(other);
                out.push(if folded.is_ascii_alphanumeric() || folded == '_' {
                    folded
                } else {
                    '_'
                });
            }
        }
    }
    out
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' | 'í' | 'ì' => 'i',
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Importer for nested form-builder JSON exports.
pub struct FormExportImporter {
    /// When set, `calculated` fields are typed `text` instead of
    /// `categorical`
    pub include_calculated: bool,
}

impl Default for FormExportImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormExportImporter {
    pub fn new() -> Self {
        Self {
            include_calculated: false,
        }
    }

    pub fn with_calculated(include_calculated: bool) -> Self {
        Self { include_calculated }
    }

    /// Convert an already-parsed export document to canonical metadata.
    pub fn metadata(&self, root: &Value) -> Result<Conversion, ImportError> {
        let mut extraction = self.extract(root);
        extraction.tables = drop_orphan_tables(extraction.tables, &extraction.relations);
        let conversion =
            assembler::assemble_form(&extraction, TREE_ID_COLUMN, self.include_calculated);
        info!(
            tables = conversion.metadata.tables.len(),
            relationships = conversion.metadata.relationships.len(),
            "converted form export"
        );
        Ok(conversion)
    }

    /// Convert export JSON text to canonical metadata.
    pub fn metadata_str(&self, json: &str) -> Result<Conversion, ImportError> {
        let root: Value = serde_json::from_str(json)?;
        self.metadata(&root)
    }

    /// Convert an export file to canonical metadata. A path missing the
    /// `.json` extension gets it appended.
    pub fn metadata_file(&self, path: impl AsRef<std::path::Path>) -> Result<Conversion, ImportError> {
        self.metadata_str(&read_export_file(path.as_ref())?)
    }

    /// Flattened storage-type projection of an already-parsed export.
    ///
    /// Covers every merged table; the orphaned-table policy applies only to
    /// the metadata projection.
    pub fn schema(&self, root: &Value) -> Result<SchemaMap, ImportError> {
        Ok(assembler::form_schema(&self.extract(root)))
    }

    /// Flattened storage-type projection of export JSON text.
    pub fn schema_str(&self, json: &str) -> Result<SchemaMap, ImportError> {
        let root: Value = serde_json::from_str(json)?;
        self.schema(&root)
    }

    /// Run the three collectors over the document and merge table
    /// fragments that share a logical name.
    pub fn extract(&self, root: &Value) -> Extraction {
        let mut extraction = collect_sections(root);
        extraction.tables = merge_fragments(extraction.tables);
        extraction
    }
}

/// Dispatch the `pages` / `dicos` / `relations` subtrees to their
/// collectors; everything else just recurses.
fn collect_sections(node: &Value) -> Extraction {
    match node {
        Value::Array(items) => items.iter().map(collect_sections).fold(
            Extraction::default(),
            |mut acc, part| {
                acc.tables.extend(part.tables);
                acc.dictionaries.extend(part.dictionaries);
                acc.relations.extend(part.relations);
                acc
            },
        ),
        Value::Object(_) => match node.get("id").and_then(Value::as_str) {
            Some("pages") => Extraction {
                tables: collect_pages(node),
                ..Extraction::default()
            },
            Some("dicos") => Extraction {
                dictionaries: children(node).iter().filter_map(|c| parse_dico(c)).collect(),
                ..Extraction::default()
            },
            Some("relations") => Extraction {
                relations: children(node).iter().filter_map(|c| parse_relation(c)).collect(),
                ..Extraction::default()
            },
            _ => children(node)
                .iter()
                .map(|c| collect_sections(c))
                .fold(Extraction::default(), |mut acc, part| {
                    acc.tables.extend(part.tables);
                    acc.dictionaries.extend(part.dictionaries);
                    acc.relations.extend(part.relations);
                    acc
                }),
        },
        _ => Extraction::default(),
    }
}

/// Find every table boundary beneath `node` and extract its fields.
fn collect_pages(node: &Value) -> Vec<TableFragment> {
    match node {
        Value::Array(items) => items.iter().flat_map(collect_pages).collect(),
        Value::Object(_) => {
            if let NodeKind::TableBoundary { varset } = classify(node) {
                let mut fragment = TableFragment::new(varset);
                let mut nested = Vec::new();
                for child in children(node) {
                    let (fields, pages) = collect_page_content(child);
                    fragment.fields.extend(fields);
                    nested.extend(pages);
                }
                let mut out = vec![fragment];
                out.extend(nested);
                out
            } else {
                children(node).into_iter().flat_map(collect_pages).collect()
            }
        }
        _ => Vec::new(),
    }
}

/// Collect field declarations inside a page subtree. A nested page starts
/// its own table instead of contributing fields to the enclosing one.
fn collect_page_content(node: &Value) -> (Vec<FieldDecl>, Vec<TableFragment>) {
    let mut fields = Vec::new();
    let mut pages = Vec::new();
    match node {
        Value::Array(items) => {
            for item in items {
                let (f, p) = collect_page_content(item);
                fields.extend(f);
                pages.extend(p);
            }
        }
        Value::Object(_) => {
            match classify(node) {
                NodeKind::TableBoundary { .. } => {
                    return (Vec::new(), collect_pages(node));
                }
                NodeKind::Field { name, render_type } => {
                    fields.push(FieldDecl::new(name, render_type.as_deref()));
                }
                NodeKind::DictionaryField {
                    name,
                    render_type,
                    dico,
                } => {
                    fields.push(FieldDecl::with_dico(name, &render_type, dico.as_deref()));
                }
                NodeKind::BooleanField { name } => {
                    fields.push(FieldDecl::new(name, Some("boolean")));
                }
                NodeKind::ComputedField { label } => {
                    fields.push(FieldDecl::new(derived_column_name(&label), Some("calculated")));
                }
                NodeKind::Skip | NodeKind::Unknown => {}
            }
            for child in children(node) {
                let (f, p) = collect_page_content(child);
                fields.extend(f);
                pages.extend(p);
            }
        }
        _ => {}
    }
    (fields, pages)
}

/// Parse one dictionary definition node:
/// `{id, attrs: {value: [{code, archived?}, ...]}}`.
fn parse_dico(node: &Value) -> Option<DictionaryDef> {
    let id = node.get("id")?.as_str()?.to_string();
    let values = node
        .get("attrs")
        .and_then(|a| a.get("value"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(DictionaryValue {
                        code: item.get("code")?.as_str()?.to_string(),
                        archived: item.get("archived").and_then(Value::as_bool).unwrap_or(false),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Some(DictionaryDef { id, values })
}

/// Parse one relation node: `attrs.varsets = [{name: parent}, {name: child}]`.
fn parse_relation(node: &Value) -> Option<RelationDecl> {
    let varsets = node.get("attrs")?.get("varsets")?.as_array()?;
    let parent = varsets.first()?.get("name")?.as_str()?;
    let child = varsets.get(1)?.get("name")?.as_str()?;
    Some(RelationDecl {
        parent: parent.to_string(),
        child: child.to_string(),
    })
}

/// Coalesce fragments sharing a logical table name into one fragment per
/// name, concatenating field lists in first-seen order. Same-named columns
/// within a merged table are not deduplicated.
pub fn merge_fragments(fragments: Vec<TableFragment>) -> Vec<TableFragment> {
    let mut merged: indexmap::IndexMap<String, TableFragment> = indexmap::IndexMap::new();
    for fragment in fragments {
        match merged.get_mut(&fragment.name) {
            Some(existing) => existing.fields.extend(fragment.fields),
            None => {
                merged.insert(fragment.name.clone(), fragment);
            }
        }
    }
    merged.into_values().collect()
}

/// Drop tables that never appear in the relation list, unless the document
/// holds a single table. The relationship graph is authoritative for which
/// tables matter in a multi-table document.
fn drop_orphan_tables(
    tables: Vec<TableFragment>,
    relations: &[RelationDecl],
) -> Vec<TableFragment> {
    if tables.len() <= 1 {
        return tables;
    }
    tables
        .into_iter()
        .filter(|fragment| {
            let linked = relations
                .iter()
                .any(|r| r.parent == fragment.name || r.child == fragment.name);
            if !linked {
                warn!(table = %fragment.name, "table is not explicitly linked, dropping");
            }
            linked
        })
        .collect()
}

fn read_export_file(path: &std::path::Path) -> Result<String, ImportError> {
    let path = if path.extension().map(|e| e == "json").unwrap_or(false) {
        path.to_path_buf()
    } else {
        // Tolerate a forgotten extension
        let mut s = path.as_os_str().to_os_string();
        s.push(".json");
        std::path::PathBuf::from(s)
    };
    if !path.exists() {
        return Err(ImportError::SourceNotFound { path });
    }
    std::fs::read_to_string(&path).map_err(|source| ImportError::Io { path, source })
}
