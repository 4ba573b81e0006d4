//! Metadata assembler
//!
//! The unifying step applied to whichever extractor ran: applies the type
//! mapper, synthesizes identifier columns and primary keys (tree/flat
//! sources) or derives them from explicit constraints (DDL source),
//! resolves every relationship into parent/child column references, and
//! emits the canonical document. Dangling relationships are logged and
//! dropped, never fatal: every relationship in the output references
//! tables and columns that exist.
//!
//! The two output modes are separate pure projections over the shared
//! intermediate shape, not a mode flag threaded through extraction.

use indexmap::IndexMap;
use tracing::warn;

use crate::import::ddl::DdlExtraction;
use crate::import::{Conversion, Extraction};
use crate::models::{
    ColumnDescriptor, DictionaryDef, DictionaryEntry, MetadataDocument, Relationship, SchemaMap,
    TableDescriptor,
};
use crate::typing::{form_metadata_type, form_schema_type, sql_metadata_type, sql_storage_type};

/// Assemble a tree or flat extraction into the canonical document.
///
/// `id_column` is the synthetic identifier injected on every table
/// (`sys_id` for tree sources, `id_data` for flat sources); foreign keys
/// are named `<parent>.<id_column>`. When `calculated_as_text` is set,
/// `calculated` fields are typed `text` instead of `categorical`.
pub fn assemble_form(
    extraction: &Extraction,
    id_column: &str,
    calculated_as_text: bool,
) -> Conversion {
    let mut document = MetadataDocument::new();
    let mut dictionaries = Vec::new();

    for fragment in &extraction.tables {
        let mut descriptor = TableDescriptor::default();
        for field in &fragment.fields {
            if let Some(dico_id) = &field.dico {
                match find_dictionary(&extraction.dictionaries, dico_id) {
                    Some(def) => dictionaries.push(DictionaryEntry {
                        table_name: fragment.name.clone(),
                        col: field.name.clone(),
                        dictionary_type: dico_id.clone(),
                        values: def.active_codes(),
                    }),
                    None => {
                        warn!(
                            table = %fragment.name,
                            column = %field.name,
                            dico = %dico_id,
                            "field references an undeclared dictionary"
                        );
                    }
                }
            }
            let descriptor_for_field = match field.field_type.as_deref() {
                Some("calculated") if calculated_as_text => ColumnDescriptor::new("text"),
                token => form_metadata_type(token),
            };
            descriptor.columns.insert(field.name.clone(), descriptor_for_field);
        }
        // Synthetic identifier and primary key on every table
        descriptor
            .columns
            .insert(id_column.to_string(), ColumnDescriptor::id());
        descriptor.primary_key = id_column.to_string();
        document.tables.insert(fragment.name.clone(), descriptor);
    }

    for relation in &extraction.relations {
        if !document.tables.contains_key(&relation.parent)
            || !document.tables.contains_key(&relation.child)
        {
            warn!(
                parent = %relation.parent,
                child = %relation.child,
                "relationship references an unknown table, dropping"
            );
            continue;
        }
        let parent_primary_key = document.tables[&relation.parent].primary_key.clone();
        let foreign_key = format!("{}.{}", relation.parent, id_column);
        // The foreign-key column exists before the relationship is recorded
        if let Some(child) = document.tables.get_mut(&relation.child) {
            child
                .columns
                .insert(foreign_key.clone(), ColumnDescriptor::id());
        }
        document.relationships.push(Relationship {
            parent_table_name: relation.parent.clone(),
            child_table_name: relation.child.clone(),
            parent_primary_key,
            child_foreign_key: foreign_key,
        });
    }

    Conversion {
        metadata: document,
        dictionaries,
    }
}

/// Schema projection of a tree or flat extraction: raw storage types,
/// no keys or relationships, every merged table included.
pub fn form_schema(extraction: &Extraction) -> SchemaMap {
    extraction
        .tables
        .iter()
        .map(|fragment| {
            let columns = fragment
                .fields
                .iter()
                .map(|field| {
                    (
                        field.name.clone(),
                        form_schema_type(field.field_type.as_deref()),
                    )
                })
                .collect::<IndexMap<_, _>>();
            (fragment.name.clone(), columns)
        })
        .collect()
}

/// Assemble a DDL extraction into the canonical document.
///
/// Keys come from explicit constraints: primary-key columns are re-tagged
/// `id` and stripped of storage attributes, and both ends of every
/// captured foreign key are re-tagged `id` likewise.
pub fn assemble_ddl(extraction: &DdlExtraction) -> MetadataDocument {
    let mut document = MetadataDocument::new();

    for table in &extraction.tables {
        let mut descriptor = TableDescriptor::default();
        for (name, raw_type) in &table.columns {
            descriptor
                .columns
                .insert(name.clone(), sql_metadata_type(raw_type));
        }
        if let Some(pk) = &table.primary_key {
            match descriptor.columns.get_mut(pk) {
                Some(column) => {
                    column.retag_as_id();
                    descriptor.primary_key = pk.clone();
                }
                None => {
                    warn!(table = %table.name, column = %pk, "PRIMARY KEY names an unknown column");
                }
            }
        }
        document.tables.insert(table.name.clone(), descriptor);
    }

    for fk in &extraction.foreign_keys {
        // Resolve both ends before touching either: a half-resolvable key
        // must not leave one column re-tagged
        if !has_column(&document, &fk.parent_table_name, &fk.parent_primary_key)
            || !has_column(&document, &fk.child_table_name, &fk.child_foreign_key)
        {
            warn!(
                parent = %fk.parent_table_name,
                child = %fk.child_table_name,
                "foreign key references an unknown table or column, dropping"
            );
            continue;
        }
        retag_column(&mut document, &fk.parent_table_name, &fk.parent_primary_key);
        retag_column(&mut document, &fk.child_table_name, &fk.child_foreign_key);
        if let Some(parent) = document.tables.get_mut(&fk.parent_table_name) {
            parent.primary_key = fk.parent_primary_key.clone();
        }
        document.relationships.push(fk.clone());
    }

    document
}

/// Schema projection of a DDL extraction.
pub fn ddl_schema(extraction: &DdlExtraction) -> SchemaMap {
    extraction
        .tables
        .iter()
        .map(|table| {
            let columns = table
                .columns
                .iter()
                .map(|(name, raw_type)| (name.clone(), sql_storage_type(raw_type)))
                .collect::<IndexMap<_, _>>();
            (table.name.clone(), columns)
        })
        .collect()
}

fn find_dictionary<'a>(dictionaries: &'a [DictionaryDef], id: &str) -> Option<&'a DictionaryDef> {
    dictionaries.iter().find(|d| d.id == id)
}

fn has_column(document: &MetadataDocument, table: &str, column: &str) -> bool {
    document
        .tables
        .get(table)
        .is_some_and(|t| t.columns.contains_key(column))
}

fn retag_column(document: &mut MetadataDocument, table: &str, column: &str) {
    if let Some(col) = document
        .tables
        .get_mut(table)
        .and_then(|t| t.columns.get_mut(column))
    {
        col.retag_as_id();
    }
}
