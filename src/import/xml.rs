//! XML structure-dump importer
//!
//! Parses database structure dumps of the form
//! `<TABLES><TABLE NAME="..."><FIELDS><FIELD NAME="..." TYPE="..."/>`.
//! Field types are SQL physical types and share the DDL type-mapping
//! table. Nothing in this source declares keys or relationships, so the
//! produced document has an empty relationship list and undetermined
//! primary keys.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Conversion, ImportError};
use crate::models::{MetadataDocument, SchemaMap, TableDescriptor};
use crate::typing::{sql_metadata_type, sql_storage_type};

/// Importer for XML database structure dumps.
#[derive(Default)]
pub struct XmlImporter;

impl XmlImporter {
    pub fn new() -> Self {
        Self
    }

    /// Convert XML structure-dump text to canonical metadata.
    pub fn metadata(&self, xml: &str) -> Result<Conversion, ImportError> {
        let tables = self.extract(xml)?;
        let mut document = MetadataDocument::new();
        for (table, fields) in tables {
            let mut descriptor = TableDescriptor::default();
            for (name, raw_type) in fields {
                descriptor.columns.insert(name, sql_metadata_type(&raw_type));
            }
            document.tables.insert(table, descriptor);
        }
        Ok(Conversion {
            metadata: document,
            dictionaries: Vec::new(),
        })
    }

    /// Convert an XML structure-dump file to canonical metadata.
    pub fn metadata_file(&self, path: impl AsRef<Path>) -> Result<Conversion, ImportError> {
        self.metadata(&super::ddl::read_source_file(path.as_ref())?)
    }

    /// Flattened storage-type projection of XML structure-dump text.
    pub fn schema(&self, xml: &str) -> Result<SchemaMap, ImportError> {
        let tables = self.extract(xml)?;
        Ok(tables
            .into_iter()
            .map(|(table, fields)| {
                let columns = fields
                    .into_iter()
                    .map(|(name, raw_type)| (name, sql_storage_type(&raw_type)))
                    .collect();
                (table, columns)
            })
            .collect())
    }

    /// Pull `(table, [(column, raw_type)])` pairs out of the dump.
    #[allow(clippy::type_complexity)]
    fn extract(&self, xml: &str) -> Result<Vec<(String, Vec<(String, String)>)>, ImportError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut tables: Vec<(String, Vec<(String, String)>)> = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"TABLE" => {
                        if let Some(name) = attribute(&e, b"NAME")? {
                            tables.push((name, Vec::new()));
                        }
                    }
                    b"FIELD" => {
                        let Some((_, fields)) = tables.last_mut() else {
                            continue;
                        };
                        if let Some(name) = attribute(&e, b"NAME")? {
                            // Untyped fields default to text
                            let raw_type = attribute(&e, b"TYPE")?
                                .unwrap_or_else(|| "text".to_string());
                            fields.push((name, raw_type.trim().to_string()));
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if tables.is_empty() {
            return Err(ImportError::MalformedSource(
                "no TABLE elements found in XML structure dump".to_string(),
            ));
        }
        Ok(tables)
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ImportError> {
    for attr in element.attributes() {
        let attr =
            attr.map_err(|e| ImportError::MalformedSource(format!("invalid XML attribute: {e}")))?;
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnDescriptor;

    const DUMP: &str = r#"<?xml version="1.0"?>
<DATABASE>
  <TABLES>
    <TABLE NAME="users">
      <FIELDS>
        <FIELD NAME="id" TYPE="bigint(20)"/>
        <FIELD NAME="name" TYPE="varchar(50)"/>
        <FIELD NAME="created" TYPE="datetime"/>
      </FIELDS>
    </TABLE>
  </TABLES>
</DATABASE>"#;

    #[test]
    fn fields_map_through_sql_types() {
        let conversion = XmlImporter::new().metadata(DUMP).unwrap();
        let table = &conversion.metadata.tables["users"];
        assert_eq!(table.columns["id"].sdtype, "numerical");
        assert_eq!(table.columns["name"].sdtype, "text");
        assert_eq!(table.columns["created"].sdtype, "datetime");
        assert!(conversion.metadata.relationships.is_empty());
        assert!(table.primary_key.is_empty());
    }

    #[test]
    fn dump_without_tables_is_malformed() {
        let err = XmlImporter::new().metadata("<DATABASE/>").unwrap_err();
        assert!(matches!(err, ImportError::MalformedSource(_)));
    }

    #[test]
    fn untyped_field_defaults_to_text() {
        let xml = r#"<TABLES><TABLE NAME="t"><FIELDS><FIELD NAME="x"/></FIELDS></TABLE></TABLES>"#;
        let conversion = XmlImporter::new().metadata(xml).unwrap();
        assert_eq!(
            conversion.metadata.tables["t"].columns["x"],
            ColumnDescriptor::new("text")
        );
    }
}
