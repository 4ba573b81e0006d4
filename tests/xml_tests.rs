//! XML structure-dump import tests

use metadata_standardizer::import::XmlImporter;
use metadata_standardizer::ImportError;

const DUMP: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<DATABASE>
  <TABLES>
    <TABLE NAME="patients">
      <FIELDS>
        <FIELD NAME="id" TYPE="bigint(20)"/>
        <FIELD NAME="name" TYPE="varchar(100)"/>
        <FIELD NAME="weight" TYPE="double"/>
        <FIELD NAME="admitted" TYPE="timestamp"/>
        <FIELD NAME="photo" TYPE="mediumblob"/>
      </FIELDS>
    </TABLE>
    <TABLE NAME="empty_table">
      <FIELDS/>
    </TABLE>
  </TABLES>
</DATABASE>"#;

#[test]
fn physical_types_map_like_ddl_types() {
    let conversion = XmlImporter::new().metadata(DUMP).unwrap();
    let patients = &conversion.metadata.tables["patients"];
    assert_eq!(patients.columns["id"].sdtype, "numerical");
    assert_eq!(
        patients.columns["id"].computer_representation.as_deref(),
        Some("Int64")
    );
    assert_eq!(patients.columns["name"].sdtype, "text");
    assert_eq!(patients.columns["weight"].sdtype, "numerical");
    assert_eq!(patients.columns["admitted"].sdtype, "datetime");
    assert_eq!(patients.columns["photo"].sdtype, "text");
}

#[test]
fn no_keys_or_relationships_are_derived() {
    let conversion = XmlImporter::new().metadata(DUMP).unwrap();
    assert!(conversion.metadata.relationships.is_empty());
    assert!(conversion.dictionaries.is_empty());
    for (_, table) in &conversion.metadata.tables {
        assert!(table.primary_key.is_empty());
    }
}

#[test]
fn table_without_fields_still_appears() {
    let conversion = XmlImporter::new().metadata(DUMP).unwrap();
    assert!(conversion.metadata.tables["empty_table"].columns.is_empty());
}

#[test]
fn schema_projection_uses_storage_tokens() {
    let schema = XmlImporter::new().schema(DUMP).unwrap();
    assert_eq!(schema["patients"]["id"], "Int64");
    assert_eq!(schema["patients"]["name"], "str");
    assert_eq!(schema["patients"]["admitted"], "datetime");
}

#[test]
fn unparsable_xml_is_malformed() {
    let err = XmlImporter::new().metadata("<DATABASE><TABLES>").unwrap_err();
    assert!(matches!(err, ImportError::MalformedSource(_)));
}

#[test]
fn dump_file_converts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("structure.xml");
    std::fs::write(&path, DUMP).unwrap();
    let conversion = XmlImporter::new().metadata_file(&path).unwrap();
    assert!(conversion.metadata.tables.contains_key("patients"));
}
