//! Document validation tests

use metadata_standardizer::import::{DdlImporter, FormExportImporter};
use metadata_standardizer::models::{
    ColumnDescriptor, MetadataDocument, Relationship, TableDescriptor,
};
use metadata_standardizer::validation::MetadataValidator;

fn table(primary_key: &str, columns: &[(&str, ColumnDescriptor)]) -> TableDescriptor {
    let mut descriptor = TableDescriptor {
        primary_key: primary_key.to_string(),
        ..TableDescriptor::default()
    };
    for (name, column) in columns {
        descriptor.columns.insert((*name).to_string(), column.clone());
    }
    descriptor
}

#[test]
fn converted_ddl_documents_validate_cleanly() {
    let sql = r"
CREATE TABLE `users` (
  `id` int NOT NULL,
  `name` varchar(50),
  PRIMARY KEY (`id`)
) ENGINE=InnoDB;

CREATE TABLE `orders` (
  `id` int NOT NULL,
  `user_id` int NOT NULL,
  PRIMARY KEY (`id`),
  CONSTRAINT `fk` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)
) ENGINE=InnoDB;
";
    let conversion = DdlImporter::new().metadata(sql).unwrap();
    let report = MetadataValidator::new().validate(&conversion.metadata);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
    assert!(report.warnings.is_empty());
}

#[test]
fn converted_tree_documents_validate_cleanly() {
    let export = serde_json::json!({
        "id": "pages",
        "child": [{
            "attrs": {"type": "component", "subtype": "page",
                      "render-type": "form", "varset": "t"},
            "child": [{"attrs": {"type": "component", "name": "x",
                                 "render-type": "integer"}}]
        }]
    });
    let conversion = FormExportImporter::new().metadata(&export).unwrap();
    let report = MetadataValidator::new().validate(&conversion.metadata);
    assert!(report.is_valid());
}

#[test]
fn relationship_to_absent_table_is_an_error() {
    let mut doc = MetadataDocument::new();
    doc.tables
        .insert("a".to_string(), table("id", &[("id", ColumnDescriptor::id())]));
    doc.relationships.push(Relationship {
        parent_table_name: "a".to_string(),
        child_table_name: "ghost".to_string(),
        parent_primary_key: "id".to_string(),
        child_foreign_key: "a.id".to_string(),
    });
    let report = MetadataValidator::new().validate(&doc);
    assert!(!report.is_valid());
    assert!(report.errors[0].message.contains("ghost"));
}

#[test]
fn table_without_primary_key_is_a_warning() {
    let mut doc = MetadataDocument::new();
    doc.tables.insert(
        "t".to_string(),
        table("", &[("x", ColumnDescriptor::new("text"))]),
    );
    let report = MetadataValidator::new().validate(&doc);
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].subject, "t");
}

#[test]
fn mismatched_parent_primary_key_is_an_error() {
    let mut doc = MetadataDocument::new();
    doc.tables
        .insert("a".to_string(), table("id", &[("id", ColumnDescriptor::id())]));
    doc.tables.insert(
        "b".to_string(),
        table(
            "id",
            &[("id", ColumnDescriptor::id()), ("a.id", ColumnDescriptor::id())],
        ),
    );
    doc.relationships.push(Relationship {
        parent_table_name: "a".to_string(),
        child_table_name: "b".to_string(),
        parent_primary_key: "other".to_string(),
        child_foreign_key: "a.id".to_string(),
    });
    let report = MetadataValidator::new().validate(&doc);
    assert!(!report.is_valid());
}

#[test]
fn non_id_foreign_key_is_a_warning() {
    let mut doc = MetadataDocument::new();
    doc.tables
        .insert("a".to_string(), table("id", &[("id", ColumnDescriptor::id())]));
    doc.tables.insert(
        "b".to_string(),
        table(
            "id",
            &[
                ("id", ColumnDescriptor::id()),
                ("a.id", ColumnDescriptor::new("text")),
            ],
        ),
    );
    doc.relationships.push(Relationship {
        parent_table_name: "a".to_string(),
        child_table_name: "b".to_string(),
        parent_primary_key: "id".to_string(),
        child_foreign_key: "a.id".to_string(),
    });
    let report = MetadataValidator::new().validate(&doc);
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 1);
}
