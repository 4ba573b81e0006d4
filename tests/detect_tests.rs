//! Source detection tests

use metadata_standardizer::detect::{detect_source, Confidence, SourceKind};
use std::fs;

#[test]
fn sql_and_xml_files_are_high_confidence() {
    let dir = tempfile::tempdir().unwrap();
    let sql = dir.path().join("dump.sql");
    fs::write(&sql, "CREATE TABLE `t` (`id` int) ENGINE=InnoDB;").unwrap();
    let xml = dir.path().join("structure.xml");
    fs::write(&xml, "<TABLES/>").unwrap();

    let detection = detect_source(&sql).unwrap().unwrap();
    assert_eq!(detection.kind, SourceKind::Sql);
    assert_eq!(detection.confidence, Confidence::High);

    let detection = detect_source(&xml).unwrap().unwrap();
    assert_eq!(detection.kind, SourceKind::Xml);
    assert_eq!(detection.confidence, Confidence::High);
}

#[test]
fn parsable_json_object_is_a_form_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    fs::write(&path, r#"{"id": "root", "child": []}"#).unwrap();

    let detection = detect_source(&path).unwrap().unwrap();
    assert_eq!(detection.kind, SourceKind::FormExport);
    assert_eq!(detection.confidence, Confidence::High);
}

#[test]
fn unparsable_json_is_low_confidence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    fs::write(&path, "{broken").unwrap();

    let detection = detect_source(&path).unwrap().unwrap();
    assert_eq!(detection.kind, SourceKind::FormExport);
    assert_eq!(detection.confidence, Confidence::Low);
}

#[test]
fn folder_of_csv_files_is_a_csv_folder() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "x;y\n1;2\n").unwrap();
    fs::write(dir.path().join("b.csv"), "x;y\n3;4\n").unwrap();

    let detection = detect_source(dir.path()).unwrap().unwrap();
    assert_eq!(detection.kind, SourceKind::CsvFolder);
    assert_eq!(detection.confidence, Confidence::High);
}

#[test]
fn structure_subfolder_marks_a_flat_export() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("1_structure")).unwrap();

    let detection = detect_source(dir.path()).unwrap().unwrap();
    assert_eq!(detection.kind, SourceKind::FlatExport);
    assert_eq!(detection.confidence, Confidence::High);
}

#[test]
fn folder_with_subdirs_is_a_flat_export_candidate() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();

    let detection = detect_source(dir.path()).unwrap().unwrap();
    assert_eq!(detection.kind, SourceKind::FlatExport);
    assert_eq!(detection.confidence, Confidence::Medium);
}

#[test]
fn missing_path_is_an_error() {
    assert!(detect_source("/nonexistent/thing").is_err());
}

#[test]
fn unrecognized_file_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readme.txt");
    fs::write(&path, "hello").unwrap();
    assert!(detect_source(&path).unwrap().is_none());
}
