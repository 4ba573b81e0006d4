//! DDL import tests

use metadata_standardizer::import::DdlImporter;
use metadata_standardizer::ImportError;

const DUMP: &str = r"
CREATE TABLE `users` (
  `id` int(11) NOT NULL AUTO_INCREMENT,
  `name` varchar(50) DEFAULT NULL,
  `balance` decimal(10,2) DEFAULT NULL,
  `created` datetime DEFAULT NULL,
  PRIMARY KEY (`id`),
  UNIQUE KEY `uk_name` (`name`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8;

CREATE TABLE `orders` (
  `id` bigint(20) NOT NULL,
  `user_id` int(11) NOT NULL,
  `notes` longtext,
  PRIMARY KEY (`id`),
  KEY `idx_user` (`user_id`),
  CONSTRAINT `fk_orders_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)
) ENGINE=InnoDB;
";

mod metadata_mode {
    use super::*;

    #[test]
    fn primary_key_columns_are_id_without_representation() {
        let conversion = DdlImporter::new().metadata(DUMP).unwrap();
        let users = &conversion.metadata.tables["users"];
        assert_eq!(users.primary_key, "id");
        assert_eq!(users.columns["id"].sdtype, "id");
        assert!(users.columns["id"].computer_representation.is_none());
    }

    #[test]
    fn declared_types_map_to_semantic_types() {
        let conversion = DdlImporter::new().metadata(DUMP).unwrap();
        let users = &conversion.metadata.tables["users"];
        assert_eq!(users.columns["name"].sdtype, "text");
        assert_eq!(users.columns["balance"].sdtype, "numerical");
        assert_eq!(
            users.columns["balance"].computer_representation.as_deref(),
            Some("Float")
        );
        assert_eq!(users.columns["created"].sdtype, "datetime");
    }

    #[test]
    fn foreign_keys_become_relationships_with_both_ends_retagged() {
        let conversion = DdlImporter::new().metadata(DUMP).unwrap();
        let rels = &conversion.metadata.relationships;
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].parent_table_name, "users");
        assert_eq!(rels[0].child_table_name, "orders");
        assert_eq!(rels[0].parent_primary_key, "id");
        assert_eq!(rels[0].child_foreign_key, "user_id");

        let orders = &conversion.metadata.tables["orders"];
        assert_eq!(orders.columns["user_id"].sdtype, "id");
        assert!(orders.columns["user_id"].computer_representation.is_none());
    }

    #[test]
    fn single_table_round_trip_matches_canonical_shape() {
        let sql = r"
CREATE TABLE `T` (
  `id` int NOT NULL,
  `name` varchar(50) DEFAULT NULL,
  PRIMARY KEY (`id`)
) ENGINE=InnoDB;
";
        let conversion = DdlImporter::new().metadata(sql).unwrap();
        let json = serde_json::to_value(&conversion.metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "METADATA_SPEC_VERSION": "MULTI_TABLE_V1",
                "tables": {
                    "T": {
                        "primary_key": "id",
                        "columns": {
                            "id": {"sdtype": "id"},
                            "name": {"sdtype": "text"}
                        },
                        "column_relationships": []
                    }
                },
                "relationships": []
            })
        );
    }

    #[test]
    fn foreign_key_to_missing_table_is_dropped() {
        let sql = r"
CREATE TABLE `orders` (
  `id` int NOT NULL,
  `user_id` int NOT NULL,
  PRIMARY KEY (`id`),
  CONSTRAINT `fk` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)
) ENGINE=InnoDB;
";
        let conversion = DdlImporter::new().metadata(sql).unwrap();
        assert!(conversion.metadata.relationships.is_empty());
        // Partial success: the table itself still converts
        assert!(conversion.metadata.tables.contains_key("orders"));
    }

    #[test]
    fn unknown_type_token_passes_through() {
        let sql = r"
CREATE TABLE `shapes` (
  `id` int NOT NULL,
  `outline` geometry NOT NULL,
  PRIMARY KEY (`id`)
) ENGINE=InnoDB;
";
        let conversion = DdlImporter::new().metadata(sql).unwrap();
        assert_eq!(
            conversion.metadata.tables["shapes"].columns["outline"].sdtype,
            "geometry"
        );
    }

    #[test]
    fn text_without_create_table_is_malformed() {
        let err = DdlImporter::new().metadata("DROP TABLE `users`;").unwrap_err();
        assert!(matches!(err, ImportError::MalformedSource(_)));
    }
}

mod schema_mode {
    use super::*;

    #[test]
    fn schema_projection_keeps_storage_widths() {
        let schema = DdlImporter::new().schema(DUMP).unwrap();
        assert_eq!(schema["users"]["id"], "Int32");
        assert_eq!(schema["orders"]["id"], "Int64");
        assert_eq!(schema["users"]["name"], "str");
        assert_eq!(schema["users"]["balance"], "Float");
        assert_eq!(schema["users"]["created"], "datetime");
        assert_eq!(schema["orders"]["notes"], "str");
    }
}

mod file_loading {
    use super::*;
    use std::fs;

    #[test]
    fn dump_file_converts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.sql");
        fs::write(&path, DUMP).unwrap();
        let conversion = DdlImporter::new().metadata_file(&path).unwrap();
        assert_eq!(conversion.metadata.tables.len(), 2);
    }

    #[test]
    fn missing_dump_is_source_not_found() {
        let err = DdlImporter::new()
            .metadata_file("/nonexistent/dump.sql")
            .unwrap_err();
        assert!(matches!(err, ImportError::SourceNotFound { .. }));
    }
}
