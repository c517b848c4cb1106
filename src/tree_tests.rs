// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `tree.rs`

#[cfg(test)]
mod tests {
    use super::super::{RecordSource, TxtRecordsFile};
    use crate::dns_errors::{RecordError, TreeError};
    use std::io::Write;

    const DOMAIN: &str = "nodes.example.org";

    #[test]
    fn test_relative_absolute_and_root_keys() {
        let file = TxtRecordsFile::from_json_str(
            r#"{
                "@": "enrtree-root:v1 e=AAA l=BBB seq=1 sig=x",
                "AAA": "enrtree-branch:CCC",
                "CCC.nodes.example.org.": "enr:-abc"
            }"#,
        )
        .unwrap();
        assert_eq!(file.len(), 3);

        let set = file.to_record_set(DOMAIN).unwrap();
        assert_eq!(set.domain(), DOMAIN);
        assert_eq!(
            set.get(DOMAIN),
            Some("enrtree-root:v1 e=AAA l=BBB seq=1 sig=x")
        );
        assert_eq!(set.get("aaa.nodes.example.org"), Some("enrtree-branch:CCC"));
        assert_eq!(set.get("ccc.nodes.example.org"), Some("enr:-abc"));
    }

    #[test]
    fn test_empty_key_is_root() {
        let file = TxtRecordsFile::from_json_str(r#"{ "": "enrtree-root:v1 seq=2" }"#).unwrap();
        let set = file.to_record_set(DOMAIN).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get(DOMAIN).is_some());
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let file =
            TxtRecordsFile::from_json_str(r#"{ "AAA": "enrtree-branch:" }"#).unwrap();
        assert!(matches!(
            file.to_record_set(DOMAIN),
            Err(TreeError::MissingRoot { .. })
        ));
    }

    #[test]
    fn test_root_without_prefix_is_rejected() {
        let file = TxtRecordsFile::from_json_str(r#"{ "@": "v=spf1 -all" }"#).unwrap();
        assert!(matches!(
            file.to_record_set(DOMAIN),
            Err(TreeError::MissingRoot { .. })
        ));
    }

    #[test]
    fn test_alias_collision_is_duplicate() {
        let file = TxtRecordsFile::from_json_str(
            r#"{ "@": "enrtree-root:v1", "nodes.example.org": "enrtree-root:v2" }"#,
        )
        .unwrap();
        assert!(matches!(
            file.to_record_set(DOMAIN),
            Err(TreeError::Record(RecordError::DuplicateName { .. }))
        ));
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        assert!(matches!(
            TxtRecordsFile::from_json_str(r#"{ "@": 1 }"#),
            Err(TreeError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "@": "enrtree-root:v1 seq=7" }}"#).unwrap();

        let loaded = TxtRecordsFile::load(file.path()).unwrap();
        let set = loaded.to_record_set("Nodes.Example.org.").unwrap();
        assert_eq!(set.get(DOMAIN), Some("enrtree-root:v1 seq=7"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TxtRecordsFile::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TreeError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
