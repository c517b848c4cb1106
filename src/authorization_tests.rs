// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `authorization.rs`

#[cfg(test)]
mod tests {
    use super::super::check_zone;
    use crate::dns_errors::{AuthorizationError, ProviderError};
    use crate::provider::{DnsProvider, MemoryProvider, ProviderLimits, ZoneDetails};
    use crate::records::{ActualRecordSet, EditOp};

    const FULL: &[&str] = &["#zone:read", "#zone:edit"];

    #[tokio::test]
    async fn test_resolves_zone_from_parent_domain() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", FULL);

        let zone = check_zone("nodes.example.org", None, &provider).await.unwrap();
        assert_eq!(zone.id, "z1");
        assert_eq!(zone.name, "example.org");
    }

    #[tokio::test]
    async fn test_prefers_most_specific_zone() {
        let provider = MemoryProvider::new()
            .with_zone("parent", "example.org", FULL)
            .with_zone("child", "nodes.example.org", FULL);

        let zone = check_zone("all.nodes.example.org", None, &provider)
            .await
            .unwrap();
        assert_eq!(zone.id, "child");
    }

    #[tokio::test]
    async fn test_apex_name_is_accepted() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", FULL);
        assert!(check_zone("Example.ORG.", None, &provider).await.is_ok());
    }

    #[tokio::test]
    async fn test_configured_zone_id_skips_lookup() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", FULL);
        let zone = check_zone("nodes.example.org", Some("z1"), &provider)
            .await
            .unwrap();
        assert_eq!(zone.id, "z1");
    }

    #[tokio::test]
    async fn test_unknown_zone() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", FULL);
        let err = check_zone("nodes.example.net", None, &provider)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthorizationError::ZoneNotFound {
                name: "nodes.example.net".into()
            }
        );
    }

    #[tokio::test]
    async fn test_zone_mismatch() {
        let provider = MemoryProvider::new()
            .with_zone("z1", "example.org", FULL)
            .with_zone("z2", "example.net", FULL);

        let err = check_zone("nodes.example.org", Some("z2"), &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthorizationError::ZoneMismatch { .. }));
    }

    #[tokio::test]
    async fn test_suffix_without_label_boundary_is_mismatch() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", FULL);
        let err = check_zone("badexample.org", Some("z1"), &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthorizationError::ZoneMismatch { .. }));
    }

    #[tokio::test]
    async fn test_missing_edit_permission() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", &["#zone:read"]);
        let err = check_zone("nodes.example.org", None, &provider)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthorizationError::InsufficientPermission {
                zone_id: "z1".into(),
                missing: vec!["zone:edit".into()],
            }
        );
    }

    #[tokio::test]
    async fn test_missing_both_permissions() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", &["#dns_records:edit"]);
        match check_zone("example.org", None, &provider).await {
            Err(AuthorizationError::InsufficientPermission { missing, .. }) => {
                assert_eq!(missing, vec!["zone:read", "zone:edit"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permissions_without_hash_prefix() {
        let provider =
            MemoryProvider::new().with_zone("z1", "example.org", &["zone:edit", "zone:read"]);
        assert!(check_zone("example.org", None, &provider).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_names_rejected_before_provider_calls() {
        let provider = MemoryProvider::new().with_zone("z1", "example.org", FULL);
        for name in ["", "bad..example.org", "-x.example.org"] {
            let err = check_zone(name, None, &provider).await.unwrap_err();
            assert!(
                matches!(err, AuthorizationError::InvalidName { .. }),
                "{name:?} gave {err:?}"
            );
        }
    }

    /// Provider whose zone lookups always fail with an API error.
    struct BrokenLookup;

    #[async_trait::async_trait]
    impl DnsProvider for BrokenLookup {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn limits(&self) -> ProviderLimits {
            ProviderLimits {
                max_txt_len: 2048,
                max_ttl: None,
            }
        }

        async fn zone_id_by_name(&self, _name: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Api {
                operation: "zone lookup".into(),
                status: 403,
                message: "Authentication error (10000)".into(),
            })
        }

        async fn zone_details(&self, zone_id: &str) -> Result<ZoneDetails, ProviderError> {
            Err(ProviderError::NotFound {
                resource: format!("zone {zone_id}"),
            })
        }

        async fn list_records(
            &self,
            _zone_id: &str,
            _domain: &str,
        ) -> Result<ActualRecordSet, ProviderError> {
            Ok(ActualRecordSet::new())
        }

        async fn apply_edit(&self, _zone_id: &str, _op: &EditOp) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_lookup_errors_other_than_not_found_abort() {
        let err = check_zone("nodes.example.org", None, &BrokenLookup)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthorizationError::Provider(ProviderError::Api { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_configured_zone_id_surfaces_provider_error() {
        let provider = MemoryProvider::new();
        let err = check_zone("example.org", Some("nope"), &provider)
            .await
            .unwrap_err();
        assert_eq!(err.status_reason(), "NotFound");
    }
}
