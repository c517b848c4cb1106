// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the provider interface helpers.

#[cfg(test)]
mod tests {
    use super::super::check_payload;
    use crate::dns_errors::ProviderError;
    use crate::records::EditOp;

    #[test]
    fn test_check_payload_accepts_content_at_limit() {
        let op = EditOp::Create {
            name: "a.example.org".into(),
            content: "x".repeat(16),
            ttl: 60,
        };
        assert!(check_payload(&op, 16).is_ok());
    }

    #[test]
    fn test_check_payload_rejects_oversize_content() {
        let op = EditOp::Update {
            name: "a.example.org".into(),
            record_id: "r1".into(),
            content: "x".repeat(17),
            ttl: 60,
        };
        assert_eq!(
            check_payload(&op, 16),
            Err(ProviderError::PayloadTooLarge {
                name: "a.example.org".into(),
                size: 17,
                limit: 16,
            })
        );
    }

    #[test]
    fn test_check_payload_ignores_deletes() {
        let op = EditOp::Delete {
            name: "a.example.org".into(),
            record_id: "r1".into(),
        };
        assert!(check_payload(&op, 0).is_ok());
    }

    #[test]
    fn test_check_payload_counts_characters_not_bytes() {
        // 16 two-byte characters: 32 bytes, still within a 16 character limit.
        let op = EditOp::Create {
            name: "a.example.org".into(),
            content: "é".repeat(16),
            ttl: 60,
        };
        assert!(check_payload(&op, 16).is_ok());

        let op = EditOp::Create {
            name: "a.example.org".into(),
            content: "é".repeat(17),
            ttl: 60,
        };
        assert!(matches!(
            check_payload(&op, 16),
            Err(ProviderError::PayloadTooLarge { size: 17, limit: 16, .. })
        ));
    }
}
