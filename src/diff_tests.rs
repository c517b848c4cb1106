// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `diff.rs`

#[cfg(test)]
mod tests {
    use super::super::diff;
    use crate::records::{ActualRecord, ActualRecordSet, DesiredRecordSet, EditOp, TtlPolicy};
    use std::collections::BTreeMap;

    const ROOT: &str = "enrtree-root:v1 e=JWXYDBPXYWG6FX3GMDIBFA6CJ4 l=C7HRFPF3BLGF3YR4DY5KX3SMBE seq=3 sig=abc";
    const BRANCH: &str = "enrtree-branch:2XS2367YHAXJFGLZHVAWLQD4ZY,H4FHT4B454P6UXFD7JCYQ5PWDY";
    const LEAF: &str = "enr:-HW4QLAYqmrwllBEnzWWs7I5Ev2IAs7x_dZlbYdRdMUx5EyKHDXp7AV5CkuPGUPdvbv1_Ms1CPfhcGCvSElSosZmyoqAgmlkgnY0iXNlY3AyNTZrMaECriawHKWdDRk2xeZkrOXBQ0dfMFLHY4eENZwdufn1S1o";

    fn policy() -> TtlPolicy {
        TtlPolicy {
            root_ttl: 300,
            node_ttl: 86400,
        }
    }

    fn desired(records: &[(&str, &str)]) -> DesiredRecordSet {
        DesiredRecordSet::new("example.com", records.iter().copied()).unwrap()
    }

    fn actual(records: &[(&str, &str, &str)]) -> ActualRecordSet {
        records
            .iter()
            .map(|(name, content, id)| ActualRecord::new(*name, *content, 86400, *id))
            .collect()
    }

    /// Simulate a provider applying `ops` to a flat name -> content zone.
    fn apply(zone: &mut BTreeMap<String, String>, ops: &[EditOp]) {
        for op in ops {
            match op {
                EditOp::Create { name, content, .. } | EditOp::Update { name, content, .. } => {
                    zone.insert(name.clone(), content.clone());
                }
                EditOp::Delete { name, .. } => {
                    zone.remove(name);
                }
            }
        }
    }

    #[test]
    fn test_diff_of_identical_sets_is_empty() {
        let d = desired(&[("example.com", ROOT), ("c1.example.com", BRANCH), ("l1.example.com", LEAF)]);
        let a = actual(&[
            ("example.com", ROOT, "1"),
            ("c1.example.com", BRANCH, "2"),
            ("l1.example.com", LEAF, "3"),
        ]);

        let script = diff(&d, &a, &policy());
        assert!(script.is_empty(), "unexpected ops: {:?}", script.ops());
    }

    #[test]
    fn test_diff_ignores_ttl_drift_when_content_matches() {
        let d = desired(&[("example.com", ROOT)]);
        let a: ActualRecordSet = [ActualRecord::new("example.com", ROOT, 1, "1")]
            .into_iter()
            .collect();

        assert!(diff(&d, &a, &policy()).is_empty());
    }

    #[test]
    fn test_root_create_and_stale_delete_scenario() {
        let d = desired(&[("example.com", ROOT), ("C1.example.com", BRANCH)]);
        let a = actual(&[("c1.example.com", BRANCH, "r-c1"), ("stale.example.com", LEAF, "r-stale")]);

        let script = diff(&d, &a, &policy());

        assert_eq!(
            script.ops(),
            &[
                EditOp::Create {
                    name: "example.com".into(),
                    content: ROOT.into(),
                    ttl: 300,
                },
                EditOp::Delete {
                    name: "stale.example.com".into(),
                    record_id: "r-stale".into(),
                },
            ]
        );
    }

    #[test]
    fn test_changed_content_produces_update_with_record_id() {
        let d = desired(&[("example.com", "enrtree-root:v1 seq=4")]);
        let a = actual(&[("example.com", "enrtree-root:v1 seq=3", "r-root")]);

        let script = diff(&d, &a, &policy());
        assert_eq!(
            script.ops(),
            &[EditOp::Update {
                name: "example.com".into(),
                record_id: "r-root".into(),
                content: "enrtree-root:v1 seq=4".into(),
                ttl: 300,
            }]
        );
    }

    #[test]
    fn test_ttl_policy_applies_to_every_write() {
        let d = desired(&[
            ("example.com", ROOT),
            ("a.example.com", BRANCH),
            ("b.example.com", LEAF),
            ("c.example.com", "changed"),
        ]);
        let a = actual(&[("c.example.com", "old", "r-c")]);

        let script = diff(&d, &a, &policy());
        assert_eq!(script.len(), 4);
        for op in script.ops() {
            let expected = if op.name() == "example.com" { 300 } else { 86400 };
            assert_eq!(op.ttl(), Some(expected), "wrong ttl for {}", op.name());
        }
    }

    #[test]
    fn test_every_stale_managed_name_deleted_exactly_once() {
        let d = desired(&[("example.com", ROOT)]);
        let a = actual(&[
            ("example.com", ROOT, "r0"),
            ("s1.example.com", LEAF, "r1"),
            ("s2.example.com", LEAF, "r2"),
            ("deep.s3.example.com", LEAF, "r3"),
        ]);

        let script = diff(&d, &a, &policy());
        let mut deleted: Vec<&str> = script
            .ops()
            .iter()
            .filter(|op| matches!(op, EditOp::Delete { .. }))
            .map(EditOp::name)
            .collect();
        deleted.sort_unstable();

        assert_eq!(
            deleted,
            vec!["deep.s3.example.com", "s1.example.com", "s2.example.com"]
        );
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn test_records_outside_domain_are_untouched() {
        let d = DesiredRecordSet::new("nodes.example.com", [("nodes.example.com", ROOT)]).unwrap();
        let a = actual(&[
            ("example.com", "v=spf1 -all", "r-spf"),
            ("www.example.com", "site-verification", "r-www"),
            ("old.nodes.example.com", LEAF, "r-old"),
        ]);

        let script = diff(&d, &a, &policy());
        assert_eq!(script.creates(), 1);
        assert_eq!(script.deletes(), 1);
        assert!(script
            .ops()
            .iter()
            .all(|op| op.name().ends_with("nodes.example.com")));
    }

    #[test]
    fn test_applying_script_converges_and_preserves_foreign_records() {
        let d = DesiredRecordSet::new(
            "nodes.example.com",
            [
                ("nodes.example.com", "enrtree-root:v1 seq=9"),
                ("b1.nodes.example.com", BRANCH),
                ("l1.nodes.example.com", LEAF),
            ],
        )
        .unwrap();
        let a = actual(&[
            ("nodes.example.com", "enrtree-root:v1 seq=8", "r0"),
            ("b1.nodes.example.com", BRANCH, "r1"),
            ("l0.nodes.example.com", LEAF, "r2"),
            ("example.com", "v=spf1 -all", "r3"),
        ]);

        let script = diff(&d, &a, &policy());

        let mut zone: BTreeMap<String, String> = a
            .iter()
            .map(|r| (r.name.clone(), r.content.clone()))
            .collect();
        apply(&mut zone, script.ops());

        let managed: BTreeMap<String, String> = zone
            .iter()
            .filter(|(name, _)| name.ends_with("nodes.example.com"))
            .map(|(n, c)| (n.clone(), c.clone()))
            .collect();
        let expected: BTreeMap<String, String> = d
            .iter()
            .map(|(n, c)| (n.to_string(), c.to_string()))
            .collect();

        assert_eq!(managed, expected);
        assert_eq!(zone.get("example.com").map(String::as_str), Some("v=spf1 -all"));

        // Second pass against the converged zone is a no-op.
        let converged: ActualRecordSet = zone
            .iter()
            .enumerate()
            .map(|(i, (n, c))| ActualRecord::new(n, c.clone(), 86400, i.to_string()))
            .collect();
        assert!(diff(&d, &converged, &policy()).is_empty());
    }

    #[test]
    fn test_surplus_records_at_managed_names_are_deleted() {
        let d = desired(&[("example.com", ROOT)]);
        let a = actual(&[
            ("example.com", ROOT, "r1"),
            ("example.com", "enrtree-root:v1 seq=1", "r2"),
        ]);

        let script = diff(&d, &a, &policy());
        assert_eq!(
            script.ops(),
            &[EditOp::Delete {
                name: "example.com".into(),
                record_id: "r2".into(),
            }]
        );
    }

    #[test]
    fn test_surplus_records_outside_domain_are_kept() {
        let d = DesiredRecordSet::new("nodes.example.com", [("nodes.example.com", ROOT)]).unwrap();
        let a = actual(&[
            ("nodes.example.com", ROOT, "r0"),
            ("example.com", "a", "r1"),
            ("example.com", "b", "r2"),
        ]);

        assert!(diff(&d, &a, &policy()).is_empty());
    }

    #[test]
    fn test_diff_is_deterministic() {
        let d = desired(&[("example.com", ROOT), ("z.example.com", LEAF), ("a.example.com", BRANCH)]);
        let a = actual(&[("m.example.com", LEAF, "r1"), ("b.example.com", LEAF, "r2")]);

        let first = diff(&d, &a, &policy());
        let second = diff(&d, &a, &policy());
        assert_eq!(first, second);

        let names: Vec<&str> = first.ops().iter().map(EditOp::name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
