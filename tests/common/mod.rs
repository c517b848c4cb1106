// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use dnsdisc_deploy::config::DeployConfig;
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::ResponseTemplate;

pub const DOMAIN: &str = "nodes.example.org";
pub const ZONE: &str = "example.org";

/// Deploy settings with fast retries for tests.
pub fn test_config() -> DeployConfig {
    DeployConfig {
        request_timeout: Duration::from_secs(5),
        retry_initial_interval: Duration::from_millis(1),
        ..DeployConfig::default()
    }
}

/// Write a JSON record file and keep it alive for the test.
pub fn write_tree(records: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{records}").expect("write record file");
    file
}

/// A small signed tree: root, one branch, two leaves.
pub fn tree_v1() -> Value {
    json!({
        "@": "enrtree-root:v1 e=BRANCHA l=LINKS seq=1 sig=sig1",
        "BRANCHA": "enrtree-branch:LEAF1,LEAF2",
        "LEAF1": "enr:-leaf-one",
        "LEAF2": "enr:-leaf-two",
    })
}

/// The next tree version: LEAF2 is gone, LEAF3 is new, root and branch changed.
pub fn tree_v2() -> Value {
    json!({
        "@": "enrtree-root:v1 e=BRANCHB l=LINKS seq=2 sig=sig2",
        "BRANCHB": "enrtree-branch:LEAF1,LEAF3",
        "LEAF1": "enr:-leaf-one",
        "LEAF3": "enr:-leaf-three",
    })
}

/// Successful Cloudflare envelope around `result`.
pub fn cf_ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
        "result_info": { "page": 1, "per_page": 100, "total_pages": 1 },
    }))
}
