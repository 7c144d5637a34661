//! Shared helpers for corrections integration tests

use corrections::SessionConfig;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

pub const CORRECTIONS_PATH: &str = "/v1/enterprise/corrections";

/// Correction record as found in a corrections.json file
pub fn correction_json(package: &str) -> Value {
    json!({
        "description": format!("{package} cpe fix"),
        "type": "package",
        "match": {
            "type": "java",
            "field_matches": [
                {"field_name": "package", "field_value": package}
            ]
        },
        "replace": [
            {"field_name": "cpes", "replacement_value": format!("cpe:2.3:a:{package}:{package}:{{version}}:*:*:*:*:*:*:*")}
        ]
    })
}

/// Server reply in the shape the service actually sends: a single object
pub fn stored_correction_json(package: &str) -> Value {
    let mut value = correction_json(package);
    value["id"] = json!(format!("{package}-id"));
    value["created_at"] = json!("2023-01-01T00:00:00Z");
    value
}

/// Write a corrections file into a fresh temp dir
pub fn write_corrections(packages: &[&str]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("corrections.json");
    let records: Vec<Value> = packages.iter().map(|p| correction_json(p)).collect();
    std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).expect("write corrections");
    (dir, path)
}

pub fn session_config(server: &MockServer) -> SessionConfig {
    SessionConfig::from_url(&server.uri())
        .with_credentials("admin", "foobar")
        .with_account("admin")
        .with_timeout(Duration::from_secs(5))
}
