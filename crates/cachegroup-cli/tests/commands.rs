use std::fs;
use std::path::PathBuf;

use cachegroup_cli::{command, log_format, logging::LogFormat, run};
use cachegroup_test_utils::{v1_state_json, valid_config, AUTH_TOKEN};
use pretty_assertions::assert_eq;
use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let matches = command().try_get_matches_from(std::iter::once("cachegroup").chain(args.iter().copied()))?;
    run(&matches)
}

fn valid_json() -> String {
    serde_json::to_string(&valid_config().to_json()).unwrap()
}

#[test]
fn validate_accepts_fixture() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.json", &valid_json());

    let out = run_args(&["validate", path.to_str().unwrap()]).unwrap();
    assert!(out.contains("valid under schema v2"), "{out}");
}

#[test]
fn validate_lists_every_violation() {
    let dir = TempDir::new().unwrap();
    let config = json!({
        "replication_group_id": "cache-01",
        "auth_token": AUTH_TOKEN,
        "user_group_ids": ["default"],
        "snapshot_retention_limit": 90,
        "bogus": true,
    });
    let path = write(&dir, "config.json", &config.to_string());

    let err = run_args(&["validate", path.to_str().unwrap()]).unwrap_err();
    let text = format!("{err:#}");

    assert!(text.contains("3 violation(s)"), "{text}");
    assert!(text.contains("unknown attribute 'bogus'"), "{text}");
    assert!(text.contains("'auth_token' conflicts with 'user_group_ids'"), "{text}");
    assert!(text.contains("snapshot_retention_limit"), "{text}");
}

#[test]
fn validate_reports_kind_errors_with_other_violations() {
    let dir = TempDir::new().unwrap();
    let config = json!({
        "replication_group_id": "cache-01",
        "port": "6379",
        "auth_token": AUTH_TOKEN,
        "user_group_ids": ["default"],
        "bogus": true,
    });
    let path = write(&dir, "config.json", &config.to_string());

    let err = run_args(&["validate", path.to_str().unwrap()]).unwrap_err();
    let text = format!("{err:#}");

    assert!(text.contains("3 violation(s)"), "{text}");
    assert!(text.contains("'port': expected int, found JSON string"), "{text}");
    assert!(text.contains("'auth_token' conflicts with 'user_group_ids'"), "{text}");
    assert!(text.contains("unknown attribute 'bogus'"), "{text}");
    assert_eq!(text.matches("violation(s)").count(), 1, "{text}");
}

#[test]
fn validate_against_v1_rejects_new_attribute() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "config.yaml",
        "replication_group_id: cache-01\nauth_token_update_strategy: SET\n",
    );

    assert!(run_args(&["validate", path.to_str().unwrap()]).is_ok());
    let err = run_args(&["validate", path.to_str().unwrap(), "--schema-version", "1"]).unwrap_err();
    assert!(format!("{err:#}").contains("unknown attribute 'auth_token_update_strategy'"));
}

#[test]
fn normalize_toml_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "config.toml",
        &format!(
            "replication_group_id = \"Cache-01\"\nmaintenance_window = \"Sun:05:00-Sun:06:00\"\nauth_token = \"{AUTH_TOKEN}\"\n"
        ),
    );

    let out = run_args(&["normalize", path.to_str().unwrap(), "--defaults"]).unwrap();
    let rendered: JsonValue = serde_json::from_str(&out).unwrap();

    assert_eq!(rendered["replication_group_id"], "cache-01");
    assert_eq!(rendered["maintenance_window"], "sun:05:00-sun:06:00");
    assert_eq!(rendered["engine"], "redis");
    assert_eq!(rendered["auth_token_update_strategy"], "ROTATE");
    assert_eq!(rendered["auth_token"], cachegroup_schema::REDACTED);
}

#[test]
fn normalize_reports_decode_errors() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.json", r#"{"replication_group_id": "x", "port": "6379"}"#);

    let err = run_args(&["normalize", path.to_str().unwrap()]).unwrap_err();
    assert!(format!("{err:#}").contains("'port': expected int"));
}

#[test]
fn upgrade_state_file() {
    let dir = TempDir::new().unwrap();
    let mut state = v1_state_json();
    state.insert("auth_token_update_strategy".into(), json!("SET"));
    let path = write(&dir, "state.json", &JsonValue::Object(state).to_string());

    let out = run_args(&["upgrade", path.to_str().unwrap(), "--from", "1"]).unwrap();
    let rendered: JsonValue = serde_json::from_str(&out).unwrap();

    assert_eq!(rendered["version"], 2);
    assert_eq!(rendered["state"]["auth_token_update_strategy"], "ROTATE");
    assert_eq!(rendered["state"]["auth_token"], cachegroup_schema::REDACTED);
    assert_eq!(rendered["state"]["replication_group_id"], "tf-cache-01");
}

#[test]
fn upgrade_rejects_downgrade() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.json", "{}");

    let err = run_args(&["upgrade", path.to_str().unwrap(), "--from", "2", "--to", "1"]).unwrap_err();
    assert!(format!("{err:#}").contains("cannot downgrade"));
}

#[test]
fn schema_listing() {
    let text = run_args(&["schema"]).unwrap();
    assert!(text.starts_with("schema v2"));
    assert!(text.contains("auth_token_update_strategy"));

    let json = run_args(&["schema", "--schema-version", "1", "--json"]).unwrap();
    let listing: Vec<JsonValue> = serde_json::from_str(&json).unwrap();
    assert!(listing.iter().all(|a| a["name"] != "auth_token_update_strategy"));
    assert!(listing
        .iter()
        .any(|a| a["name"] == "auth_token" && a["sensitive"] == true));
}

#[test]
fn unknown_schema_version() {
    let err = run_args(&["schema", "--schema-version", "9"]).unwrap_err();
    assert!(format!("{err:#}").contains("schema version 9 is not registered"));
}

#[test]
fn rejects_non_object_and_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let list = write(&dir, "config.json", "[1, 2]");
    let ini = write(&dir, "config.ini", "x=1");

    assert!(format!("{:#}", run_args(&["validate", list.to_str().unwrap()]).unwrap_err())
        .contains("must hold an object"));
    assert!(format!("{:#}", run_args(&["validate", ini.to_str().unwrap()]).unwrap_err())
        .contains("unsupported input format"));
}

#[test]
fn log_format_flag_is_global() {
    let matches = command()
        .try_get_matches_from(["cachegroup", "schema", "--log-format", "json"])
        .unwrap();
    assert_eq!(log_format(&matches).unwrap(), LogFormat::Json);

    let matches = command().try_get_matches_from(["cachegroup", "schema"]).unwrap();
    assert_eq!(log_format(&matches).unwrap(), LogFormat::Text);
}
