use cachegroup_schema::replication_group::{schema_v1, schema_v2, DEFAULT_REDIS_PORT};
use cachegroup_schema::{SchemaRegistry, Violation, REDACTED};
use cachegroup_test_utils::{log_delivery, minimal_config, valid_config, v1_state_json, AUTH_TOKEN};
use cachegroup_value::{AttributeMap, NullableBool, Value, ValueKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn registry() -> SchemaRegistry {
    SchemaRegistry::replication_group().unwrap()
}

#[test]
fn fixture_config_is_valid() {
    assert_eq!(registry().validate(&valid_config()), Ok(()));
    assert_eq!(registry().validate(&minimal_config()), Ok(()));
}

#[test]
fn auth_token_conflicts_with_user_groups() {
    let config = minimal_config()
        .with("auth_token", AUTH_TOKEN)
        .with("user_group_ids", Value::string_set(["default-users"]));

    let report = registry().validate(&config).unwrap_err();
    assert_eq!(
        report.violations(),
        [Violation::ConflictViolation {
            attribute: "auth_token".into(),
            conflicting: "user_group_ids".into(),
        }]
    );
}

#[test]
fn unknown_attribute_and_conflict_both_reported() {
    let config = minimal_config()
        .with("auth_token", AUTH_TOKEN)
        .with("user_group_ids", Value::string_set(["default-users"]))
        .with("cache_size_gb", 12);

    let report = registry().validate(&config).unwrap_err();
    assert_eq!(report.len(), 2);
    assert!(report.violations().contains(&Violation::UnknownAttribute {
        attribute: "cache_size_gb".into()
    }));
    assert!(report
        .violations()
        .iter()
        .any(|v| matches!(v, Violation::ConflictViolation { .. })));
}

#[test]
fn mixed_case_maintenance_window() {
    let registry = registry();
    let config = minimal_config().with("maintenance_window", "Sun:05:00-Sun:06:00");

    assert_eq!(registry.validate(&config), Ok(()));
    let normalized = registry.normalize(&config);
    assert_eq!(
        normalized.get("maintenance_window"),
        Some(&Value::string("sun:05:00-sun:06:00"))
    );
}

#[test]
fn replication_group_id_is_lower_cased() {
    let normalized = registry().normalize(&AttributeMap::new().with("replication_group_id", "Cache-01"));
    assert_eq!(
        normalized.get("replication_group_id"),
        Some(&Value::string("cache-01"))
    );
}

#[test]
fn port_zero_suppressed_only_on_existing_resources() {
    let schema = registry();
    let current = schema.current();
    let old = Value::Int(DEFAULT_REDIS_PORT);
    let zero = Value::Int(0);

    assert!(current.suppresses_diff("port", Some(&old), Some(&zero), false).unwrap());
    assert!(!current.suppresses_diff("port", Some(&old), Some(&zero), true).unwrap());
    assert!(!current
        .suppresses_diff("port", Some(&Value::Int(6380)), Some(&zero), false)
        .unwrap());
}

#[test]
fn managed_parameter_group_suppressed() {
    let registry = registry();
    let old = Value::string("global-datastore-abc123");
    let new = Value::string("default.redis7");

    assert!(registry
        .current()
        .is_unchanged("parameter_group_name", Some(&old), Some(&new), false)
        .unwrap());
}

#[test]
fn global_group_conflicts_reported_per_pair() {
    let config = minimal_config()
        .with("global_replication_group_id", "ldgnf-cache")
        .with("engine", "redis")
        .with("node_type", "cache.m5.large")
        .with("num_node_groups", 2);

    let report = registry().validate(&config).unwrap_err();
    let pairs: Vec<_> = report
        .violations()
        .iter()
        .map(|v| match v {
            Violation::ConflictViolation { attribute, conflicting } => {
                (attribute.as_str(), conflicting.as_str())
            }
            other => panic!("unexpected {other}"),
        })
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("global_replication_group_id", "num_node_groups"),
            ("engine", "global_replication_group_id"),
            ("global_replication_group_id", "node_type"),
        ]
    );
}

#[test]
fn nested_log_delivery_violations_use_paths() {
    let config = minimal_config().with(
        "log_delivery_configuration",
        Value::object_set([
            log_delivery("cloudwatch-logs", "slow", "json", "slow-log"),
            log_delivery("cloudwatch-logs", "engine", "xml", "engine-log"),
            log_delivery("kinesis-firehose", "stream", "text", "engine-log"),
        ]),
    );

    let report = registry().validate(&config).unwrap_err();
    let attributes: Vec<_> = report.violations().iter().map(Violation::attribute).collect();

    assert!(report.violations().contains(&Violation::CardinalityViolation {
        attribute: "log_delivery_configuration".into(),
        limit: 2,
        actual: 3,
    }));
    assert!(attributes
        .iter()
        .any(|a| a.starts_with("log_delivery_configuration.") && a.ends_with(".log_format")));
}

#[test]
fn snapshot_arn_elements_checked() {
    let config = minimal_config().with(
        "snapshot_arns",
        Value::string_set(["arn:aws:s3:::bucket/a.rdb", "arn:aws:s3:::bucket/b.rdb,c.rdb", "nope"]),
    );

    let report = registry().validate(&config).unwrap_err();
    assert_eq!(report.len(), 2);
    assert!(report
        .violations()
        .iter()
        .all(|v| v.attribute().starts_with("snapshot_arns.")));
}

#[test]
fn computed_and_required_checks() {
    let config = AttributeMap::new()
        .with("arn", "arn:aws:elasticache:us-west-2:123456789012:replicationgroup:x")
        .with("description", "no id");

    let report = registry().validate(&config).unwrap_err();
    assert!(report.violations().contains(&Violation::ComputedOnly { attribute: "arn".into() }));
    assert!(report.violations().contains(&Violation::MissingRequired {
        attribute: "replication_group_id".into()
    }));
}

#[test]
fn defaults_fill_absent_optionals() {
    let defaulted = registry().apply_defaults(&minimal_config());

    assert_eq!(defaulted.get("engine"), Some(&Value::string("redis")));
    assert_eq!(defaulted.get("automatic_failover_enabled"), Some(&Value::Bool(false)));
    assert_eq!(defaulted.get("multi_az_enabled"), Some(&Value::Bool(false)));
    assert_eq!(
        defaulted.get("auth_token_update_strategy"),
        Some(&Value::string("ROTATE"))
    );
    assert!(!defaulted.contains_key("port"));
    assert!(!defaulted.contains_key("arn"));
}

#[test]
fn v1_lacks_strategy_default() {
    let defaulted = schema_v1().unwrap().apply_defaults(&minimal_config());
    assert!(!defaulted.contains_key("auth_token_update_strategy"));
}

#[test]
fn decode_persisted_state_by_kind() {
    let v1 = schema_v1().unwrap();
    let mut raw = v1_state_json();
    raw.insert("auto_minor_version_upgrade".into(), json!(""));
    raw.insert("security_group_names".into(), json!(["b", "a", "a"]));

    let decoded = v1.decode_config(&raw).unwrap();
    assert_eq!(
        decoded.get("auto_minor_version_upgrade"),
        Some(&Value::NullableBool(NullableBool::Unset))
    );
    assert_eq!(
        decoded.get("security_group_names"),
        Some(&Value::string_set(["a", "b"]))
    );
    assert_eq!(
        decoded.get("preferred_cache_cluster_azs"),
        Some(&Value::string_list(["us-west-2a", "us-west-2b"]))
    );
    assert_eq!(decoded.get("log_delivery_configuration").map(Value::kind), Some(ValueKind::ObjectSet));
}

#[test]
fn decode_reports_kind_errors() {
    let raw = json!({
        "replication_group_id": "cache-01",
        "port": "6379",
        "auto_minor_version_upgrade": "maybe",
    });

    let report = registry()
        .current()
        .decode_config(raw.as_object().unwrap())
        .unwrap_err();
    assert_eq!(report.len(), 2);
}

#[test]
fn sensitive_values_redacted() {
    let redacted = registry().current().redact(&valid_config());
    assert_eq!(redacted.get("auth_token"), Some(&Value::string(REDACTED)));
    assert_eq!(redacted.get("node_type"), valid_config().get("node_type"));
}

#[test]
fn both_versions_pass_integrity_checks() {
    assert!(schema_v1().unwrap().check_integrity().is_ok());
    assert!(schema_v2().unwrap().check_integrity().is_ok());
}

fn settable_conflict_pairs() -> Vec<(String, String)> {
    let schema = schema_v2().unwrap();
    schema
        .attributes()
        .flat_map(|def| {
            def.conflicting()
                .iter()
                .map(|other| (def.name().to_string(), other.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn sample_value(kind: ValueKind) -> Value {
    match kind {
        ValueKind::Bool => Value::Bool(true),
        ValueKind::Int => Value::Int(2),
        ValueKind::StringSet => Value::string_set(["arn:aws:s3:::bucket/a.rdb"]),
        _ => Value::string("0123456789abcdef-x"),
    }
}

proptest! {
    #[test]
    fn prop_conflicts_fail_in_any_insertion_order(
        index in 0..settable_conflict_pairs().len(),
        reversed in any::<bool>()
    ) {
        let schema = schema_v2().unwrap();
        let (a, b) = settable_conflict_pairs()[index].clone();
        let (first, second) = if reversed { (b, a) } else { (a, b) };

        let mut config = minimal_config();
        config.insert(first.as_str(), sample_value(schema.lookup(&first).unwrap().kind()));
        config.insert(second.as_str(), sample_value(schema.lookup(&second).unwrap().kind()));

        let report = schema.validate(&config).unwrap_err();
        let conflicts = report
            .violations()
            .iter()
            .filter(|v| matches!(v, Violation::ConflictViolation { .. }))
            .count();
        prop_assert_eq!(conflicts, 1);
    }
}
