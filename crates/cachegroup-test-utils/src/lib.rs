//! Testing utilities for the cache group workspace
//!
//! Shared fixtures and proptest strategies.

#![allow(missing_docs)]

use cachegroup_value::{AttributeMap, NullableBool, Object, StateSnapshot, Value};
use proptest::collection::{btree_map, btree_set, vec};
use proptest::prelude::*;

pub const REPLICATION_GROUP_ID: &str = "tf-cache-01";
pub const AUTH_TOKEN: &str = "correct-horse-battery-staple";

pub fn log_delivery(destination_type: &str, destination: &str, log_format: &str, log_type: &str) -> Object {
    let mut obj = Object::new();
    obj.insert("destination_type".to_string(), Value::string(destination_type));
    obj.insert("destination".to_string(), Value::string(destination));
    obj.insert("log_format".to_string(), Value::string(log_format));
    obj.insert("log_type".to_string(), Value::string(log_type));
    obj
}

/// Smallest config the current schema accepts
pub fn minimal_config() -> AttributeMap {
    AttributeMap::new()
        .with("replication_group_id", REPLICATION_GROUP_ID)
        .with("description", "test group")
}

/// Realistic user config touching most attribute kinds
pub fn valid_config() -> AttributeMap {
    minimal_config()
        .with("node_type", "cache.t4g.small")
        .with("engine_version", "7.1")
        .with("port", 6379)
        .with("num_cache_clusters", 2)
        .with("automatic_failover_enabled", true)
        .with("auth_token", AUTH_TOKEN)
        .with("transit_encryption_enabled", true)
        .with("maintenance_window", "sun:05:00-sun:06:00")
        .with("snapshot_window", "01:00-02:00")
        .with("snapshot_retention_limit", 7)
        .with("auto_minor_version_upgrade", NullableBool::True)
        .with("security_group_ids", Value::string_set(["sg-0123"]))
        .with("preferred_cache_cluster_azs", Value::string_list(["us-west-2a", "us-west-2b"]))
        .with("tags", Value::string_map([("team", "cache")]))
        .with(
            "log_delivery_configuration",
            Value::object_set([log_delivery("cloudwatch-logs", "redis-slow", "json", "slow-log")]),
        )
}

/// Persisted state as written by schema version 1
pub fn v1_state() -> StateSnapshot {
    valid_config()
        .with("arn", "arn:aws:elasticache:us-west-2:123456789012:replicationgroup:tf-cache-01")
        .with("engine", "redis")
        .with("engine_version_actual", "7.1.0")
        .with("cluster_enabled", false)
        .with("member_clusters", Value::string_set(["tf-cache-01-001", "tf-cache-01-002"]))
        .with("primary_endpoint_address", "tf-cache-01.abc123.ng.0001.usw2.cache.amazonaws.com")
        .with("parameter_group_name", "default.redis7")
        .with("multi_az_enabled", false)
}

/// `v1_state` as the JSON object it was persisted as
pub fn v1_state_json() -> serde_json::Map<String, serde_json::Value> {
    v1_state().to_json()
}

pub fn arb_value() -> impl Strategy<Value = Value> {
    let name = "[a-z][a-z0-9-]{0,11}";
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        name.prop_map(Value::string),
        prop_oneof![
            Just(NullableBool::True),
            Just(NullableBool::False),
            Just(NullableBool::Unset)
        ]
        .prop_map(Value::NullableBool),
        btree_set(name, 0..4).prop_map(Value::StringSet),
        vec(name, 0..4).prop_map(Value::StringList),
        btree_map(name, name, 0..4).prop_map(Value::StringMap),
    ]
}

/// Arbitrary snapshot; keys never collide with schema attribute names
pub fn arb_snapshot() -> impl Strategy<Value = StateSnapshot> {
    btree_map("x_[a-z]{1,8}", arb_value(), 0..8).prop_map(AttributeMap::from)
}

/// Arbitrary subset of `v1_state`, as an upgrade input
pub fn arb_v1_state() -> impl Strategy<Value = StateSnapshot> {
    let full: Vec<(String, Value)> = v1_state().into_iter().collect();
    let len = full.len();
    proptest::sample::subsequence(full, 0..=len).prop_map(|entries| entries.into_iter().collect())
}
