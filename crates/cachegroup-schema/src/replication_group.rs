//! Replication group schema
//!
//! Version 1 is the historical attribute table; version 2 adds the auth
//! token update strategy.

use std::sync::Arc;

use cachegroup_value::ValueKind;

use crate::attribute::{AttributeDefinition, ElementSchema};
use crate::error::SchemaError;
use crate::normalizer::LowerCase;
use crate::schema::SchemaVersion;
use crate::suppress::{OldHasPrefix, UnsetDefaultPort};
use crate::validator::{
    Arn, DailyWindow, ExcludesChars, IntAtMost, LengthBetween, NotEmpty, OneOf, RedisVersion,
    ReplicationGroupId, Validator, WeeklyWindow,
};

/// Default Redis port
pub const DEFAULT_REDIS_PORT: i64 = 6379;

/// Only supported engine
pub const ENGINE_REDIS: &str = "redis";

/// Prefix of parameter groups managed by a global datastore
pub const GLOBAL_DATASTORE_PREFIX: &str = "global-datastore-";

/// Attribute introduced in version 2
pub const AUTH_TOKEN_UPDATE_STRATEGY: &str = "auth_token_update_strategy";

/// Default auth token update strategy
pub const STRATEGY_ROTATE: &str = "ROTATE";

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Attributes that cannot be set together with a global replication group
const GLOBAL_GROUP_CONFLICTS: &[&str] = &[
    "num_node_groups",
    "parameter_group_name",
    "engine",
    "engine_version",
    "node_type",
    "security_group_names",
    "transit_encryption_enabled",
    "at_rest_encryption_enabled",
    "snapshot_arns",
    "snapshot_name",
];

fn log_delivery_block() -> Vec<AttributeDefinition> {
    use AttributeDefinition as A;

    vec![
        A::required("destination_type", ValueKind::String)
            .with_validator(OneOf::new(&["cloudwatch-logs", "kinesis-firehose"])),
        A::required("destination", ValueKind::String),
        A::required("log_format", ValueKind::String).with_validator(OneOf::new(&["text", "json"])),
        A::required("log_type", ValueKind::String)
            .with_validator(OneOf::new(&["slow-log", "engine-log"])),
    ]
}

fn v1_attributes() -> Vec<AttributeDefinition> {
    use AttributeDefinition as A;
    use ValueKind::{Bool, Int, NullableBool, ObjectSet, String, StringList, StringMap, StringSet};

    let snapshot_arn: Vec<Arc<dyn Validator>> = vec![Arc::new(Arn), Arc::new(ExcludesChars(","))];

    vec![
        A::optional_computed("apply_immediately", Bool),
        A::computed("arn", String),
        A::optional_computed("at_rest_encryption_enabled", Bool).immutable(),
        A::optional("auth_token", String)
            .sensitive()
            .with_validator(LengthBetween { min: 16, max: 128 })
            .with_validator(ExcludesChars("@\"/"))
            .conflicts_with(&["user_group_ids"]),
        A::optional_computed("auto_minor_version_upgrade", NullableBool),
        A::optional("automatic_failover_enabled", Bool).with_default(false),
        A::computed("cluster_enabled", Bool),
        A::computed("configuration_endpoint_address", String),
        A::optional_computed("data_tiering_enabled", Bool).immutable(),
        A::optional_computed("description", String).with_validator(NotEmpty),
        A::optional("engine", String)
            .immutable()
            .with_default(ENGINE_REDIS)
            .with_validator(OneOf::ignore_case(&[ENGINE_REDIS])),
        A::optional_computed("engine_version", String).with_validator(RedisVersion),
        A::computed("engine_version_actual", String),
        A::optional_computed("global_replication_group_id", String)
            .immutable()
            .conflicts_with(GLOBAL_GROUP_CONFLICTS),
        A::optional_computed("ip_discovery", String).with_validator(OneOf::new(&["ipv4", "ipv6"])),
        A::optional("log_delivery_configuration", ObjectSet)
            .with_max_items(2)
            .with_elements(ElementSchema::Object(log_delivery_block())),
        A::optional_computed("maintenance_window", String)
            .with_normalizer(LowerCase)
            .with_validator(WeeklyWindow),
        A::computed("member_clusters", StringSet),
        A::optional("multi_az_enabled", Bool).with_default(false),
        A::optional_computed("network_type", String)
            .immutable()
            .with_validator(OneOf::new(&["ipv4", "ipv6", "dual_stack"])),
        A::optional_computed("node_type", String),
        A::optional("notification_topic_arn", String).with_validator(Arn),
        A::optional_computed("num_cache_clusters", Int).conflicts_with(&["num_node_groups"]),
        A::optional_computed("num_node_groups", Int)
            .conflicts_with(&["num_cache_clusters", "global_replication_group_id"]),
        A::optional_computed("parameter_group_name", String)
            .with_suppressor(OldHasPrefix::new(GLOBAL_DATASTORE_PREFIX)),
        A::optional("port", Int)
            .immutable()
            .with_suppressor(UnsetDefaultPort::new(DEFAULT_REDIS_PORT)),
        A::optional("preferred_cache_cluster_azs", StringList),
        A::computed("primary_endpoint_address", String),
        A::computed("reader_endpoint_address", String),
        A::optional_computed("replicas_per_node_group", Int),
        A::required("replication_group_id", String)
            .immutable()
            .with_normalizer(LowerCase)
            .with_validator(ReplicationGroupId),
        A::optional_computed("security_group_names", StringSet).immutable(),
        A::optional_computed("security_group_ids", StringSet),
        A::optional("snapshot_arns", StringSet)
            .immutable()
            .with_elements(ElementSchema::Strings(snapshot_arn)),
        A::optional("snapshot_retention_limit", Int).with_validator(IntAtMost(35)),
        A::optional_computed("snapshot_window", String).with_validator(DailyWindow),
        A::optional("snapshot_name", String).immutable(),
        A::optional_computed("subnet_group_name", String).immutable(),
        A::optional("tags", StringMap),
        A::optional_computed("tags_all", StringMap),
        A::optional_computed("transit_encryption_enabled", Bool).immutable(),
        A::optional("user_group_ids", StringSet).conflicts_with(&["auth_token"]),
        A::optional("kms_key_id", String).immutable(),
        A::optional("final_snapshot_identifier", String),
    ]
}

/// Historical version 1 of the replication group schema
///
/// # Errors
/// Fails only if the table is internally inconsistent.
pub fn schema_v1() -> Result<SchemaVersion, SchemaError> {
    SchemaVersion::builder(1).attributes(v1_attributes()).build()
}

/// Current version 2 of the replication group schema
///
/// # Errors
/// Fails only if the table is internally inconsistent.
pub fn schema_v2() -> Result<SchemaVersion, SchemaError> {
    let mut attributes = v1_attributes();
    let at = attributes
        .iter()
        .position(|a| a.name() == "auth_token")
        .map_or(attributes.len(), |i| i + 1);

    attributes.insert(
        at,
        AttributeDefinition::optional(AUTH_TOKEN_UPDATE_STRATEGY, ValueKind::String)
            .with_default(STRATEGY_ROTATE)
            .with_validator(OneOf::new(&["SET", "ROTATE", "DELETE"])),
    );

    SchemaVersion::builder(CURRENT_SCHEMA_VERSION)
        .attributes(attributes)
        .build()
}
