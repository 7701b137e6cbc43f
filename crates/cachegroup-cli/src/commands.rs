//! Command implementations
//!
//! Each command returns the text to print on stdout. Configs and states
//! are always redacted before they are rendered.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use cachegroup_schema::{SchemaError, SchemaRegistry, SchemaVersion};
use cachegroup_upgrade::{UpgradeChain, VersionedSnapshot};
use cachegroup_value::AttributeMap;

use crate::input::load_object;

fn schema_for(registry: &SchemaRegistry, version: Option<u32>) -> Result<&SchemaVersion> {
    let schema = match version {
        Some(v) => registry.version(v)?,
        None => registry.current(),
    };
    Ok(schema)
}

fn decode(schema: &SchemaVersion, path: &Path) -> Result<AttributeMap> {
    let raw = load_object(path)?;
    schema
        .decode_config(&raw)
        .map_err(SchemaError::from)
        .with_context(|| format!("failed to decode {}", path.display()))
}

fn render(map: &AttributeMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(&map.to_json())?)
}

/// List a schema version's attributes
///
/// # Errors
/// Fails for unknown versions.
pub fn schema(registry: &SchemaRegistry, version: Option<u32>, json: bool) -> Result<String> {
    let schema = schema_for(registry, version)?;
    let summaries = schema.summaries();

    if json {
        return Ok(serde_json::to_string_pretty(&summaries)?);
    }

    let mut out = format!(
        "schema v{} ({} attributes)\n",
        schema.version(),
        summaries.len()
    );
    for s in &summaries {
        let mut flags = Vec::new();
        if s.immutable {
            flags.push("immutable".to_string());
        }
        if s.sensitive {
            flags.push("sensitive".to_string());
        }
        if let Some(default) = &s.default {
            flags.push(format!("default={default}"));
        }
        if !s.conflicts_with.is_empty() {
            flags.push(format!("conflicts={}", s.conflicts_with.join(",")));
        }
        if let Some(max) = s.max_items {
            flags.push(format!("max_items={max}"));
        }
        writeln!(
            out,
            "  {:<32} {:<14} {:<18} {}",
            s.name,
            s.kind,
            s.presence.as_str(),
            flags.join(" ")
        )?;
    }
    Ok(out.trim_end().to_string())
}

/// Validate a config file, reporting every violation
///
/// Decode errors and validation violations are reported together.
///
/// # Errors
/// Fails on load errors, or with the full [`ValidationReport`] when the
/// config is invalid.
///
/// [`ValidationReport`]: cachegroup_schema::ValidationReport
pub fn validate(registry: &SchemaRegistry, path: &Path, version: Option<u32>) -> Result<String> {
    let schema = schema_for(registry, version)?;
    let raw = load_object(path)?;

    let config = schema
        .decode_and_validate(&raw)
        .map_err(SchemaError::from)
        .with_context(|| format!("{} failed validation", path.display()))?;

    Ok(format!(
        "{}: valid under schema v{} ({} attributes)",
        path.display(),
        schema.version(),
        config.len()
    ))
}

/// Print a config after normalization, optionally with defaults applied
///
/// # Errors
/// Fails on load or decode errors.
pub fn normalize(
    registry: &SchemaRegistry,
    path: &Path,
    version: Option<u32>,
    defaults: bool,
) -> Result<String> {
    let schema = schema_for(registry, version)?;
    let config = decode(schema, path)?;

    let mut normalized = schema.normalize(&config);
    if defaults {
        normalized = schema.apply_defaults(&normalized);
    }
    render(&schema.redact(&normalized))
}

/// Upgrade a persisted state file and print the tagged result
///
/// The state is decoded with the schema of `from`; `to` defaults to the
/// current schema version.
///
/// # Errors
/// Fails on load, decode or upgrade errors.
pub fn upgrade(
    registry: &SchemaRegistry,
    chain: &UpgradeChain,
    path: &Path,
    from: u32,
    to: Option<u32>,
) -> Result<String> {
    let to = to.unwrap_or_else(|| registry.current_version());
    let source = registry.version(from)?;
    let state = decode(source, path)?;

    let upgraded = VersionedSnapshot::new(from, state)
        .upgrade_to(chain, to)
        .with_context(|| format!("failed to upgrade {} from v{from} to v{to}", path.display()))?;

    let target = registry.version(to)?;
    let redacted = VersionedSnapshot::new(upgraded.version, target.redact(&upgraded.state));
    Ok(serde_json::to_string_pretty(&redacted)?)
}
