//! Config and state file loading
//!
//! Files hold one object of attribute values. The format is chosen by
//! extension and everything is converted to JSON before decoding.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl InputFormat {
    /// Pick the format from a file extension
    ///
    /// # Errors
    /// Fails for missing or unsupported extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => bail!("unsupported input format '.{other}' (expected .json, .yaml, .yml or .toml)"),
        }
    }

    /// Parse text into a JSON value
    ///
    /// # Errors
    /// Returns the underlying parser error.
    pub fn parse(self, text: &str) -> Result<JsonValue> {
        let value = match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
            Self::Toml => toml::from_str(text)?,
        };
        Ok(value)
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        })
    }
}

/// Read a file holding one object of attribute values
///
/// # Errors
/// Fails if the file cannot be read or parsed, or is not an object.
pub fn load_object(path: &Path) -> Result<JsonMap<String, JsonValue>> {
    let format = InputFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = format
        .parse(&text)
        .with_context(|| format!("failed to parse {} as {format}", path.display()))?;

    tracing::debug!(path = %path.display(), %format, "loaded input file");

    match value {
        JsonValue::Object(map) => Ok(map),
        other => bail!(
            "{} must hold an object of attributes, found {}",
            path.display(),
            cachegroup_value::json_type_name(&other)
        ),
    }
}
