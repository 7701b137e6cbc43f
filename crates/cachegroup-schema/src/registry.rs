//! Schema registry
//!
//! Provides [`SchemaRegistry`], which holds every schema version of a
//! resource and answers questions against the current one.

use std::collections::BTreeMap;

use cachegroup_value::AttributeMap;

use crate::attribute::AttributeDefinition;
use crate::error::{SchemaError, ValidationReport};
use crate::replication_group;
use crate::schema::SchemaVersion;

/// All schema versions of one resource, keyed by number
///
/// The highest registered version is the current one.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    current: SchemaVersion,
    history: BTreeMap<u32, SchemaVersion>,
}

impl SchemaRegistry {
    /// Create a registry from built versions
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateVersion`] if two versions share a
    /// number, or [`SchemaError::Empty`] if none are given.
    pub fn new(versions: impl IntoIterator<Item = SchemaVersion>) -> Result<Self, SchemaError> {
        let mut map = BTreeMap::new();
        for schema in versions {
            let number = schema.version();
            if map.insert(number, schema).is_some() {
                return Err(SchemaError::DuplicateVersion(number));
            }
        }

        let (_, current) = map.pop_last().ok_or(SchemaError::Empty)?;

        tracing::debug!(
            current = current.version(),
            historical = map.len(),
            "schema registry built"
        );
        Ok(Self {
            current,
            history: map,
        })
    }

    /// Registry of the replication group resource
    ///
    /// # Errors
    /// Fails only if a built-in table is internally inconsistent.
    pub fn replication_group() -> Result<Self, SchemaError> {
        Self::new([replication_group::schema_v1()?, replication_group::schema_v2()?])
    }

    /// The current (highest) version
    #[must_use]
    pub fn current(&self) -> &SchemaVersion {
        &self.current
    }

    /// Number of the current version
    #[inline]
    #[must_use]
    pub fn current_version(&self) -> u32 {
        self.current().version()
    }

    /// A specific version
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownVersion`] if not registered.
    pub fn version(&self, version: u32) -> Result<&SchemaVersion, SchemaError> {
        if version == self.current.version() {
            return Ok(&self.current);
        }
        self.history
            .get(&version)
            .ok_or(SchemaError::UnknownVersion(version))
    }

    /// Registered version numbers, ascending
    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.history
            .keys()
            .copied()
            .chain(std::iter::once(self.current.version()))
    }

    /// Look up an attribute in the current version
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownAttribute`] if not defined.
    #[inline]
    pub fn lookup(&self, name: &str) -> Result<&AttributeDefinition, SchemaError> {
        self.current().lookup(name)
    }

    /// Attributes of the current version in declared order
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.current().attributes()
    }

    /// Validate against the current version
    ///
    /// # Errors
    /// Returns every violation found.
    #[inline]
    pub fn validate(&self, config: &AttributeMap) -> Result<(), ValidationReport> {
        self.current().validate(config)
    }

    /// Normalize against the current version
    #[inline]
    #[must_use]
    pub fn normalize(&self, config: &AttributeMap) -> AttributeMap {
        self.current().normalize(config)
    }

    /// Apply the current version's defaults
    #[inline]
    #[must_use]
    pub fn apply_defaults(&self, config: &AttributeMap) -> AttributeMap {
        self.current().apply_defaults(config)
    }
}
