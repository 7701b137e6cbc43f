//! Schema versions
//!
//! Provides [`SchemaVersion`], an immutable ordered set of attribute
//! definitions, and [`SchemaBuilder`], which checks a version for internal
//! consistency before handing it out.

use std::collections::{BTreeSet, HashSet};

use cachegroup_value::{
    json_type_name, AttributeMap, Object, Value, ValueError, ValueKind,
};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::attribute::{AttributeDefinition, AttributeSummary, ElementSchema, Presence};
use crate::error::{SchemaError, ValidationReport, Violation};

/// Placeholder written in place of sensitive values
pub const REDACTED: &str = "(sensitive value)";

/// One immutable version of a resource schema
///
/// Attributes keep their declared order; every pass over them (validation,
/// conflict tie-breaks, listings) follows that order.
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    version: u32,
    attributes: IndexMap<String, AttributeDefinition>,
}

/// Builder for [`SchemaVersion`]
#[derive(Debug)]
pub struct SchemaBuilder {
    version: u32,
    attributes: Vec<AttributeDefinition>,
}

impl SchemaBuilder {
    /// Append one attribute
    #[inline]
    #[must_use]
    pub fn attribute(mut self, definition: AttributeDefinition) -> Self {
        self.attributes.push(definition);
        self
    }

    /// Append several attributes
    #[must_use]
    pub fn attributes(mut self, definitions: impl IntoIterator<Item = AttributeDefinition>) -> Self {
        self.attributes.extend(definitions);
        self
    }

    /// Finish the version
    ///
    /// # Errors
    /// Returns [`SchemaError::InvalidDefinition`] for duplicate names or any
    /// failure of [`SchemaVersion::check_integrity`].
    pub fn build(self) -> Result<SchemaVersion, SchemaError> {
        let mut attributes = IndexMap::with_capacity(self.attributes.len());
        for def in self.attributes {
            if attributes.contains_key(def.name()) {
                return Err(SchemaError::invalid_definition(
                    self.version,
                    def.name(),
                    "declared more than once",
                ));
            }
            attributes.insert(def.name().to_string(), def);
        }

        let schema = SchemaVersion {
            version: self.version,
            attributes,
        };
        schema.check_integrity()?;
        Ok(schema)
    }
}

impl SchemaVersion {
    /// Start building a version
    #[inline]
    #[must_use]
    pub fn builder(version: u32) -> SchemaBuilder {
        SchemaBuilder {
            version,
            attributes: Vec::new(),
        }
    }

    /// Version number
    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Look up an attribute definition
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownAttribute`] if the name is not defined.
    pub fn lookup(&self, name: &str) -> Result<&AttributeDefinition, SchemaError> {
        self.attributes
            .get(name)
            .ok_or_else(|| SchemaError::UnknownAttribute(name.to_string()))
    }

    /// Whether the name is defined
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// All definitions in declared order
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.values()
    }

    /// Attribute names in declared order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Number of attributes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the version defines no attributes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes whose change forces recreation
    pub fn immutable_attributes(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.values().filter(|d| d.is_immutable())
    }

    /// Serializable listing in declared order
    #[must_use]
    pub fn summaries(&self) -> Vec<AttributeSummary> {
        self.attributes.values().map(AttributeDefinition::summary).collect()
    }

    /// Validate a config in one complete pass
    ///
    /// Reports unknown keys, kind mismatches, computed-only keys, missing
    /// required attributes, validator failures (first per attribute),
    /// element and nested-object failures, cardinality and conflicts.
    ///
    /// # Errors
    /// Returns every violation found, never just the first.
    pub fn validate(&self, config: &AttributeMap) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();

        for name in config.keys() {
            if !self.attributes.contains_key(name) {
                report.push(Violation::UnknownAttribute {
                    attribute: name.to_string(),
                });
            }
        }

        check_fields(
            self.attributes.values(),
            None,
            |name| config.get(name),
            &mut report,
        );

        tracing::debug!(
            version = self.version,
            attributes = config.len(),
            violations = report.len(),
            "validated configuration"
        );
        report.into_result()
    }

    /// Apply each attribute's normalizer
    ///
    /// Unknown keys pass through untouched.
    #[must_use]
    pub fn normalize(&self, config: &AttributeMap) -> AttributeMap {
        config
            .iter()
            .map(|(name, value)| {
                let value = self
                    .attributes
                    .get(name)
                    .map_or_else(|| value.clone(), |def| def.normalize(value));
                (name.clone(), value)
            })
            .collect()
    }

    /// Insert static defaults for absent optional attributes
    ///
    /// Computed values are left for the runtime to resolve.
    #[must_use]
    pub fn apply_defaults(&self, config: &AttributeMap) -> AttributeMap {
        let mut out = config.clone();
        for def in self.attributes.values() {
            if !def.presence().accepts_default() || out.contains_key(def.name()) {
                continue;
            }
            if let Some(default) = def.default_value() {
                out.insert(def.name(), default.clone());
            }
        }
        out
    }

    /// Evaluate the attribute's diff suppression rule
    ///
    /// Attributes without a rule never suppress.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownAttribute`] for undefined names.
    pub fn suppresses_diff(
        &self,
        name: &str,
        old: Option<&Value>,
        new: Option<&Value>,
        is_new_resource: bool,
    ) -> Result<bool, SchemaError> {
        let def = self.lookup(name)?;
        Ok(def
            .suppressor()
            .is_some_and(|rule| rule.suppress(old, new, is_new_resource)))
    }

    /// Whether old and new are the same once normalized, or the change is
    /// suppressed
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownAttribute`] for undefined names.
    pub fn is_unchanged(
        &self,
        name: &str,
        old: Option<&Value>,
        new: Option<&Value>,
        is_new_resource: bool,
    ) -> Result<bool, SchemaError> {
        let def = self.lookup(name)?;
        let old_norm = old.map(|v| def.normalize(v));
        let new_norm = new.map(|v| def.normalize(v));
        if old_norm == new_norm {
            return Ok(true);
        }
        self.suppresses_diff(name, old, new, is_new_resource)
    }

    /// Decode a JSON object using each attribute's declared kind
    ///
    /// `null` means absent. Unknown keys are decoded without a kind so
    /// that [`validate`](Self::validate) can report them.
    ///
    /// # Errors
    /// Returns every decoding problem found.
    pub fn decode_config(
        &self,
        json: &JsonMap<String, JsonValue>,
    ) -> Result<AttributeMap, ValidationReport> {
        let (map, report) = self.decode_partial(json);
        report.into_result().map(|()| map)
    }

    /// Decode and validate in a single pass
    ///
    /// Entries that fail to decode are left out of validation, so their
    /// kind errors are reported in place of any other violation on them.
    /// Everything else is checked as by [`validate`](Self::validate).
    ///
    /// # Errors
    /// Returns one report holding decode and validation violations.
    pub fn decode_and_validate(
        &self,
        json: &JsonMap<String, JsonValue>,
    ) -> Result<AttributeMap, ValidationReport> {
        let (map, mut report) = self.decode_partial(json);
        let undecoded: BTreeSet<String> = report
            .violations()
            .iter()
            .map(|v| v.attribute().to_string())
            .collect();

        if let Err(checked) = self.validate(&map) {
            report.extend(checked.into_iter().filter(|v| {
                !(matches!(v, Violation::MissingRequired { .. }) && undecoded.contains(v.attribute()))
            }));
        }
        report.into_result().map(|()| map)
    }

    fn decode_partial(&self, json: &JsonMap<String, JsonValue>) -> (AttributeMap, ValidationReport) {
        let mut map = AttributeMap::new();
        let mut report = ValidationReport::new();

        for (name, raw) in json {
            let decoded = match self.attributes.get(name) {
                Some(def) => decode_value(def, raw),
                None => Value::infer_from_json(raw),
            };
            match decoded {
                Ok(Some(value)) => {
                    map.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(err) => report.push(decode_violation(name, err)),
            }
        }

        tracing::debug!(
            version = self.version,
            decoded = map.len(),
            errors = report.len(),
            "decoded configuration"
        );
        (map, report)
    }

    /// Replace sensitive values with [`REDACTED`]
    #[must_use]
    pub fn redact(&self, config: &AttributeMap) -> AttributeMap {
        config
            .iter()
            .map(|(name, value)| {
                let sensitive = self.attributes.get(name).is_some_and(|d| d.is_sensitive());
                let value = if sensitive {
                    Value::string(REDACTED)
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect()
    }

    /// Check the version for internal consistency
    ///
    /// Every conflict target exists, defaults match kind and presence,
    /// cardinality and element schemas only appear on collection kinds,
    /// and nested object schemas are themselves consistent.
    ///
    /// # Errors
    /// Returns the first [`SchemaError::InvalidDefinition`] found.
    pub fn check_integrity(&self) -> Result<(), SchemaError> {
        for def in self.attributes.values() {
            check_definition(self.version, def, &|name: &str| self.attributes.contains_key(name))?;
        }
        Ok(())
    }
}

fn check_fields<'a, 'v>(
    defs: impl Iterator<Item = &'a AttributeDefinition> + Clone,
    prefix: Option<&str>,
    get: impl Fn(&str) -> Option<&'v Value>,
    report: &mut ValidationReport,
) {
    let path = |name: &str| match prefix {
        Some(p) => format!("{p}.{name}"),
        None => name.to_string(),
    };

    for def in defs.clone() {
        let value = get(def.name());
        let is_set = value.is_some_and(Value::is_set);

        let presence = def.presence();
        match value {
            _ if presence == Presence::Required && !is_set => {
                report.push(Violation::MissingRequired {
                    attribute: path(def.name()),
                });
            }
            Some(_) if is_set && !presence.user_settable() => {
                report.push(Violation::ComputedOnly {
                    attribute: path(def.name()),
                });
            }
            Some(value) => check_value(def, &path(def.name()), value, report),
            None => {}
        }
    }

    // One violation per pair, reported on whichever comes first in declared order
    let order: Vec<&str> = defs.clone().map(AttributeDefinition::name).collect();
    let position = |name: &str| order.iter().position(|n| *n == name).unwrap_or(usize::MAX);
    let mut reported: BTreeSet<(&str, &str)> = BTreeSet::new();
    for def in defs {
        if !get(def.name()).is_some_and(Value::is_set) {
            continue;
        }
        for other in def.conflicting() {
            if !get(other).is_some_and(Value::is_set) {
                continue;
            }
            let pair = if position(def.name()) <= position(other) {
                (def.name(), other.as_str())
            } else {
                (other.as_str(), def.name())
            };
            if reported.insert(pair) {
                report.push(Violation::ConflictViolation {
                    attribute: path(pair.0),
                    conflicting: path(pair.1),
                });
            }
        }
    }
}

fn check_value(def: &AttributeDefinition, path: &str, value: &Value, report: &mut ValidationReport) {
    if value.kind() != def.kind() {
        report.push(Violation::KindMismatch {
            attribute: path.to_string(),
            expected: def.kind(),
            found: value.kind().to_string(),
        });
        return;
    }

    if let Some(reason) = def.validators().iter().find_map(|v| v.validate(value).err()) {
        report.push(Violation::ValidationFailure {
            attribute: path.to_string(),
            reason,
        });
    }

    if let (Some(limit), Some(actual)) = (def.max_items(), value.len()) {
        if actual > limit {
            report.push(Violation::CardinalityViolation {
                attribute: path.to_string(),
                limit,
                actual,
            });
        }
    }

    match (def.element(), value) {
        (Some(ElementSchema::Strings(validators)), _) => {
            for (i, item) in value.strings().enumerate() {
                let item = Value::string(item);
                if let Some(reason) = validators.iter().find_map(|v| v.validate(&item).err()) {
                    report.push(Violation::ValidationFailure {
                        attribute: format!("{path}.{i}"),
                        reason,
                    });
                }
            }
        }
        (Some(ElementSchema::Object(defs)), Value::ObjectSet(objects)) => {
            for (i, obj) in objects.iter().enumerate() {
                check_object(defs, &format!("{path}.{i}"), obj, report);
            }
        }
        _ => {}
    }
}

fn check_object(defs: &[AttributeDefinition], prefix: &str, obj: &Object, report: &mut ValidationReport) {
    for key in obj.keys() {
        if !defs.iter().any(|d| d.name() == key) {
            report.push(Violation::UnknownAttribute {
                attribute: format!("{prefix}.{key}"),
            });
        }
    }
    check_fields(defs.iter(), Some(prefix), |name| obj.get(name), report);
}

fn check_definition(
    version: u32,
    def: &AttributeDefinition,
    known: &dyn Fn(&str) -> bool,
) -> Result<(), SchemaError> {
    let invalid = |reason: String| SchemaError::invalid_definition(version, def.name(), reason);

    for other in def.conflicting() {
        if other == def.name() {
            return Err(invalid("conflicts with itself".to_string()));
        }
        if !known(other) {
            return Err(invalid(format!("conflicts with undefined attribute '{other}'")));
        }
    }

    if let Some(default) = def.default_value() {
        if !def.presence().accepts_default() {
            return Err(invalid(format!(
                "{:?} attributes cannot declare a default",
                def.presence()
            )));
        }
        if default.kind() != def.kind() {
            return Err(invalid(format!(
                "default is {} but attribute is {}",
                default.kind(),
                def.kind()
            )));
        }
    }

    if def.max_items().is_some() && !def.kind().is_collection() {
        return Err(invalid(format!("max_items on non-collection kind {}", def.kind())));
    }

    match def.element() {
        Some(ElementSchema::Strings(_))
            if !matches!(def.kind(), ValueKind::StringSet | ValueKind::StringList) =>
        {
            return Err(invalid(format!("string elements on kind {}", def.kind())));
        }
        Some(ElementSchema::Object(_)) if def.kind() != ValueKind::ObjectSet => {
            return Err(invalid(format!("object elements on kind {}", def.kind())));
        }
        Some(ElementSchema::Object(nested)) => {
            let mut seen = HashSet::new();
            for child in nested {
                if !seen.insert(child.name()) {
                    return Err(invalid(format!(
                        "nested attribute '{}' declared more than once",
                        child.name()
                    )));
                }
            }
            let nested_known = |name: &str| nested.iter().any(|d| d.name() == name);
            for child in nested {
                check_definition(version, child, &nested_known)?;
            }
        }
        _ => {}
    }

    Ok(())
}

fn decode_value(def: &AttributeDefinition, raw: &JsonValue) -> Result<Option<Value>, ValueError> {
    let (Some(defs), Some(items)) = (def.nested(), raw.as_array()) else {
        return Value::from_json(raw, def.kind());
    };

    let mut objects = BTreeSet::new();
    for item in items {
        let obj = item.as_object().ok_or(ValueError::KindMismatch {
            expected: ValueKind::ObjectSet,
            found: json_type_name(item),
        })?;

        let mut decoded = Object::new();
        for (key, field) in obj {
            let value = match defs.iter().find(|d| d.name() == key) {
                Some(child) => decode_value(child, field)?,
                None => Value::infer_from_json(field)?,
            };
            if let Some(value) = value {
                decoded.insert(key.clone(), value);
            }
        }
        objects.insert(decoded);
    }

    Ok(Some(Value::ObjectSet(objects)))
}

fn decode_violation(name: &str, err: ValueError) -> Violation {
    match err {
        ValueError::KindMismatch { expected, found } => Violation::KindMismatch {
            attribute: name.to_string(),
            expected,
            found: format!("JSON {found}"),
        },
        other => Violation::ValidationFailure {
            attribute: name.to_string(),
            reason: other.to_string(),
        },
    }
}
