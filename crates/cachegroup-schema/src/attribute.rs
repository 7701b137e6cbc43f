//! Attribute definitions
//!
//! Provides [`AttributeDefinition`], one field of a schema version with all
//! of its constraint metadata.

use std::fmt;
use std::sync::Arc;

use cachegroup_value::{Value, ValueKind};
use serde::Serialize;

use crate::normalizer::Normalizer;
use crate::suppress::DiffSuppressor;
use crate::validator::Validator;

/// Who supplies an attribute's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// The user must supply it
    Required,

    /// The user may supply it
    Optional,

    /// Only the system sets it
    Computed,

    /// The user may supply it, else the system fills it in
    OptionalComputed,
}

impl Presence {
    /// Whether a user config may set the attribute
    #[inline]
    #[must_use]
    pub fn user_settable(self) -> bool {
        !matches!(self, Self::Computed)
    }

    /// Whether a static default may be declared
    #[inline]
    #[must_use]
    pub fn accepts_default(self) -> bool {
        matches!(self, Self::Optional | Self::OptionalComputed)
    }

    /// Stable snake_case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Computed => "computed",
            Self::OptionalComputed => "optional_computed",
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema for the items of a collection attribute
#[derive(Debug, Clone)]
pub enum ElementSchema {
    /// Validators applied to every string element of a set or list
    Strings(Vec<Arc<dyn Validator>>),

    /// Nested attribute definitions for every object of an object set
    Object(Vec<AttributeDefinition>),
}

/// One attribute of a schema version
///
/// Built with chained `with`-style methods; immutable once placed in a
/// [`SchemaVersion`](crate::SchemaVersion).
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    kind: ValueKind,
    presence: Presence,
    immutable: bool,
    sensitive: bool,
    default: Option<Value>,
    validators: Vec<Arc<dyn Validator>>,
    normalizer: Option<Arc<dyn Normalizer>>,
    suppressor: Option<Arc<dyn DiffSuppressor>>,
    conflicts_with: Vec<String>,
    max_items: Option<usize>,
    element: Option<ElementSchema>,
}

impl AttributeDefinition {
    /// Create a definition with no constraints beyond kind and presence
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ValueKind, presence: Presence) -> Self {
        Self {
            name: name.into(),
            kind,
            presence,
            immutable: false,
            sensitive: false,
            default: None,
            validators: Vec::new(),
            normalizer: None,
            suppressor: None,
            conflicts_with: Vec::new(),
            max_items: None,
            element: None,
        }
    }

    /// Required attribute
    #[inline]
    #[must_use]
    pub fn required(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    /// Optional attribute
    #[inline]
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    /// Computed-only attribute
    #[inline]
    #[must_use]
    pub fn computed(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::new(name, kind, Presence::Computed)
    }

    /// Optional attribute the system fills in when omitted
    #[inline]
    #[must_use]
    pub fn optional_computed(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::new(name, kind, Presence::OptionalComputed)
    }

    /// Changing the attribute forces recreation
    #[inline]
    #[must_use]
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Never echo the value in cleartext
    #[inline]
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Static default used when the attribute is absent
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Append a validator
    #[inline]
    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Set the normalizer
    #[inline]
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Some(Arc::new(normalizer));
        self
    }

    /// Set the diff suppression rule
    #[inline]
    #[must_use]
    pub fn with_suppressor(mut self, suppressor: impl DiffSuppressor + 'static) -> Self {
        self.suppressor = Some(Arc::new(suppressor));
        self
    }

    /// Declare attributes that must be unset when this one is set
    #[must_use]
    pub fn conflicts_with(mut self, names: &[&str]) -> Self {
        self.conflicts_with
            .extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    /// Cardinality bound for collection kinds
    #[inline]
    #[must_use]
    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Element schema for collection kinds
    #[inline]
    #[must_use]
    pub fn with_elements(mut self, element: ElementSchema) -> Self {
        self.element = Some(element);
        self
    }

    /// Attribute name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Presence class
    #[inline]
    #[must_use]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Whether a change forces recreation
    #[inline]
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Whether the value is sensitive
    #[inline]
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Static default
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Validators in evaluation order
    #[inline]
    #[must_use]
    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }

    /// Normalizer, if any
    #[inline]
    #[must_use]
    pub fn normalizer(&self) -> Option<&dyn Normalizer> {
        self.normalizer.as_deref()
    }

    /// Diff suppression rule, if any
    #[inline]
    #[must_use]
    pub fn suppressor(&self) -> Option<&dyn DiffSuppressor> {
        self.suppressor.as_deref()
    }

    /// Conflict set
    #[inline]
    #[must_use]
    pub fn conflicting(&self) -> &[String] {
        &self.conflicts_with
    }

    /// Cardinality bound
    #[inline]
    #[must_use]
    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// Element schema
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&ElementSchema> {
        self.element.as_ref()
    }

    /// Nested definitions of an object set
    #[must_use]
    pub fn nested(&self) -> Option<&[AttributeDefinition]> {
        match &self.element {
            Some(ElementSchema::Object(defs)) => Some(defs),
            _ => None,
        }
    }

    /// Apply the normalizer, recursing into nested object sets
    #[must_use]
    pub fn normalize(&self, value: &Value) -> Value {
        let value = match (&self.element, value) {
            (Some(ElementSchema::Object(defs)), Value::ObjectSet(objects)) => Value::ObjectSet(
                objects
                    .iter()
                    .map(|obj| {
                        obj.iter()
                            .map(|(k, v)| {
                                let v = defs
                                    .iter()
                                    .find(|d| d.name == *k)
                                    .map_or_else(|| v.clone(), |d| d.normalize(v));
                                (k.clone(), v)
                            })
                            .collect()
                    })
                    .collect(),
            ),
            _ => value.clone(),
        };

        match &self.normalizer {
            Some(n) => n.normalize(&value),
            None => value,
        }
    }

    /// Serializable description for listings
    #[must_use]
    pub fn summary(&self) -> AttributeSummary {
        let (element_validators, nested) = match &self.element {
            Some(ElementSchema::Strings(vs)) => (vs.iter().map(|v| v.name()).collect(), Vec::new()),
            Some(ElementSchema::Object(defs)) => {
                (Vec::new(), defs.iter().map(Self::summary).collect())
            }
            None => (Vec::new(), Vec::new()),
        };

        AttributeSummary {
            name: self.name.clone(),
            kind: self.kind.name(),
            presence: self.presence,
            immutable: self.immutable,
            sensitive: self.sensitive,
            default: self.default.as_ref().map(Value::to_json),
            validators: self.validators.iter().map(|v| v.name()).collect(),
            normalizer: self.normalizer.as_ref().map(|n| n.name()),
            suppressor: self.suppressor.as_ref().map(|s| s.name()),
            conflicts_with: self.conflicts_with.clone(),
            max_items: self.max_items,
            element_validators,
            nested,
        }
    }
}

/// Read-only, serializable view of an [`AttributeDefinition`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSummary {
    /// Attribute name
    pub name: String,
    /// Kind name
    pub kind: &'static str,
    /// Presence class
    pub presence: Presence,
    /// Forces recreation on change
    pub immutable: bool,
    /// Redacted in output
    pub sensitive: bool,
    /// Static default, in wire form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Validator names in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<&'static str>,
    /// Normalizer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<&'static str>,
    /// Suppressor name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppressor: Option<&'static str>,
    /// Conflict set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
    /// Cardinality bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Element validator names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub element_validators: Vec<&'static str>,
    /// Nested attribute summaries
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<AttributeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::LowerCase;
    use crate::validator::{NotEmpty, OneOf};

    #[test]
    fn builder_sets_metadata() {
        let def = AttributeDefinition::optional("engine", ValueKind::String)
            .immutable()
            .with_default("redis")
            .with_validator(OneOf::ignore_case(&["redis"]));

        assert_eq!(def.name(), "engine");
        assert_eq!(def.presence(), Presence::Optional);
        assert!(def.is_immutable());
        assert!(!def.is_sensitive());
        assert_eq!(def.default_value(), Some(&Value::string("redis")));
        assert_eq!(def.validators().len(), 1);
    }

    #[test]
    fn presence_rules() {
        assert!(!Presence::Computed.user_settable());
        assert!(Presence::OptionalComputed.user_settable());
        assert!(!Presence::Required.accepts_default());
        assert!(Presence::OptionalComputed.accepts_default());
        assert_eq!(Presence::OptionalComputed.to_string(), "optional_computed");
    }

    #[test]
    fn normalize_recurses_into_objects() {
        let def = AttributeDefinition::optional("blocks", ValueKind::ObjectSet).with_elements(
            ElementSchema::Object(vec![AttributeDefinition::required(
                "name",
                ValueKind::String,
            )
            .with_normalizer(LowerCase)]),
        );

        let mut obj = cachegroup_value::Object::new();
        obj.insert("name".to_string(), Value::string("UPPER"));
        obj.insert("other".to_string(), Value::string("KEEP"));

        let Value::ObjectSet(out) = def.normalize(&Value::object_set([obj])) else {
            panic!("expected object set");
        };
        let first = out.iter().next().unwrap();
        assert_eq!(first.get("name"), Some(&Value::string("upper")));
        assert_eq!(first.get("other"), Some(&Value::string("KEEP")));
    }

    #[test]
    fn summary_lists_strategy_names() {
        let def = AttributeDefinition::optional("description", ValueKind::String)
            .with_validator(NotEmpty)
            .with_normalizer(LowerCase)
            .conflicts_with(&["other"]);

        let summary = def.summary();
        assert_eq!(summary.kind, "string");
        assert_eq!(summary.validators, vec!["not_empty"]);
        assert_eq!(summary.normalizer, Some("lower_case"));
        assert_eq!(summary.conflicts_with, vec!["other".to_string()]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["presence"], "optional");
        assert!(json.get("max_items").is_none());
    }
}
