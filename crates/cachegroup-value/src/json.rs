//! JSON edge conversion
//!
//! The only place where wire-level JSON meets the typed value model.
//! `null` always means "absent" and decodes to `None`.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::map::AttributeMap;
use crate::nullable::NullableBool;
use crate::value::{Object, Value, ValueKind};

/// Errors converting between JSON and [`Value`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// JSON shape does not fit the requested kind
    #[error("expected {expected}, found JSON {found}")]
    KindMismatch {
        /// Kind the attribute declares
        expected: ValueKind,
        /// JSON type actually found
        found: &'static str,
    },

    /// JSON that no attribute kind can hold
    #[error("cannot represent JSON {0} as an attribute value")]
    Unrepresentable(&'static str),

    /// String that is not a tri-state boolean
    #[error("invalid nullable bool: {0:?}")]
    InvalidNullableBool(String),
}

/// Short name of a JSON value's type, for diagnostics
#[must_use]
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(n) if n.is_i64() => "integer",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl Value {
    /// Convert to the wire JSON form
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::NullableBool(b) => JsonValue::String(b.as_wire_str().to_string()),
            Self::StringSet(s) => s.iter().cloned().map(JsonValue::String).collect(),
            Self::StringList(l) => l.iter().cloned().map(JsonValue::String).collect(),
            Self::StringMap(m) => JsonValue::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
                    .collect(),
            ),
            Self::ObjectSet(objects) => objects
                .iter()
                .map(|obj| {
                    JsonValue::Object(obj.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
                })
                .collect(),
        }
    }

    /// Decode JSON as a value of a declared kind
    ///
    /// Returns `Ok(None)` for `null`.
    ///
    /// # Errors
    /// Returns [`ValueError::KindMismatch`] if the JSON shape does not fit
    /// `kind`, or [`ValueError::InvalidNullableBool`] for bad tri-state strings.
    pub fn from_json(json: &JsonValue, kind: ValueKind) -> Result<Option<Self>, ValueError> {
        if json.is_null() {
            return Ok(None);
        }

        let mismatch = || ValueError::KindMismatch {
            expected: kind,
            found: json_type_name(json),
        };

        let value = match kind {
            ValueKind::Bool => Self::Bool(json.as_bool().ok_or_else(mismatch)?),
            ValueKind::Int => Self::Int(json.as_i64().ok_or_else(mismatch)?),
            ValueKind::String => Self::String(json.as_str().ok_or_else(mismatch)?.to_string()),
            ValueKind::NullableBool => match json {
                JsonValue::Bool(b) => Self::NullableBool(NullableBool::from(*b)),
                JsonValue::String(s) => Self::NullableBool(s.parse()?),
                _ => return Err(mismatch()),
            },
            ValueKind::StringSet => {
                Self::StringSet(string_elements(json, kind)?.into_iter().collect())
            }
            ValueKind::StringList => Self::StringList(string_elements(json, kind)?),
            ValueKind::StringMap => {
                let obj = json.as_object().ok_or_else(mismatch)?;
                let mut map = std::collections::BTreeMap::new();
                for (k, v) in obj {
                    if v.is_null() {
                        continue;
                    }
                    let s = v.as_str().ok_or(ValueError::KindMismatch {
                        expected: kind,
                        found: json_type_name(v),
                    })?;
                    map.insert(k.clone(), s.to_string());
                }
                Self::StringMap(map)
            }
            ValueKind::ObjectSet => {
                let items = json.as_array().ok_or_else(mismatch)?;
                let mut objects = std::collections::BTreeSet::new();
                for item in items {
                    let obj = item.as_object().ok_or(ValueError::KindMismatch {
                        expected: kind,
                        found: json_type_name(item),
                    })?;
                    objects.insert(infer_object(obj)?);
                }
                Self::ObjectSet(objects)
            }
        };

        Ok(Some(value))
    }

    /// Decode JSON without a declared kind
    ///
    /// Arrays of strings become [`Value::StringList`], arrays of objects
    /// become [`Value::ObjectSet`], objects with string values become
    /// [`Value::StringMap`].
    ///
    /// # Errors
    /// Returns [`ValueError::Unrepresentable`] for floats, mixed arrays and
    /// objects with non-string values.
    pub fn infer_from_json(json: &JsonValue) -> Result<Option<Self>, ValueError> {
        let kind = match json {
            JsonValue::Null => return Ok(None),
            JsonValue::Bool(_) => ValueKind::Bool,
            JsonValue::Number(n) if n.is_i64() => ValueKind::Int,
            JsonValue::Number(_) => return Err(ValueError::Unrepresentable("number")),
            JsonValue::String(_) => ValueKind::String,
            JsonValue::Array(items) => {
                if items.iter().all(JsonValue::is_string) {
                    ValueKind::StringList
                } else if items.iter().all(JsonValue::is_object) {
                    ValueKind::ObjectSet
                } else {
                    return Err(ValueError::Unrepresentable("mixed array"));
                }
            }
            JsonValue::Object(obj) => {
                if obj.values().all(|v| v.is_string() || v.is_null()) {
                    ValueKind::StringMap
                } else {
                    return Err(ValueError::Unrepresentable("nested object"));
                }
            }
        };

        Self::from_json(json, kind)
    }
}

impl AttributeMap {
    /// Convert to a JSON object
    #[must_use]
    pub fn to_json(&self) -> JsonMap<String, JsonValue> {
        self.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }

    /// Decode a JSON object without a schema
    ///
    /// `null` entries are dropped.
    ///
    /// # Errors
    /// Returns the first [`ValueError`] encountered.
    pub fn infer_from_json(json: &JsonMap<String, JsonValue>) -> Result<Self, ValueError> {
        let mut map = Self::new();
        for (name, raw) in json {
            if let Some(value) = Value::infer_from_json(raw)? {
                map.insert(name.clone(), value);
            }
        }
        Ok(map)
    }
}

fn string_elements(json: &JsonValue, kind: ValueKind) -> Result<Vec<String>, ValueError> {
    let items = json.as_array().ok_or(ValueError::KindMismatch {
        expected: kind,
        found: json_type_name(json),
    })?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or(ValueError::KindMismatch {
                expected: kind,
                found: json_type_name(item),
            })
        })
        .collect()
}

fn infer_object(obj: &JsonMap<String, JsonValue>) -> Result<Object, ValueError> {
    let mut out = Object::new();
    for (k, v) in obj {
        if let Some(value) = Value::infer_from_json(v)? {
            out.insert(k.clone(), value);
        }
    }
    Ok(out)
}
