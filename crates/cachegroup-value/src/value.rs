//! Attribute values
//!
//! Provides [`Value`], the tagged union stored in configs and snapshots.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use crate::nullable::NullableBool;

/// One element of an object set: nested attribute name → value
pub type Object = BTreeMap<String, Value>;

/// Attribute value
///
/// Each variant corresponds to exactly one [`ValueKind`]. Sets are ordered
/// so that equality and iteration never depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// Plain boolean
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// UTF-8 string
    String(String),

    /// Tri-state boolean carried as a string on the wire
    NullableBool(NullableBool),

    /// Unordered set of strings
    StringSet(BTreeSet<String>),

    /// Ordered list of strings
    StringList(Vec<String>),

    /// String → string map (tags)
    StringMap(BTreeMap<String, String>),

    /// Unordered set of nested objects
    ObjectSet(BTreeSet<Object>),
}

impl Value {
    /// Create a string value
    #[inline]
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create a string set from any iterator of strings
    #[must_use]
    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringSet(items.into_iter().map(Into::into).collect())
    }

    /// Create a string list, preserving order
    #[must_use]
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringList(items.into_iter().map(Into::into).collect())
    }

    /// Create a string map from key/value pairs
    #[must_use]
    pub fn string_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::StringMap(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Create an object set
    #[must_use]
    pub fn object_set<I>(objects: I) -> Self
    where
        I: IntoIterator<Item = Object>,
    {
        Self::ObjectSet(objects.into_iter().collect())
    }

    /// Kind tag of this value
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::String(_) => ValueKind::String,
            Self::NullableBool(_) => ValueKind::NullableBool,
            Self::StringSet(_) => ValueKind::StringSet,
            Self::StringList(_) => ValueKind::StringList,
            Self::StringMap(_) => ValueKind::StringMap,
            Self::ObjectSet(_) => ValueKind::ObjectSet,
        }
    }

    /// Whether the value counts as "set" for conflict checks
    ///
    /// Empty strings, empty collections and [`NullableBool::Unset`] are
    /// unset. `false` and `0` are set: the user wrote them.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Bool(_) | Self::Int(_) => true,
            Self::String(s) => !s.is_empty(),
            Self::NullableBool(b) => !b.is_unset(),
            Self::StringSet(s) => !s.is_empty(),
            Self::StringList(l) => !l.is_empty(),
            Self::StringMap(m) => !m.is_empty(),
            Self::ObjectSet(o) => !o.is_empty(),
        }
    }

    /// Number of items for collection kinds
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::StringSet(s) => Some(s.len()),
            Self::StringList(l) => Some(l.len()),
            Self::StringMap(m) => Some(m.len()),
            Self::ObjectSet(o) => Some(o.len()),
            _ => None,
        }
    }

    /// String contents, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer contents, if this is an integer
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean contents, if this is a plain boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Iterate the string elements of a string set or list
    ///
    /// Yields nothing for other kinds.
    pub fn strings(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::StringSet(s) => Box::new(s.iter().map(String::as_str)),
            Self::StringList(l) => Box::new(l.iter().map(String::as_str)),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Apply `f` to the string, or to every string element of a set or list
    ///
    /// Other kinds are returned unchanged.
    #[must_use]
    pub fn map_strings(&self, f: impl Fn(&str) -> String) -> Self {
        match self {
            Self::String(s) => Self::String(f(s.as_str())),
            Self::StringSet(s) => Self::StringSet(s.iter().map(|v| f(v.as_str())).collect()),
            Self::StringList(l) => Self::StringList(l.iter().map(|v| f(v.as_str())).collect()),
            other => other.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NullableBool> for Value {
    fn from(value: NullableBool) -> Self {
        Self::NullableBool(value)
    }
}

/// Kind of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Int`]
    Int,
    /// [`Value::String`]
    String,
    /// [`Value::NullableBool`]
    NullableBool,
    /// [`Value::StringSet`]
    StringSet,
    /// [`Value::StringList`]
    StringList,
    /// [`Value::StringMap`]
    StringMap,
    /// [`Value::ObjectSet`]
    ObjectSet,
}

impl ValueKind {
    /// Whether values of this kind hold multiple items
    #[inline]
    #[must_use]
    pub fn is_collection(self) -> bool {
        matches!(
            self,
            Self::StringSet | Self::StringList | Self::StringMap | Self::ObjectSet
        )
    }

    /// Stable lowercase name, used in diagnostics and schema listings
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::String => "string",
            Self::NullableBool => "nullable_bool",
            Self::StringSet => "string_set",
            Self::StringList => "string_list",
            Self::StringMap => "string_map",
            Self::ObjectSet => "object_set",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Value::from(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from(6379).kind(), ValueKind::Int);
        assert_eq!(Value::from("redis").kind(), ValueKind::String);
        assert_eq!(Value::from(NullableBool::True).kind(), ValueKind::NullableBool);
        assert_eq!(Value::string_set(["a"]).kind(), ValueKind::StringSet);
        assert_eq!(Value::string_list(["a"]).kind(), ValueKind::StringList);
        assert_eq!(Value::string_map([("k", "v")]).kind(), ValueKind::StringMap);
        assert_eq!(Value::object_set([Object::new()]).kind(), ValueKind::ObjectSet);
    }

    #[test]
    fn is_set_treats_empty_as_unset() {
        assert!(!Value::string("").is_set());
        assert!(!Value::string_set(Vec::<String>::new()).is_set());
        assert!(!Value::from(NullableBool::Unset).is_set());

        assert!(Value::from(false).is_set());
        assert!(Value::from(0).is_set());
        assert!(Value::string("x").is_set());
    }

    #[test]
    fn string_set_ignores_order_and_duplicates() {
        let a = Value::string_set(["b", "a", "a"]);
        let b = Value::string_set(["a", "b"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), Some(2));
    }

    #[test]
    fn string_list_keeps_order() {
        let a = Value::string_list(["b", "a"]);
        let b = Value::string_list(["a", "b"]);
        assert_ne!(a, b);
    }

    #[test]
    fn map_strings_applies_to_elements() {
        let lowered = Value::string_set(["A", "b"]).map_strings(str::to_lowercase);
        assert_eq!(lowered, Value::string_set(["a", "b"]));

        let untouched = Value::from(7).map_strings(str::to_lowercase);
        assert_eq!(untouched, Value::Int(7));
    }

    #[test]
    fn strings_iterates_collections_only() {
        let list = Value::string_list(["x", "y"]);
        assert_eq!(list.strings().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(Value::string("x").strings().count(), 0);
    }

    #[test]
    fn collection_kinds() {
        assert!(ValueKind::ObjectSet.is_collection());
        assert!(ValueKind::StringMap.is_collection());
        assert!(!ValueKind::NullableBool.is_collection());
        assert_eq!(ValueKind::StringSet.to_string(), "string_set");
    }
}
