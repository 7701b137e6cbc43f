//! Diff suppression strategies
//!
//! A suppressor decides whether a proposed change should be treated as no
//! change at all. Unlike a [`Normalizer`](crate::Normalizer) it never
//! rewrites the stored value.

use std::fmt;

use cachegroup_value::Value;

/// Pure rule over (old, new, is-new-resource)
///
/// `None` means the attribute is absent on that side.
pub trait DiffSuppressor: Send + Sync + fmt::Debug {
    /// Stable name, shown in schema listings
    fn name(&self) -> &'static str;

    /// Return `true` to treat the change as unchanged
    fn suppress(&self, old: Option<&Value>, new: Option<&Value>, is_new_resource: bool) -> bool;
}

/// Suppress an omitted port on an existing resource still using the default
///
/// An omitted port arrives as absent or as the sentinel `0`.
#[derive(Debug, Clone, Copy)]
pub struct UnsetDefaultPort {
    default: i64,
}

impl UnsetDefaultPort {
    /// Create for a protocol default port
    #[inline]
    #[must_use]
    pub fn new(default: i64) -> Self {
        Self { default }
    }
}

impl DiffSuppressor for UnsetDefaultPort {
    fn name(&self) -> &'static str {
        "unset_default_port"
    }

    fn suppress(&self, old: Option<&Value>, new: Option<&Value>, is_new_resource: bool) -> bool {
        if is_new_resource {
            return false;
        }
        let new_unset = new.map_or(true, |v| v.as_int() == Some(0));
        let old_default = old.and_then(Value::as_int) == Some(self.default);
        new_unset && old_default
    }
}

/// Suppress any change when the old value carries a managed prefix
#[derive(Debug, Clone)]
pub struct OldHasPrefix {
    prefix: String,
}

impl OldHasPrefix {
    /// Create for a prefix
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl DiffSuppressor for OldHasPrefix {
    fn name(&self) -> &'static str {
        "old_has_prefix"
    }

    fn suppress(&self, old: Option<&Value>, _new: Option<&Value>, _is_new_resource: bool) -> bool {
        old.and_then(Value::as_str)
            .is_some_and(|s| s.starts_with(&self.prefix))
    }
}
