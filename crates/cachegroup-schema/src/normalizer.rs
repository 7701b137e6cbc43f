//! Normalizer strategies
//!
//! A normalizer rewrites the stored value so that canonicalization done by
//! the backend does not register as a change.

use std::fmt;

use cachegroup_value::Value;

/// Pure value rewrite applied before storage and comparison
pub trait Normalizer: Send + Sync + fmt::Debug {
    /// Stable name, shown in schema listings
    fn name(&self) -> &'static str;

    /// Return the canonical form of `value`
    fn normalize(&self, value: &Value) -> Value;
}

/// Lower-cases strings and string collection elements
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerCase;

impl Normalizer for LowerCase {
    fn name(&self) -> &'static str {
        "lower_case"
    }

    fn normalize(&self, value: &Value) -> Value {
        value.map_strings(str::to_lowercase)
    }
}
