//! Tri-state boolean
//!
//! Wire encoding is a string: `"true"`, `"false"`, or `""` for unset.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::json::ValueError;

/// Boolean that may be left unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum NullableBool {
    /// Explicitly true
    True,

    /// Explicitly false
    False,

    /// Not configured; the backend decides
    #[default]
    Unset,
}

impl NullableBool {
    /// Whether the value is [`NullableBool::Unset`]
    #[inline]
    #[must_use]
    pub fn is_unset(self) -> bool {
        self == Self::Unset
    }

    /// Known boolean, if any
    #[inline]
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Unset => None,
        }
    }

    /// Wire string for this value
    #[must_use]
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Unset => "",
        }
    }
}

impl From<bool> for NullableBool {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl From<Option<bool>> for NullableBool {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unset, Self::from)
    }
}

impl From<NullableBool> for Option<bool> {
    fn from(value: NullableBool) -> Self {
        value.as_bool()
    }
}

impl FromStr for NullableBool {
    type Err = ValueError;

    /// Parse the wire encoding
    ///
    /// Accepts the usual boolean spellings (`1`, `t`, `TRUE`, `False`, ...)
    /// and the empty string for unset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Unset),
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Self::True),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Self::False),
            other => Err(ValueError::InvalidNullableBool(other.to_string())),
        }
    }
}

impl Display for NullableBool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}
