//! Error types for the schema registry
//!
//! Configuration problems are collected as [`Violation`]s into a
//! [`ValidationReport`]; definition and lookup problems are
//! [`SchemaError`]s.

use std::fmt;

use cachegroup_value::ValueKind;

/// One configuration problem
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Key not defined in the schema version
    #[error("unknown attribute '{attribute}'")]
    UnknownAttribute {
        /// Offending key
        attribute: String,
    },

    /// A validator rejected the value
    #[error("'{attribute}': {reason}")]
    ValidationFailure {
        /// Attribute (dotted path for nested fields)
        attribute: String,
        /// First failing validator's message
        reason: String,
    },

    /// Two mutually exclusive attributes are both set
    #[error("'{attribute}' conflicts with '{conflicting}'")]
    ConflictViolation {
        /// Attribute reporting the conflict
        attribute: String,
        /// The other attribute
        conflicting: String,
    },

    /// Collection holds more items than allowed
    #[error("'{attribute}' allows at most {limit} items, got {actual}")]
    CardinalityViolation {
        /// Attribute
        attribute: String,
        /// Declared maximum
        limit: usize,
        /// Actual size
        actual: usize,
    },

    /// Required attribute absent
    #[error("'{attribute}' is required")]
    MissingRequired {
        /// Attribute
        attribute: String,
    },

    /// User set a computed-only attribute
    #[error("'{attribute}' is computed and cannot be set")]
    ComputedOnly {
        /// Attribute
        attribute: String,
    },

    /// Value has the wrong kind
    #[error("'{attribute}': expected {expected}, found {found}")]
    KindMismatch {
        /// Attribute
        attribute: String,
        /// Declared kind
        expected: ValueKind,
        /// What was supplied
        found: String,
    },
}

impl Violation {
    /// Attribute the violation is reported on
    #[must_use]
    pub fn attribute(&self) -> &str {
        match self {
            Self::UnknownAttribute { attribute }
            | Self::ValidationFailure { attribute, .. }
            | Self::ConflictViolation { attribute, .. }
            | Self::CardinalityViolation { attribute, .. }
            | Self::MissingRequired { attribute }
            | Self::ComputedOnly { attribute }
            | Self::KindMismatch { attribute, .. } => attribute,
        }
    }
}

/// All violations found in one pass over a config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Create an empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation
    #[inline]
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Violations in discovery order
    #[inline]
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether no violations were found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// `Ok(())` when empty, else `Err(self)`
    ///
    /// # Errors
    /// Returns the report itself when it holds any violation.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.violations.len())?;
        for v in &self.violations {
            write!(f, "\n  - {v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl Extend<Violation> for ValidationReport {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.violations.extend(iter);
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

/// Schema definition and lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Name not defined in the schema version
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    /// Config failed validation or decoding
    #[error("invalid configuration")]
    Invalid(#[from] ValidationReport),

    /// Schema version is internally inconsistent
    #[error("invalid definition of '{attribute}' in schema v{version}: {reason}")]
    InvalidDefinition {
        /// Schema version
        version: u32,
        /// Attribute at fault
        attribute: String,
        /// What is wrong
        reason: String,
    },

    /// Two schema versions share a number
    #[error("schema version {0} registered twice")]
    DuplicateVersion(u32),

    /// Requested version not registered
    #[error("schema version {0} is not registered")]
    UnknownVersion(u32),

    /// Registry built without any version
    #[error("registry holds no schema versions")]
    Empty,
}

impl SchemaError {
    /// Create an invalid definition error
    pub fn invalid_definition(
        version: u32,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDefinition {
            version,
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}
