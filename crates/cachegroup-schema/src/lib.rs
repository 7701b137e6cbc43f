//! Cache Group Schema Registry
//!
//! Versioned, declarative attribute schemas for managed cache replication
//! groups: what each attribute is, who may set it, how it is checked,
//! canonicalized and compared.
//!
//! # Core Concepts
//!
//! - [`AttributeDefinition`]: One field with kind, presence and constraints
//! - [`SchemaVersion`]: Immutable, ordered set of definitions
//! - [`SchemaRegistry`]: Every version of a resource; the highest is current
//! - [`Validator`], [`Normalizer`], [`DiffSuppressor`]: Named strategies
//!   attached to definitions
//!
//! Validation is a complete pass: every violation is collected into a
//! [`ValidationReport`].
//!
//! # Example
//!
//! ```rust
//! use cachegroup_schema::{SchemaRegistry, Violation};
//! use cachegroup_value::{AttributeMap, Value};
//!
//! let registry = SchemaRegistry::replication_group().unwrap();
//! let config = AttributeMap::new()
//!     .with("replication_group_id", "cache-01")
//!     .with("auth_token", "0123456789abcdef")
//!     .with("user_group_ids", Value::string_set(["default"]));
//!
//! let report = registry.validate(&config).unwrap_err();
//! assert!(matches!(
//!     report.violations(),
//!     [Violation::ConflictViolation { .. }]
//! ));
//! ```

#![warn(unreachable_pub)]

mod attribute;
mod error;
mod normalizer;
mod registry;
mod schema;
mod suppress;
mod validator;

pub mod replication_group;

// Re-exports
pub use attribute::{AttributeDefinition, AttributeSummary, ElementSchema, Presence};
pub use error::{SchemaError, ValidationReport, Violation};
pub use normalizer::{LowerCase, Normalizer};
pub use registry::SchemaRegistry;
pub use schema::{SchemaBuilder, SchemaVersion, REDACTED};
pub use suppress::{DiffSuppressor, OldHasPrefix, UnsetDefaultPort};
pub use validator::{
    Arn, DailyWindow, ExcludesChars, IntAtMost, LengthBetween, NotEmpty, OneOf, RedisVersion,
    ReplicationGroupId, Validator, WeeklyWindow,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
