//! Cache Group Value Model
//!
//! Typed attribute values shared by the schema registry and the state
//! upgrade chain.
//!
//! # Core Concepts
//!
//! - [`Value`]: Tagged union over every attribute kind
//! - [`ValueKind`]: The kind tag, used for mismatch diagnostics
//! - [`NullableBool`]: Tri-state boolean (`True`/`False`/`Unset`)
//! - [`AttributeMap`]: Attribute name → value mapping (configs and snapshots)
//!
//! JSON is only touched at the edge: [`Value::from_json`] and
//! [`Value::to_json`] convert between the wire form and the typed model.
//!
//! # Example
//!
//! ```rust
//! use cachegroup_value::{AttributeMap, NullableBool, Value};
//!
//! let state = AttributeMap::new()
//!     .with("replication_group_id", "cache-01")
//!     .with("auto_minor_version_upgrade", NullableBool::Unset)
//!     .with("port", 6379);
//!
//! assert_eq!(state.get("port"), Some(&Value::Int(6379)));
//! assert!(!state.is_set("auto_minor_version_upgrade"));
//! ```

#![warn(unreachable_pub)]

mod json;
mod map;
mod nullable;
mod value;

// Re-exports
pub use json::{json_type_name, ValueError};
pub use map::{AttributeMap, StateSnapshot};
pub use nullable::NullableBool;
pub use value::{Object, Value, ValueKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
