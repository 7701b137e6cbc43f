//! Cache Group State Upgrades
//!
//! Forward-only migration of persisted resource state between schema
//! versions.
//!
//! # Core Concepts
//!
//! - [`UpgradeStep`]: Pure transformation from version N to N+1
//! - [`VersionStep`]: Declarative step built from [`StateOp`]s
//! - [`UpgradeChain`]: Composes steps; fails fast on the first error
//!
//! # Laws
//!
//! - Identity: `upgrade(s, n, n) == s`
//! - Composition: `upgrade(s, a, c) == upgrade(upgrade(s, a, b), b, c)`
//! - Downgrades are rejected
//!
//! # Example
//!
//! ```rust
//! use cachegroup_upgrade::UpgradeChain;
//! use cachegroup_value::{AttributeMap, Value};
//!
//! let chain = UpgradeChain::replication_group().unwrap();
//! let v1 = AttributeMap::new().with("replication_group_id", "cache-01");
//! let v2 = chain.upgrade(&v1, 1, 2).unwrap();
//!
//! assert_eq!(
//!     v2.get("auth_token_update_strategy"),
//!     Some(&Value::string("ROTATE"))
//! );
//! ```

#![warn(unreachable_pub)]

mod chain;
mod error;
mod step;

pub mod replication_group;

// Re-exports
pub use chain::{UpgradeChain, VersionedSnapshot};
pub use error::UpgradeError;
pub use step::{StateOp, UpgradeStep, VersionStep, WriteMode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
