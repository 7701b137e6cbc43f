//! Replication group state upgrades

use crate::chain::UpgradeChain;
use crate::error::UpgradeError;
use crate::step::{StateOp, VersionStep, WriteMode};

/// State version written by the current schema
pub const STATE_VERSION: u32 = 2;

/// v1 → v2: record the auth token update strategy
///
/// Version 1 had no such attribute, so every upgraded state gets the
/// `ROTATE` default, replacing whatever a partially written state held.
#[must_use]
pub fn v1_to_v2() -> VersionStep {
    VersionStep::new(1, "set auth_token_update_strategy").with_op(StateOp::set_default(
        "auth_token_update_strategy",
        "ROTATE",
        WriteMode::Overwrite,
    ))
}

impl UpgradeChain {
    /// Chain of the replication group resource
    ///
    /// # Errors
    /// Fails only if two built-in steps share a boundary.
    pub fn replication_group() -> Result<Self, UpgradeError> {
        Self::new().with_step(v1_to_v2())
    }
}
