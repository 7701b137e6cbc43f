//! Upgrade errors

use cachegroup_value::ValueKind;

/// Errors raised while upgrading a state snapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    /// Target version is older than the recorded one
    #[error("cannot downgrade state from version {from} to {to}")]
    UnsupportedDowngrade {
        /// Recorded version
        from: u32,
        /// Requested version
        to: u32,
    },

    /// A present key has a kind the step cannot handle
    #[error("malformed state at version {version}: '{attribute}' expected {expected}, found {found}")]
    MalformedUpgradeInput {
        /// Version the failing step upgrades from
        version: u32,
        /// Offending key
        attribute: String,
        /// Kind the step requires
        expected: ValueKind,
        /// Kind found in the snapshot
        found: ValueKind,
    },

    /// No step covers a needed version boundary
    #[error("no upgrade step registered from version {version}")]
    MissingStep {
        /// Version without an outgoing step
        version: u32,
    },

    /// Two steps registered for one boundary
    #[error("upgrade step from version {version} registered twice")]
    DuplicateStep {
        /// Version of the boundary
        version: u32,
    },

    /// Step would upgrade past the last representable version
    #[error("upgrade step from version {version} has no representable target version")]
    StepOutOfRange {
        /// Version the step upgrades from
        version: u32,
    },

    /// Rename target already holds a value
    #[error("cannot rename '{from}' to '{to}' at version {version}: target already present")]
    RenameCollision {
        /// Version the failing step upgrades from
        version: u32,
        /// Source key
        from: String,
        /// Target key
        to: String,
    },
}
