//! Upgrade steps
//!
//! Provides the [`UpgradeStep`] trait and [`VersionStep`], a declarative
//! step built from a list of [`StateOp`]s.

use std::fmt;

use cachegroup_value::{StateSnapshot, Value};

use crate::error::UpgradeError;

/// Pure transformation of a snapshot from version N to N+1
///
/// Steps must be total and deterministic, must not drop keys that still
/// exist in N+1, and must tolerate missing optional keys.
pub trait UpgradeStep: Send + Sync + fmt::Debug {
    /// Version this step upgrades from
    fn from_version(&self) -> u32;

    /// Short description for logs
    fn name(&self) -> &str;

    /// Apply the step
    ///
    /// # Errors
    /// Returns [`UpgradeError`] when the input cannot be upgraded.
    fn upgrade(&self, state: StateSnapshot) -> Result<StateSnapshot, UpgradeError>;
}

/// How [`StateOp::SetDefault`] treats an existing value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Always write the default
    Overwrite,
    /// Write only when the key is absent
    IfAbsent,
}

/// One state edit
#[derive(Debug, Clone, PartialEq)]
pub enum StateOp {
    /// Move a value to a new key; absent source is a no-op
    Rename {
        /// Old key
        from: String,
        /// New key
        to: String,
    },

    /// Drop a key
    Remove {
        /// Key to drop
        key: String,
    },

    /// Write an explicit default
    SetDefault {
        /// Key to write
        key: String,
        /// Default value
        value: Value,
        /// Treatment of an existing value
        mode: WriteMode,
    },
}

impl StateOp {
    /// Create a rename
    #[must_use]
    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Rename {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a removal
    #[must_use]
    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    /// Create a default write
    #[must_use]
    pub fn set_default(key: impl Into<String>, value: impl Into<Value>, mode: WriteMode) -> Self {
        Self::SetDefault {
            key: key.into(),
            value: value.into(),
            mode,
        }
    }
}

/// Declarative upgrade step
///
/// Ops run in order; the first failing op aborts the step.
#[derive(Debug, Clone)]
pub struct VersionStep {
    from_version: u32,
    name: String,
    ops: Vec<StateOp>,
}

impl VersionStep {
    /// Create an empty step
    #[must_use]
    pub fn new(from_version: u32, name: impl Into<String>) -> Self {
        Self {
            from_version,
            name: name.into(),
            ops: Vec::new(),
        }
    }

    /// Append an op
    #[inline]
    #[must_use]
    pub fn with_op(mut self, op: StateOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Ops in application order
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[StateOp] {
        &self.ops
    }

    fn apply(&self, op: &StateOp, state: &mut StateSnapshot) -> Result<(), UpgradeError> {
        match op {
            StateOp::Rename { from, to } => {
                if !state.contains_key(from) {
                    return Ok(());
                }
                if state.contains_key(to) {
                    return Err(UpgradeError::RenameCollision {
                        version: self.from_version,
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
                if let Some(value) = state.remove(from) {
                    state.insert(to.as_str(), value);
                }
            }
            StateOp::Remove { key } => {
                state.remove(key);
            }
            StateOp::SetDefault { key, value, mode } => {
                if let Some(existing) = state.get(key) {
                    if existing.kind() != value.kind() {
                        return Err(UpgradeError::MalformedUpgradeInput {
                            version: self.from_version,
                            attribute: key.clone(),
                            expected: value.kind(),
                            found: existing.kind(),
                        });
                    }
                    if *mode == WriteMode::IfAbsent {
                        return Ok(());
                    }
                    if existing != value {
                        tracing::warn!(
                            attribute = %key,
                            version = self.from_version,
                            "overwriting existing value with upgrade default"
                        );
                    }
                }
                state.insert(key.as_str(), value.clone());
            }
        }
        Ok(())
    }
}

impl UpgradeStep for VersionStep {
    fn from_version(&self) -> u32 {
        self.from_version
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn upgrade(&self, mut state: StateSnapshot) -> Result<StateSnapshot, UpgradeError> {
        for op in &self.ops {
            self.apply(op, &mut state)?;
        }
        Ok(state)
    }
}
