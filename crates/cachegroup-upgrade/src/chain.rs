//! Upgrade chain
//!
//! Provides [`UpgradeChain`], which composes registered steps into a
//! forward-only upgrade between any two versions, and [`VersionedSnapshot`]
//! for callers that keep the version tag next to the state.

use std::collections::BTreeMap;

use cachegroup_value::StateSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::UpgradeError;
use crate::step::UpgradeStep;

/// Ordered set of upgrade steps, at most one per version boundary
#[derive(Debug, Default)]
pub struct UpgradeChain {
    steps: BTreeMap<u32, Box<dyn UpgradeStep>>,
}

impl UpgradeChain {
    /// Create an empty chain
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step
    ///
    /// # Errors
    /// - [`UpgradeError::StepOutOfRange`] for a step from `u32::MAX`
    /// - [`UpgradeError::DuplicateStep`] if the boundary is taken
    pub fn register(&mut self, step: impl UpgradeStep + 'static) -> Result<(), UpgradeError> {
        let version = step.from_version();
        if version == u32::MAX {
            return Err(UpgradeError::StepOutOfRange { version });
        }
        if self.steps.contains_key(&version) {
            return Err(UpgradeError::DuplicateStep { version });
        }
        self.steps.insert(version, Box::new(step));
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn with_step(mut self, step: impl UpgradeStep + 'static) -> Result<Self, UpgradeError> {
        self.register(step)?;
        Ok(self)
    }

    /// Number of registered steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Highest version reachable from the oldest registered step
    ///
    /// `None` for an empty chain.
    #[must_use]
    pub fn current_version(&self) -> Option<u32> {
        let mut versions = self.steps.keys().copied();
        let mut reached = versions.next()?.checked_add(1)?;
        for version in versions {
            match reached.checked_add(1) {
                Some(next) if version == reached => reached = next,
                _ => break,
            }
        }
        Some(reached)
    }

    /// Upgrade `state` from version `from` to version `to`
    ///
    /// Steps run strictly in order, each consuming the previous output. The
    /// input is never modified.
    ///
    /// # Errors
    /// - [`UpgradeError::UnsupportedDowngrade`] when `from > to`
    /// - [`UpgradeError::MissingStep`] when a boundary has no step
    /// - the first error returned by a step
    pub fn upgrade(
        &self,
        state: &StateSnapshot,
        from: u32,
        to: u32,
    ) -> Result<StateSnapshot, UpgradeError> {
        if from > to {
            return Err(UpgradeError::UnsupportedDowngrade { from, to });
        }
        if let Some(version) = (from..to).find(|v| !self.steps.contains_key(v)) {
            return Err(UpgradeError::MissingStep { version });
        }

        (from..to).try_fold(state.clone(), |current, version| {
            let step = self
                .steps
                .get(&version)
                .ok_or(UpgradeError::MissingStep { version })?;

            tracing::debug!(
                step = step.name(),
                from = version,
                to = version + 1,
                attributes = current.len(),
                "applying upgrade step"
            );
            step.upgrade(current)
        })
    }
}

/// State snapshot tagged with the schema version it was recorded under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedSnapshot {
    /// Schema version
    pub version: u32,
    /// Attribute values
    pub state: StateSnapshot,
}

impl VersionedSnapshot {
    /// Tag a snapshot
    #[inline]
    #[must_use]
    pub fn new(version: u32, state: StateSnapshot) -> Self {
        Self { version, state }
    }

    /// Upgrade to `version` through `chain`
    ///
    /// # Errors
    /// Same as [`UpgradeChain::upgrade`].
    pub fn upgrade_to(&self, chain: &UpgradeChain, version: u32) -> Result<Self, UpgradeError> {
        let state = chain.upgrade(&self.state, self.version, version)?;
        Ok(Self { version, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{StateOp, VersionStep, WriteMode};
    use cachegroup_value::{AttributeMap, Value};
    use pretty_assertions::assert_eq;

    fn marker(from: u32) -> VersionStep {
        VersionStep::new(from, format!("mark v{from}"))
            .with_op(StateOp::set_default(format!("v{}", from + 1), true, WriteMode::IfAbsent))
    }

    fn chain() -> UpgradeChain {
        UpgradeChain::new()
            .with_step(marker(1))
            .and_then(|c| c.with_step(marker(2)))
            .and_then(|c| c.with_step(marker(3)))
            .unwrap()
    }

    #[test]
    fn applies_steps_in_order() {
        let out = chain().upgrade(&AttributeMap::new(), 1, 4).unwrap();
        assert_eq!(
            out,
            AttributeMap::new()
                .with("v2", true)
                .with("v3", true)
                .with("v4", true)
        );
    }

    #[test]
    fn identity_when_versions_match() {
        let state = AttributeMap::new().with("k", "v");
        assert_eq!(chain().upgrade(&state, 3, 3).unwrap(), state);
        assert_eq!(UpgradeChain::new().upgrade(&state, 9, 9).unwrap(), state);
    }

    #[test]
    fn rejects_downgrade() {
        let err = chain().upgrade(&AttributeMap::new(), 3, 2).unwrap_err();
        assert_eq!(err, UpgradeError::UnsupportedDowngrade { from: 3, to: 2 });
    }

    #[test]
    fn reports_missing_step() {
        let err = chain().upgrade(&AttributeMap::new(), 2, 6).unwrap_err();
        assert_eq!(err, UpgradeError::MissingStep { version: 4 });
    }

    #[test]
    fn rejects_duplicate_step() {
        let err = chain().with_step(marker(2)).unwrap_err();
        assert_eq!(err, UpgradeError::DuplicateStep { version: 2 });
    }

    #[test]
    fn current_version_follows_contiguous_steps() {
        assert_eq!(UpgradeChain::new().current_version(), None);
        assert_eq!(chain().current_version(), Some(4));

        let gapped = chain().with_step(marker(7)).unwrap();
        assert_eq!(gapped.current_version(), Some(4));
    }

    #[test]
    fn rejects_step_from_last_version() {
        let err = UpgradeChain::new()
            .with_step(VersionStep::new(u32::MAX, "last"))
            .unwrap_err();
        assert_eq!(err, UpgradeError::StepOutOfRange { version: u32::MAX });

        let top = UpgradeChain::new()
            .with_step(VersionStep::new(u32::MAX - 1, "top"))
            .unwrap();
        assert_eq!(top.current_version(), Some(u32::MAX));
        assert_eq!(
            top.upgrade(&AttributeMap::new(), u32::MAX - 1, u32::MAX).unwrap(),
            AttributeMap::new()
        );
    }

    #[test]
    fn step_failure_aborts_chain() {
        let chain = UpgradeChain::new()
            .with_step(marker(1))
            .and_then(|c| {
                c.with_step(
                    VersionStep::new(2, "strict")
                        .with_op(StateOp::set_default("v2", "text", WriteMode::Overwrite)),
                )
            })
            .unwrap();

        let err = chain.upgrade(&AttributeMap::new(), 1, 3).unwrap_err();
        assert!(matches!(err, UpgradeError::MalformedUpgradeInput { version: 2, .. }));
    }

    #[test]
    fn versioned_snapshot_upgrade() {
        let snapshot = VersionedSnapshot::new(1, AttributeMap::new().with("k", Value::Int(1)));
        let upgraded = snapshot.upgrade_to(&chain(), 3).unwrap();

        assert_eq!(upgraded.version, 3);
        assert_eq!(upgraded.state.get("k"), Some(&Value::Int(1)));
        assert_eq!(snapshot.version, 1);
    }
}
