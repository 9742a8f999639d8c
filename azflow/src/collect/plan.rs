//! Which entity kinds a run collects.

use crate::core::EntityKind;
use crate::errors::{AzflowError, Result};
use std::collections::BTreeSet;

/// The set of kinds a run emits.
///
/// Ancestors of an emitted kind are still listed to drive the dependent
/// listings, but their own records are not emitted unless they are in the
/// set as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionPlan {
    kinds: BTreeSet<EntityKind>,
}

impl CollectionPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans exactly `kinds`.
    pub fn from_kinds(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Every Entra ID kind.
    #[must_use]
    pub fn azure_ad() -> Self {
        Self::from_kinds(EntityKind::ALL.into_iter().filter(|kind| !kind.is_resource_manager()))
    }

    /// Every Resource Manager kind.
    #[must_use]
    pub fn azure_rm() -> Self {
        Self::from_kinds(EntityKind::ALL.into_iter().filter(EntityKind::is_resource_manager))
    }

    /// Only virtual machine contributors.
    #[must_use]
    pub fn vm_contributors() -> Self {
        Self::from_kinds([EntityKind::VirtualMachineContributor])
    }

    /// Every kind.
    #[must_use]
    pub fn all() -> Self {
        Self::from_kinds(EntityKind::ALL)
    }

    /// Adds a kind.
    #[must_use]
    pub fn with(mut self, kind: EntityKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    /// Returns true if records of `kind` are emitted.
    #[must_use]
    pub fn contains(&self, kind: EntityKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Returns true if `kind` must be listed, for itself or a descendant.
    #[must_use]
    pub fn requires(&self, kind: EntityKind) -> bool {
        self.contains(kind) || kind.children().any(|child| self.requires(child))
    }

    /// Returns how many consumers read the stream of `kind`.
    ///
    /// One for its own output when emitted, plus one per required child.
    /// Zero means the kind is not listed at all; one means its stream is
    /// consumed directly without a tee.
    #[must_use]
    pub fn branches(&self, kind: EntityKind) -> usize {
        usize::from(self.contains(kind)) + kind.children().filter(|child| self.requires(*child)).count()
    }

    /// Returns the emitted kinds in order.
    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Number of emitted kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if nothing is emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Rejects plans that would collect nothing.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(AzflowError::Config("collection plan names no entity kinds".into()));
        }
        Ok(())
    }
}

impl FromIterator<EntityKind> for CollectionPlan {
    fn from_iter<I: IntoIterator<Item = EntityKind>>(iter: I) -> Self {
        Self::from_kinds(iter)
    }
}
