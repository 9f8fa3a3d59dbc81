//! Anchor ownership
//!
//! The resource group is the anchor: deleting it removes everything
//! created inside it. Ownership is an explicit state set at the moment the
//! group is created, never inferred from which error ended the run.

use resource_spec::{Region, ResourceId};

/// A resource group the provider confirmed as created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAnchor {
    pub id: ResourceId,
    pub name: String,
    pub region: Region,
}

/// Holds the anchor once created; empty until then
#[derive(Debug, Default)]
pub struct AnchorSlot {
    owned: Option<CreatedAnchor>,
}

impl AnchorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a freshly created anchor
    pub(crate) fn acquire(&mut self, anchor: CreatedAnchor) {
        debug_assert!(self.owned.is_none(), "anchor acquired twice");
        self.owned = Some(anchor);
    }

    pub fn owned(&self) -> Option<&CreatedAnchor> {
        self.owned.as_ref()
    }

    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    /// Give up ownership, leaving the slot empty
    pub(crate) fn take(&mut self) -> Option<CreatedAnchor> {
        self.owned.take()
    }
}
