//! Resource identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier returned by the provider for a created resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, which is the resource name for ARM-style ids
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kinds of resources the chain creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ResourceGroup,
    StorageAccount,
    ActionGroup,
    ActivityLogAlert,
}

impl ResourceKind {
    /// Provider resource type namespace
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "Microsoft.Resources/resourceGroups",
            Self::StorageAccount => "Microsoft.Storage/storageAccounts",
            Self::ActionGroup => "Microsoft.Insights/actionGroups",
            Self::ActivityLogAlert => "Microsoft.Insights/activityLogAlerts",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceGroup => "resource group",
            Self::StorageAccount => "storage account",
            Self::ActionGroup => "action group",
            Self::ActivityLogAlert => "activity log alert",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
