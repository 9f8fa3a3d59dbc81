//! Provider contract

use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use resource_spec::{DependentResourceSpec, ResourceGroupSpec, ResourceId};
use serde::{Deserialize, Serialize};

/// Handle for a resource the provider finished creating
#[derive(Debug, Clone)]
pub struct ProvisionedResource {
    pub id: ResourceId,
    pub name: String,
    /// Raw provider properties, unused by the workflow
    pub properties: serde_json::Value,
}

/// Name and permission of a storage account access key.
///
/// The key material itself is never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    pub key_name: String,
    pub permissions: String,
}

/// A control-plane audit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub event_timestamp: DateTime<Utc>,
    pub operation_name: String,
    pub resource_id: String,
    pub category: Option<String>,
    pub caller: Option<String>,
    pub status: Option<String>,
}

/// Activity log lookup for one operation on one resource
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLogQuery {
    pub resource_id: ResourceId,
    pub operation_name: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ActivityLogQuery {
    /// Window ending now and reaching back `window`, clamped to the earliest representable time
    pub fn look_back(resource_id: ResourceId, operation_name: &str, window: Duration) -> Self {
        let to = Utc::now();
        Self {
            resource_id,
            operation_name: operation_name.to_string(),
            from: to.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC),
            to,
        }
    }

    /// Whether `entry` is inside the window and matches both operation and resource.
    ///
    /// Operation names and resource ids compare case-insensitively, as the
    /// activity log does not preserve casing.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        entry.event_timestamp >= self.from
            && entry.event_timestamp <= self.to
            && entry.operation_name.eq_ignore_ascii_case(&self.operation_name)
            && entry.resource_id.eq_ignore_ascii_case(self.resource_id.as_str())
    }
}

/// Control-plane operations used by the provisioning workflow.
///
/// Implementations wait for long-running operations to reach a terminal
/// state before returning.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Create or update the anchor resource group
    async fn create_resource_group(
        &self,
        spec: &ResourceGroupSpec,
    ) -> Result<ProvisionedResource, ProviderError>;

    /// Create or update a resource inside `group`
    async fn create_or_update(
        &self,
        group: &ResourceId,
        spec: &DependentResourceSpec,
    ) -> Result<ProvisionedResource, ProviderError>;

    /// Delete a resource and everything it contains
    async fn delete(&self, id: &ResourceId) -> Result<(), ProviderError>;

    /// List access keys of a storage account
    async fn list_storage_keys(&self, account: &ResourceId) -> Result<Vec<StorageKey>, ProviderError>;

    /// Activity log entries recorded for the query's resource and window
    async fn query_activity_log(&self, query: &ActivityLogQuery) -> Result<Vec<LogEntry>, ProviderError>;
}
