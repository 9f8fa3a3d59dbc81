//! In-memory provider
//!
//! Resolves every call immediately, records what was asked of it and can be
//! told to fail or hang on specific steps.

use crate::error::ProviderError;
use crate::provider::{ActivityLogQuery, LogEntry, ProvisionedResource, ResourceProvider, StorageKey};
use async_trait::async_trait;
use chrono::Utc;
use resource_spec::{
    DependentResourceSpec, ResourceGroupSpec, ResourceId, ResourceKind, LIST_KEYS_OPERATION,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::debug;

/// A call received by [`MockProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    CreateOrUpdate { kind: ResourceKind, name: String },
    Delete(ResourceId),
    ListStorageKeys(ResourceId),
    QueryActivityLog(ResourceId),
}

#[derive(Debug, Default)]
struct Behavior {
    create_failures: HashMap<ResourceKind, String>,
    hangs: HashSet<ResourceKind>,
    panics: HashSet<ResourceKind>,
    delete_failure: Option<String>,
    list_keys_failure: Option<String>,
    activity_log_failure: Option<String>,
    /// Key listings are not written to the activity log
    log_lag: bool,
}

/// Scriptable in-memory provider
#[derive(Debug)]
pub struct MockProvider {
    subscription_id: String,
    behavior: Behavior,
    calls: Mutex<Vec<ProviderCall>>,
    activity_log: Mutex<Vec<LogEntry>>,
}

impl MockProvider {
    pub fn new(subscription_id: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            behavior: Behavior::default(),
            calls: Mutex::new(Vec::new()),
            activity_log: Mutex::new(Vec::new()),
        }
    }

    /// Fail every create of `kind`
    pub fn fail_on(mut self, kind: ResourceKind, message: &str) -> Self {
        self.behavior.create_failures.insert(kind, message.to_string());
        self
    }

    /// Never complete a create of `kind`
    pub fn hang_on(mut self, kind: ResourceKind) -> Self {
        self.behavior.hangs.insert(kind);
        self
    }

    /// Panic inside every create of `kind`
    pub fn panic_on(mut self, kind: ResourceKind) -> Self {
        self.behavior.panics.insert(kind);
        self
    }

    pub fn fail_delete(mut self, message: &str) -> Self {
        self.behavior.delete_failure = Some(message.to_string());
        self
    }

    pub fn fail_list_keys(mut self, message: &str) -> Self {
        self.behavior.list_keys_failure = Some(message.to_string());
        self
    }

    pub fn fail_activity_log(mut self, message: &str) -> Self {
        self.behavior.activity_log_failure = Some(message.to_string());
        self
    }

    /// Simulate activity log ingestion delay: key listings never show up
    pub fn with_log_lag(mut self) -> Self {
        self.behavior.log_lag = true;
        self
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().expect("mock provider lock poisoned").clone()
    }

    /// Targets of every delete call received so far
    pub fn deletes(&self) -> Vec<ResourceId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        debug!("Mock provider call: {:?}", call);
        self.calls.lock().expect("mock provider lock poisoned").push(call);
    }

    async fn create(&self, kind: ResourceKind, name: &str, id: String) -> Result<ProvisionedResource, ProviderError> {
        self.record(ProviderCall::CreateOrUpdate {
            kind,
            name: name.to_string(),
        });

        if self.behavior.hangs.contains(&kind) {
            std::future::pending::<()>().await;
        }
        if self.behavior.panics.contains(&kind) {
            panic!("mock provider panicked creating {}", kind);
        }
        if let Some(message) = self.behavior.create_failures.get(&kind) {
            return Err(ProviderError::Simulated(message.clone()));
        }

        Ok(ProvisionedResource {
            id: ResourceId::new(id),
            name: name.to_string(),
            properties: serde_json::json!({ "provisioningState": "Succeeded" }),
        })
    }

    fn group_id(&self, name: &str) -> String {
        format!("/subscriptions/{}/resourceGroups/{}", self.subscription_id, name)
    }
}

#[async_trait]
impl ResourceProvider for MockProvider {
    async fn create_resource_group(
        &self,
        spec: &ResourceGroupSpec,
    ) -> Result<ProvisionedResource, ProviderError> {
        let id = self.group_id(&spec.name);
        self.create(ResourceKind::ResourceGroup, &spec.name, id).await
    }

    async fn create_or_update(
        &self,
        group: &ResourceId,
        spec: &DependentResourceSpec,
    ) -> Result<ProvisionedResource, ProviderError> {
        let kind = spec.kind();
        let id = format!("{}/providers/{}/{}", group, kind.resource_type(), spec.name());
        self.create(kind, spec.name(), id).await
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), ProviderError> {
        self.record(ProviderCall::Delete(id.clone()));
        match &self.behavior.delete_failure {
            Some(message) => Err(ProviderError::Simulated(message.clone())),
            None => Ok(()),
        }
    }

    async fn list_storage_keys(&self, account: &ResourceId) -> Result<Vec<StorageKey>, ProviderError> {
        self.record(ProviderCall::ListStorageKeys(account.clone()));
        if let Some(message) = &self.behavior.list_keys_failure {
            return Err(ProviderError::Simulated(message.clone()));
        }

        if !self.behavior.log_lag {
            self.activity_log
                .lock()
                .expect("mock provider lock poisoned")
                .push(LogEntry {
                    event_timestamp: Utc::now(),
                    operation_name: LIST_KEYS_OPERATION.to_string(),
                    resource_id: account.to_string(),
                    category: Some("Administrative".to_string()),
                    caller: Some("mock-provider".to_string()),
                    status: Some("Succeeded".to_string()),
                });
        }

        Ok(["key1", "key2"]
            .iter()
            .map(|name| StorageKey {
                key_name: name.to_string(),
                permissions: "FULL".to_string(),
            })
            .collect())
    }

    async fn query_activity_log(&self, query: &ActivityLogQuery) -> Result<Vec<LogEntry>, ProviderError> {
        self.record(ProviderCall::QueryActivityLog(query.resource_id.clone()));
        if let Some(message) = &self.behavior.activity_log_failure {
            return Err(ProviderError::Simulated(message.clone()));
        }

        Ok(self
            .activity_log
            .lock()
            .expect("mock provider lock poisoned")
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use resource_spec::Region;

    fn group_spec() -> ResourceGroupSpec {
        ResourceGroupSpec {
            name: "rg1".to_string(),
            region: Region::new("eastus2").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_group_id_shape() {
        let provider = MockProvider::new("sub");
        let group = provider.create_resource_group(&group_spec()).await.unwrap();
        assert_eq!(group.id.as_str(), "/subscriptions/sub/resourceGroups/rg1");
        assert_eq!(
            provider.calls(),
            vec![ProviderCall::CreateOrUpdate {
                kind: ResourceKind::ResourceGroup,
                name: "rg1".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let provider = MockProvider::new("sub").fail_on(ResourceKind::ResourceGroup, "quota exceeded");
        let err = provider.create_resource_group(&group_spec()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Simulated(ref m) if m == "quota exceeded"));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_key_listing_is_logged() {
        let provider = MockProvider::new("sub");
        let account = ResourceId::new("/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/sa1");
        let keys = provider.list_storage_keys(&account).await.unwrap();
        assert_eq!(keys.len(), 2);

        let query = ActivityLogQuery::look_back(account, LIST_KEYS_OPERATION, Duration::days(7));
        assert_eq!(provider.query_activity_log(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_log_lag_hides_key_listing() {
        let provider = MockProvider::new("sub").with_log_lag();
        let account = ResourceId::new("/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/sa1");
        provider.list_storage_keys(&account).await.unwrap();

        let query = ActivityLogQuery::look_back(account, LIST_KEYS_OPERATION, Duration::days(7));
        assert!(provider.query_activity_log(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_recorded_even_when_failing() {
        let provider = MockProvider::new("sub").fail_delete("locked");
        let id = ResourceId::new("/subscriptions/sub/resourceGroups/rg1");
        assert!(provider.delete(&id).await.is_err());
        assert_eq!(provider.deletes(), vec![id]);
    }
}
