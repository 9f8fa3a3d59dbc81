//! Azure Resource Manager provider
//!
//! Thin REST client over the management endpoint. Requests are
//! authenticated with a client-secret token, long-running operations are
//! awaited through [`lro`] before a call returns.

mod activity;
mod body;
mod lro;

use crate::auth::{ClientSecretCredential, Credentials};
use crate::error::ProviderError;
use crate::provider::{ActivityLogQuery, LogEntry, ProvisionedResource, ResourceProvider, StorageKey};
use async_trait::async_trait;
use lro::Poller;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{RequestBuilder, Response};
use resource_spec::{DependentResourceSpec, ResourceGroupSpec, ResourceId, ResourceKind};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const RESOURCE_GROUP_API_VERSION: &str = "2021-04-01";
const STORAGE_API_VERSION: &str = "2023-01-01";
const ACTION_GROUP_API_VERSION: &str = "2023-01-01";
const ACTIVITY_LOG_ALERT_API_VERSION: &str = "2020-10-01";
const ACTIVITY_LOG_API_VERSION: &str = "2015-04-01";

fn api_version(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::ResourceGroup => RESOURCE_GROUP_API_VERSION,
        ResourceKind::StorageAccount => STORAGE_API_VERSION,
        ResourceKind::ActionGroup => ACTION_GROUP_API_VERSION,
        ResourceKind::ActivityLogAlert => ACTIVITY_LOG_ALERT_API_VERSION,
    }
}

/// Infer the resource kind from an ARM id, defaulting to a resource group
fn kind_of(id: &ResourceId) -> ResourceKind {
    let id = id.as_str().to_ascii_lowercase();
    [
        ResourceKind::StorageAccount,
        ResourceKind::ActionGroup,
        ResourceKind::ActivityLogAlert,
    ]
    .into_iter()
    .find(|kind| id.contains(&kind.resource_type().to_ascii_lowercase()))
    .unwrap_or(ResourceKind::ResourceGroup)
}

/// Endpoints and polling cadence
#[derive(Debug, Clone)]
pub struct ArmOptions {
    pub management_endpoint: String,
    pub authority_host: String,
    /// Delay between polls when the service sends no Retry-After
    pub poll_interval: Duration,
}

impl Default for ArmOptions {
    fn default() -> Self {
        Self {
            management_endpoint: "https://management.azure.com".to_string(),
            authority_host: "https://login.microsoftonline.com".to_string(),
            poll_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListKeysResponse {
    #[serde(default)]
    keys: Vec<KeyData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyData {
    key_name: String,
    #[serde(default)]
    permissions: String,
}

/// Azure Resource Manager implementation of [`ResourceProvider`]
pub struct ArmProvider {
    http: reqwest::Client,
    credential: ClientSecretCredential,
    subscription_id: String,
    endpoint: String,
    poll_interval: Duration,
}

impl ArmProvider {
    pub fn new(credentials: &Credentials, options: ArmOptions) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("security-alert-demo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            "ARM provider for subscription {} via {}",
            credentials.subscription_id, options.management_endpoint
        );

        Ok(Self {
            http,
            credential: ClientSecretCredential::new(&options.authority_host, credentials),
            subscription_id: credentials.subscription_id.clone(),
            endpoint: options.management_endpoint.trim_end_matches('/').to_string(),
            poll_interval: options.poll_interval,
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn resource_url(&self, id: &str) -> String {
        format!("{}{}", self.endpoint, id)
    }

    /// Authenticate and send a request, turning error statuses into [`ProviderError::Api`]
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let token = self.credential.token(&self.http).await?;
        let request = request.bearer_auth(token).build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();
        debug!("{} {}", method, url);

        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let (code, message) = match response.json::<ErrorResponse>().await {
            Ok(body) => (body.error.code, body.error.message),
            Err(_) => (
                status.canonical_reason().unwrap_or("Unknown").to_string(),
                String::new(),
            ),
        };
        Err(ProviderError::Api {
            method,
            url,
            status: status.as_u16(),
            code,
            message,
        })
    }

    pub(crate) async fn get(&self, url: &str) -> Result<Response, ProviderError> {
        self.send(self.http.get(url)).await
    }

    /// PUT a resource body and wait for the provider to finish provisioning it
    async fn put_resource(
        &self,
        url: &str,
        api_version: &str,
        body: Value,
    ) -> Result<ProvisionedResource, ProviderError> {
        let response = self
            .send(self.http.put(url).query(&[("api-version", api_version)]).json(&body))
            .await?;

        let value: Value = match Poller::from_response(&response, self.poll_interval) {
            Some(poller) => {
                poller.wait(self).await?;
                self.send(self.http.get(url).query(&[("api-version", api_version)]))
                    .await?
                    .json()
                    .await?
            }
            None => response.json().await?,
        };

        provisioned(value)
    }
}

/// Keep the id and name of a resource body, carrying properties along
fn provisioned(mut value: Value) -> Result<ProvisionedResource, ProviderError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::InvalidResponse("resource body has no id".to_string()))?
        .to_string();
    let id = ResourceId::new(id);
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| id.name().to_string());
    let properties = value
        .get_mut("properties")
        .map(Value::take)
        .unwrap_or(Value::Null);

    Ok(ProvisionedResource { id, name, properties })
}

#[async_trait]
impl ResourceProvider for ArmProvider {
    async fn create_resource_group(
        &self,
        spec: &ResourceGroupSpec,
    ) -> Result<ProvisionedResource, ProviderError> {
        let url = self.resource_url(&format!(
            "/subscriptions/{}/resourcegroups/{}",
            self.subscription_id, spec.name
        ));
        self.put_resource(&url, RESOURCE_GROUP_API_VERSION, body::resource_group(spec))
            .await
    }

    async fn create_or_update(
        &self,
        group: &ResourceId,
        spec: &DependentResourceSpec,
    ) -> Result<ProvisionedResource, ProviderError> {
        let kind = spec.kind();
        let url = self.resource_url(&format!(
            "{}/providers/{}/{}",
            group,
            kind.resource_type(),
            spec.name()
        ));
        self.put_resource(&url, api_version(kind), body::dependent(spec))
            .await
    }

    async fn delete(&self, id: &ResourceId) -> Result<(), ProviderError> {
        let url = self.resource_url(id.as_str());
        let response = self
            .send(self.http.delete(&url).query(&[("api-version", api_version(kind_of(id)))]))
            .await?;

        if let Some(poller) = Poller::from_response(&response, self.poll_interval) {
            poller.wait(self).await?;
        }
        Ok(())
    }

    async fn list_storage_keys(&self, account: &ResourceId) -> Result<Vec<StorageKey>, ProviderError> {
        let url = self.resource_url(&format!("{}/listKeys", account));
        let response: ListKeysResponse = self
            .send(
                self.http
                    .post(&url)
                    .query(&[("api-version", STORAGE_API_VERSION)])
                    .header(CONTENT_LENGTH, 0),
            )
            .await?
            .json()
            .await?;

        Ok(response
            .keys
            .into_iter()
            .map(|key| StorageKey {
                key_name: key.key_name,
                permissions: key.permissions,
            })
            .collect())
    }

    async fn query_activity_log(&self, query: &ActivityLogQuery) -> Result<Vec<LogEntry>, ProviderError> {
        let url = self.resource_url(&format!(
            "/subscriptions/{}/providers/Microsoft.Insights/eventtypes/management/values",
            self.subscription_id
        ));
        let filter = activity::filter(query);

        let mut page: activity::EventPage = self
            .send(
                self.http
                    .get(&url)
                    .query(&[("api-version", ACTIVITY_LOG_API_VERSION), ("$filter", filter.as_str())]),
            )
            .await?
            .json()
            .await?;

        let mut entries = Vec::new();
        loop {
            entries.extend(page.value.into_iter().map(activity::EventData::into_entry));
            match page.next_link {
                Some(next) => page = self.get(&next).await?.json().await?,
                None => break,
            }
        }

        Ok(entries.into_iter().filter(|entry| query.matches(entry)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_id() {
        assert_eq!(
            kind_of(&ResourceId::new("/subscriptions/s/resourceGroups/rg1")),
            ResourceKind::ResourceGroup
        );
        assert_eq!(
            kind_of(&ResourceId::new(
                "/subscriptions/s/resourceGroups/rg1/providers/microsoft.insights/actiongroups/ag1"
            )),
            ResourceKind::ActionGroup
        );
    }

    #[test]
    fn test_provisioned_extracts_handle() {
        let resource = provisioned(json!({
            "id": "/subscriptions/s/resourceGroups/rg1",
            "name": "rg1",
            "location": "eastus2",
            "properties": { "provisioningState": "Succeeded" }
        }))
        .unwrap();

        assert_eq!(resource.id.as_str(), "/subscriptions/s/resourceGroups/rg1");
        assert_eq!(resource.name, "rg1");
        assert_eq!(resource.properties["provisioningState"], "Succeeded");
    }

    #[test]
    fn test_provisioned_requires_id() {
        let err = provisioned(json!({ "name": "rg1" })).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
