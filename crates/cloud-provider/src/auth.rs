//! Service principal credentials and token acquisition

use crate::error::ProviderError;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Scope requested for management-plane tokens
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Refresh tokens this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Service principal identity used to authenticate against the provider
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    pub subscription_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// OAuth2 client-credentials flow with a single cached token
pub(crate) struct ClientSecretCredential {
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientSecretCredential {
    pub(crate) fn new(authority_host: &str, credentials: &Credentials) -> Self {
        Self {
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/'),
                credentials.tenant_id
            ),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Bearer token for the management plane, fetched on first use
    pub(crate) async fn token(&self, http: &reqwest::Client) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting management token from {}", self.token_url);
        let response = http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", MANAGEMENT_SCOPE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = match response.json::<TokenErrorResponse>().await {
                Ok(body) => format!("{}: {}", body.error, body.error_description),
                Err(_) => status.to_string(),
            };
            return Err(ProviderError::Authentication(detail));
        }

        let body: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(body.expires_in);
        *cached = Some(CachedToken {
            value: body.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        });
        Ok(body.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
            tenant_id: "tenant".to_string(),
            subscription_id: "sub".to_string(),
        };
        let printed = format!("{:?}", credentials);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_token_url() {
        let credentials = Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            tenant_id: "tenant".to_string(),
            subscription_id: "sub".to_string(),
        };
        let credential = ClientSecretCredential::new("https://login.example.com/", &credentials);
        assert_eq!(credential.token_url, "https://login.example.com/tenant/oauth2/v2.0/token");
    }
}
