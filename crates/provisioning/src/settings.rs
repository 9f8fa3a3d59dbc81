//! Configuration loading
//!
//! Credentials come from the unprefixed `CLIENT_ID`, `CLIENT_SECRET`,
//! `TENANT_ID` and `SUBSCRIPTION_ID` variables. Demo options come from an
//! optional `alert-demo` config file overlaid with `ALERT_DEMO_*` variables.

use cloud_provider::{ArmOptions, Credentials};
use config::{Config, Environment, File};
use resource_spec::AccessTier;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Base name of the optional config file (any format `config` understands)
pub const CONFIG_FILE: &str = "alert-demo";

/// Prefix of environment variables overriding demo options
pub const ENV_PREFIX: &str = "ALERT_DEMO";

/// Missing or unusable configuration; fatal before any provider call
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Demo options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Region of the resource group and storage account
    pub region: String,
    /// Region of the action group
    pub action_group_region: String,
    pub access_tier: AccessTier,
    /// Action group display name (at most 12 characters)
    pub short_name: String,
    /// Activity log window searched by the verification probe
    pub look_back_days: u32,
    /// Use the in-memory provider instead of Azure
    pub dry_run: bool,
    pub log_format: LogFormat,
    pub management_endpoint: String,
    pub authority_host: String,
    pub poll_interval_secs: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let arm = ArmOptions::default();
        Self {
            region: "eastus2".to_string(),
            action_group_region: "northcentralus".to_string(),
            access_tier: AccessTier::Cool,
            short_name: "AG".to_string(),
            look_back_days: 7,
            dry_run: false,
            log_format: LogFormat::Text,
            management_endpoint: arm.management_endpoint,
            authority_host: arm.authority_host,
            poll_interval_secs: arm.poll_interval.as_secs(),
        }
    }
}

impl DemoConfig {
    /// Load from the optional config file and `ALERT_DEMO_*` variables
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::from_sources(Some(CONFIG_FILE), Environment::with_prefix(ENV_PREFIX))
    }

    pub fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, ConfigurationError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        let config = builder.add_source(env.try_parsing(true)).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Endpoint settings for the ARM provider. The poll interval must be at least one second.
    pub fn arm_options(&self) -> Result<ArmOptions, ConfigurationError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigurationError::Invalid {
                name: "poll_interval_secs",
                reason: "must be at least one second".to_string(),
            });
        }
        Ok(ArmOptions {
            management_endpoint: self.management_endpoint.clone(),
            authority_host: self.authority_host.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawCredentials {
    client_id: Option<String>,
    client_secret: Option<String>,
    tenant_id: Option<String>,
    subscription_id: Option<String>,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigurationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigurationError::Missing(name))
}

/// Read the service principal from the process environment
pub fn load_credentials() -> Result<Credentials, ConfigurationError> {
    credentials_from(Environment::default())
}

/// Read the service principal from the given environment source
pub fn credentials_from(env: Environment) -> Result<Credentials, ConfigurationError> {
    let raw: RawCredentials = Config::builder().add_source(env).build()?.try_deserialize()?;

    Ok(Credentials {
        client_id: required(raw.client_id, "CLIENT_ID")?,
        client_secret: required(raw.client_secret, "CLIENT_SECRET")?,
        tenant_id: required(raw.tenant_id, "TENANT_ID")?,
        subscription_id: required(raw.subscription_id, "SUBSCRIPTION_ID")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    fn demo_env(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    const FULL: [(&str, &str); 4] = [
        ("CLIENT_ID", "client"),
        ("CLIENT_SECRET", "secret"),
        ("TENANT_ID", "tenant"),
        ("SUBSCRIPTION_ID", "sub"),
    ];

    #[test]
    fn test_credentials_complete() {
        let credentials = credentials_from(env(&FULL)).unwrap();
        assert_eq!(credentials.client_id, "client");
        assert_eq!(credentials.subscription_id, "sub");
    }

    #[test]
    fn test_each_credential_required() {
        for (i, (name, _)) in FULL.iter().enumerate() {
            let vars: Vec<_> = FULL
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, kv)| *kv)
                .collect();
            let err = credentials_from(env(&vars)).unwrap_err();
            assert!(matches!(err, ConfigurationError::Missing(missing) if missing == *name));
        }
    }

    #[test]
    fn test_blank_credential_rejected() {
        let mut vars = FULL.to_vec();
        vars[1] = ("CLIENT_SECRET", "  ");
        let err = credentials_from(env(&vars)).unwrap_err();
        assert!(matches!(err, ConfigurationError::Missing("CLIENT_SECRET")));
    }

    #[test]
    fn test_demo_defaults() {
        let config = DemoConfig::from_sources(None, demo_env(&[])).unwrap();
        assert_eq!(config.region, "eastus2");
        assert_eq!(config.action_group_region, "northcentralus");
        assert_eq!(config.access_tier, AccessTier::Cool);
        assert_eq!(config.look_back_days, 7);
        assert!(!config.dry_run);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_demo_env_overrides() {
        let config = DemoConfig::from_sources(
            None,
            demo_env(&[
                ("ALERT_DEMO_REGION", "westeurope"),
                ("ALERT_DEMO_DRY_RUN", "true"),
                ("ALERT_DEMO_LOOK_BACK_DAYS", "3"),
                ("ALERT_DEMO_LOG_FORMAT", "json"),
                ("ALERT_DEMO_ACCESS_TIER", "Hot"),
            ]),
        )
        .unwrap();
        assert_eq!(config.region, "westeurope");
        assert!(config.dry_run);
        assert_eq!(config.look_back_days, 3);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.access_tier, AccessTier::Hot);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let config = DemoConfig::from_sources(None, demo_env(&[("ALERT_DEMO_POLL_INTERVAL_SECS", "0")])).unwrap();
        assert!(matches!(
            config.arm_options(),
            Err(ConfigurationError::Invalid {
                name: "poll_interval_secs",
                ..
            })
        ));
        assert_eq!(
            DemoConfig::default().arm_options().unwrap().poll_interval,
            Duration::from_secs(5)
        );
    }
}
