//! Provisioning plan
//!
//! Fixed inputs of the demo: regions, storage tier, who gets notified and
//! which subscription the alert watches.

use crate::settings::{ConfigurationError, DemoConfig};
use chrono::Duration;
use resource_spec::{AccessTier, NotificationChannelSet, Region};

pub const ALERT_DESCRIPTION: &str = "Security StorageAccounts ListAccountKeys trigger";

/// The activity log keeps 90 days of events
pub const MAX_LOOK_BACK_DAYS: u32 = 90;

/// Security team receivers on every channel kind
pub fn security_team_channels() -> NotificationChannelSet {
    NotificationChannelSet::new()
        .with_app_push("MAAPRtierOne", "security_on_duty@securecorporation.com")
        .with_email("MERtierOne", "security_guards@securecorporation.com")
        .with_email("MERtierTwo", "ceo@securecorporation.com")
        .with_sms("MSRtierOne", "1", "4255655665")
        .with_voice("MVRtierOne", "1", "2062066050")
        .with_webhook("MWRtierOne", "https://www.weseemstobehacked.securecorporation.com")
}

/// Alert scope covering the whole subscription
pub fn subscription_scope(subscription_id: &str) -> String {
    format!("/subscriptions/{}", subscription_id)
}

/// Everything the orchestrator needs besides the provider and names
#[derive(Debug, Clone)]
pub struct ProvisioningPlan {
    pub region: Region,
    pub action_group_region: Region,
    pub access_tier: AccessTier,
    pub short_name: String,
    pub channels: NotificationChannelSet,
    pub scopes: Vec<String>,
    pub alert_description: String,
    /// Activity log window searched by the verification probe
    pub look_back: Duration,
}

impl ProvisioningPlan {
    /// Plan with the demo defaults, everything in `region`
    pub fn new(region: Region, subscription_id: &str) -> Self {
        Self {
            action_group_region: region.clone(),
            region,
            access_tier: AccessTier::Cool,
            short_name: "AG".to_string(),
            channels: security_team_channels(),
            scopes: vec![subscription_scope(subscription_id)],
            alert_description: ALERT_DESCRIPTION.to_string(),
            look_back: Duration::days(7),
        }
    }

    pub fn from_config(config: &DemoConfig, subscription_id: &str) -> Result<Self, ConfigurationError> {
        let region = Region::new(config.region.as_str()).map_err(|e| ConfigurationError::Invalid {
            name: "region",
            reason: e.to_string(),
        })?;
        let action_group_region =
            Region::new(config.action_group_region.as_str()).map_err(|e| ConfigurationError::Invalid {
                name: "action_group_region",
                reason: e.to_string(),
            })?;
        if !(1..=MAX_LOOK_BACK_DAYS).contains(&config.look_back_days) {
            return Err(ConfigurationError::Invalid {
                name: "look_back_days",
                reason: format!("must be between 1 and {} days", MAX_LOOK_BACK_DAYS),
            });
        }

        Ok(Self {
            action_group_region,
            access_tier: config.access_tier,
            short_name: config.short_name.clone(),
            look_back: Duration::days(i64::from(config.look_back_days)),
            ..Self::new(region, subscription_id)
        })
    }
}
