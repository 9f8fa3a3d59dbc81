//! Descriptor Builder
//!
//! Turns a region plus a handful of settings into complete resource
//! descriptors. Names come from the injected [`NameGenerator`].

use crate::action_group::{ActionGroupSpec, NotificationChannelSet, MAX_SHORT_NAME_LEN};
use crate::alert_rule::{validate_conditions, ActivityLogAlertSpec, AlertCondition};
use crate::error::{SpecError, SpecWarning};
use crate::id::ResourceId;
use crate::naming::NameGenerator;
use crate::region::Region;
use crate::storage::{AccessTier, StorageAccountSpec, StorageKind, StorageSku};
use crate::ResourceGroupSpec;
use tracing::{debug, warn};

pub const RESOURCE_GROUP_PREFIX: &str = "rgMonitor";
pub const STORAGE_ACCOUNT_PREFIX: &str = "samonitor";
pub const ACTION_GROUP_PREFIX: &str = "securityBreachActionGroup";
pub const ALERT_RULE_PREFIX: &str = "alertRule";

/// A descriptor together with the non-fatal findings raised while building it
#[derive(Debug, Clone)]
pub struct Checked<T> {
    pub spec: T,
    pub warnings: Vec<SpecWarning>,
}

impl<T> Checked<T> {
    fn clean(spec: T) -> Self {
        Self {
            spec,
            warnings: Vec::new(),
        }
    }

    /// Whether any warning was raised
    pub fn is_flagged(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Builds descriptors for the alerting chain
pub struct DescriptorBuilder<N> {
    names: N,
}

impl<N: NameGenerator> DescriptorBuilder<N> {
    pub fn new(names: N) -> Self {
        Self { names }
    }

    /// Anchor resource group
    pub fn resource_group(&self, region: &Region) -> ResourceGroupSpec {
        ResourceGroupSpec {
            name: self.names.name(RESOURCE_GROUP_PREFIX),
            region: region.clone(),
        }
    }

    /// Geo-redundant blob storage account with the given access tier
    pub fn storage_account(&self, region: &Region, access_tier: AccessTier) -> StorageAccountSpec {
        // Storage account names only allow lower-case letters and digits.
        let name = self.names.name(STORAGE_ACCOUNT_PREFIX).to_ascii_lowercase();
        debug!("Storage account descriptor: {} ({})", name, access_tier.as_str());
        StorageAccountSpec {
            name,
            region: region.clone(),
            sku: StorageSku::StandardGrs,
            kind: StorageKind::BlobStorage,
            access_tier,
        }
    }

    /// Enabled action group notifying every receiver in `channels`.
    ///
    /// An empty channel set is accepted but flagged with
    /// [`SpecWarning::NoReceivers`].
    pub fn action_group(
        &self,
        region: &Region,
        short_name: &str,
        channels: NotificationChannelSet,
    ) -> Result<Checked<ActionGroupSpec>, SpecError> {
        let len = short_name.chars().count();
        if len == 0 || len > MAX_SHORT_NAME_LEN {
            return Err(SpecError::InvalidShortName {
                len,
                max: MAX_SHORT_NAME_LEN,
            });
        }

        let spec = ActionGroupSpec {
            name: self.names.name(ACTION_GROUP_PREFIX),
            region: region.clone(),
            short_name: short_name.to_string(),
            enabled: true,
            channels,
        };

        let mut checked = Checked::clean(spec);
        if checked.spec.channels.is_empty() {
            let warning = SpecWarning::NoReceivers {
                action_group: checked.spec.name.clone(),
            };
            warn!("{}", warning);
            checked.warnings.push(warning);
        }
        Ok(checked)
    }

    /// Enabled activity log alert bound to `target_action_group`.
    ///
    /// Conditions must name category, resource id and operation exactly once each.
    /// Their values are caller-defined; see [`crate::storage_key_listing_conditions`] for
    /// the security key-listing set.
    pub fn alert_rule(
        &self,
        scopes: Vec<String>,
        conditions: Vec<AlertCondition>,
        target_action_group: Option<&ResourceId>,
        description: &str,
    ) -> Result<ActivityLogAlertSpec, SpecError> {
        let target = target_action_group.ok_or(SpecError::MissingActionGroup)?;
        if scopes.is_empty() || scopes.iter().any(|scope| scope.trim().is_empty()) {
            return Err(SpecError::EmptyScopes);
        }
        let conditions = validate_conditions(conditions)?;

        Ok(ActivityLogAlertSpec {
            name: self.names.name(ALERT_RULE_PREFIX),
            location: Region::global(),
            scopes,
            conditions,
            action_groups: vec![target.clone()],
            enabled: true,
            description: description.to_string(),
        })
    }
}
