//! Resource Descriptors
//!
//! Pure builders for every resource in the alerting chain:
//! - Resource group (the anchor)
//! - Storage account being watched
//! - Action group carrying the notification receivers
//! - Activity log alert rule wiring the two together
//!
//! Nothing in this crate performs I/O.

mod action_group;
mod alert_rule;
mod builder;
mod error;
mod id;
mod naming;
mod region;
mod storage;

pub use action_group::{
    ActionGroupSpec, AppPushReceiver, EmailReceiver, NotificationChannelSet, PhoneReceiver,
    WebhookReceiver, MAX_SHORT_NAME_LEN,
};
pub use alert_rule::{
    storage_key_listing_conditions, ActivityLogAlertSpec, AlertCondition, ConditionField,
    LIST_KEYS_OPERATION, SECURITY_CATEGORY,
};
pub use builder::{
    Checked, DescriptorBuilder, ACTION_GROUP_PREFIX, ALERT_RULE_PREFIX, RESOURCE_GROUP_PREFIX,
    STORAGE_ACCOUNT_PREFIX,
};
pub use error::{SpecError, SpecWarning};
pub use id::{ResourceId, ResourceKind};
pub use naming::{NameGenerator, RandomNames, SequentialNames};
pub use region::Region;
pub use storage::{AccessTier, StorageAccountSpec, StorageKind, StorageSku};

/// Specification of the anchor resource group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupSpec {
    pub name: String,
    pub region: Region,
}

/// A resource created inside the anchor resource group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependentResourceSpec {
    StorageAccount(StorageAccountSpec),
    ActionGroup(ActionGroupSpec),
    ActivityLogAlert(ActivityLogAlertSpec),
}

impl DependentResourceSpec {
    /// Kind tag of the described resource
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::StorageAccount(_) => ResourceKind::StorageAccount,
            Self::ActionGroup(_) => ResourceKind::ActionGroup,
            Self::ActivityLogAlert(_) => ResourceKind::ActivityLogAlert,
        }
    }

    /// Resource name within the group
    pub fn name(&self) -> &str {
        match self {
            Self::StorageAccount(spec) => &spec.name,
            Self::ActionGroup(spec) => &spec.name,
            Self::ActivityLogAlert(spec) => &spec.name,
        }
    }

    /// Region the resource is deployed to
    pub fn region(&self) -> &Region {
        match self {
            Self::StorageAccount(spec) => &spec.region,
            Self::ActionGroup(spec) => &spec.region,
            Self::ActivityLogAlert(spec) => &spec.location,
        }
    }
}

impl From<StorageAccountSpec> for DependentResourceSpec {
    fn from(spec: StorageAccountSpec) -> Self {
        Self::StorageAccount(spec)
    }
}

impl From<ActionGroupSpec> for DependentResourceSpec {
    fn from(spec: ActionGroupSpec) -> Self {
        Self::ActionGroup(spec)
    }
}

impl From<ActivityLogAlertSpec> for DependentResourceSpec {
    fn from(spec: ActivityLogAlertSpec) -> Self {
        Self::ActivityLogAlert(spec)
    }
}
