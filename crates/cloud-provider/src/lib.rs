//! Cloud Provider
//!
//! The control-plane capabilities the provisioning workflow consumes:
//! - Create-or-update of the anchor group and its dependent resources
//! - Deletion of a resource (waiting for completion)
//! - Storage key listing and activity log queries for verification
//!
//! Every call returns only once the provider operation reached a terminal
//! state. [`ArmProvider`] talks to Azure Resource Manager, [`MockProvider`]
//! keeps everything in memory.

pub mod arm;
mod auth;
mod error;
mod mock;
mod provider;

pub use arm::{ArmOptions, ArmProvider};
pub use auth::Credentials;
pub use error::ProviderError;
pub use mock::{MockProvider, ProviderCall};
pub use provider::{ActivityLogQuery, LogEntry, ProvisionedResource, ResourceProvider, StorageKey};
