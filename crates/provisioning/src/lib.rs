//! Provisioning Workflow
//!
//! Creates the resource chain behind a storage key-listing alert:
//! resource group, storage account, action group, activity log alert.
//! Steps run strictly in order, the first failure halts the chain and the
//! [`TeardownGuard`] deletes the resource group on every exit path if,
//! and only if, it was created.

mod anchor;
mod settings;
mod error;
mod orchestrator;
mod outcome;
mod plan;
mod probe;
mod teardown;

pub use anchor::{AnchorSlot, CreatedAnchor};
pub use settings::{credentials_from, load_credentials, ConfigurationError, DemoConfig, LogFormat};
pub use error::{CleanupError, WorkflowError};
pub use orchestrator::Orchestrator;
pub use outcome::{CreatedResources, Progress, ProvisionedSet, ProvisioningOutcome, Stage};
pub use plan::{security_team_channels, subscription_scope, ProvisioningPlan, ALERT_DESCRIPTION};
pub use probe::{Observation, ProbeReport, VerificationProbe};
pub use teardown::{RunReport, TeardownGuard, TeardownOutcome};

use cloud_provider::ResourceProvider;
use resource_spec::NameGenerator;
use std::future::Future;

/// Provision the full chain under a [`TeardownGuard`].
///
/// `cancel` resolving stops the chain at its current stage; cleanup still runs.
pub async fn run_guarded<P, N, C>(
    provider: &P,
    names: N,
    plan: ProvisioningPlan,
    cancel: C,
) -> RunReport
where
    P: ResourceProvider,
    N: NameGenerator,
    C: Future<Output = ()>,
{
    let orchestrator = Orchestrator::new(provider, names, plan);
    TeardownGuard::new(provider).run(&orchestrator, cancel).await
}
