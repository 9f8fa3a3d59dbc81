//! Security Alert Demo
//!
//! Wires configuration, logging and a provider to the guarded provisioning
//! workflow.

use anyhow::Context;
use cloud_provider::{ArmProvider, Credentials, MockProvider, ResourceProvider};
use provisioning::{
    load_credentials, run_guarded, ConfigurationError, DemoConfig, LogFormat, Observation,
    ProvisioningOutcome, ProvisioningPlan, RunReport,
};
use resource_spec::RandomNames;
use std::future::Future;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Subscription id used in dry runs
pub const DRY_RUN_SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

/// Initialize logging
pub fn init_logging(format: LogFormat) {
    let builder = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true);

    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    result.expect("Failed to set tracing subscriber");
}

/// Run the demo against Azure, or in memory when `dry_run` is set
pub async fn run<C>(demo: &DemoConfig, cancel: C) -> anyhow::Result<RunReport>
where
    C: Future<Output = ()>,
{
    if demo.dry_run {
        info!("Dry run: using the in-memory provider");
        let provider = MockProvider::new(DRY_RUN_SUBSCRIPTION);
        let plan = ProvisioningPlan::from_config(demo, provider.subscription_id())?;
        return Ok(execute(&provider, plan, cancel).await);
    }

    run_live(demo, load_credentials(), cancel).await
}

/// Run against Azure with already resolved credentials
pub async fn run_live<C>(
    demo: &DemoConfig,
    credentials: Result<Credentials, ConfigurationError>,
    cancel: C,
) -> anyhow::Result<RunReport>
where
    C: Future<Output = ()>,
{
    let credentials = credentials?;
    let plan = ProvisioningPlan::from_config(demo, &credentials.subscription_id)?;
    let provider =
        ArmProvider::new(&credentials, demo.arm_options()?).context("Failed to build the ARM client")?;
    Ok(execute(&provider, plan, cancel).await)
}

async fn execute<P, C>(provider: &P, plan: ProvisioningPlan, cancel: C) -> RunReport
where
    P: ResourceProvider,
    C: Future<Output = ()>,
{
    let report = run_guarded(provider, RandomNames, plan, cancel).await;
    summarize(&report);
    report
}

/// Log the final status of a run
pub fn summarize(report: &RunReport) {
    match &report.outcome {
        ProvisioningOutcome::Completed(set) => {
            info!("Created activity log alert: {}", set.alert_rule);
            info!("  watching storage account: {}", set.storage_account);
            info!("  notifying action group: {}", set.action_group);
            match set.probe.observation {
                Observation::Observed(n) => info!("Key listing observed in activity log ({} entries)", n),
                Observation::NotYetObserved => warn!("Key listing not yet visible in activity log"),
                Observation::Unavailable => warn!("Activity log could not be queried"),
            }
            info!("Run succeeded");
        }
        ProvisioningOutcome::Failed {
            halted_at, error, ..
        } => {
            error!("Run failed at {}: {}", halted_at, error);
        }
    }

    if let Some(e) = report.cleanup_error() {
        warn!("Cleanup did not complete, delete {} manually: {}", e.anchor, e.source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provisioning::TeardownOutcome;
    use std::future::pending;

    #[tokio::test]
    async fn test_dry_run_succeeds_and_cleans_up() {
        let demo = DemoConfig {
            dry_run: true,
            ..DemoConfig::default()
        };

        let report = run(&demo, pending()).await.unwrap();

        assert!(report.is_success());
        assert!(matches!(report.teardown, TeardownOutcome::Deleted(_)));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_provisioning() {
        let err = run_live(
            &DemoConfig::default(),
            Err(ConfigurationError::Missing("CLIENT_ID")),
            pending(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigurationError>(),
            Some(ConfigurationError::Missing("CLIENT_ID"))
        ));
    }

    #[tokio::test]
    async fn test_invalid_region_rejected_in_dry_run() {
        let demo = DemoConfig {
            dry_run: true,
            region: String::new(),
            ..DemoConfig::default()
        };
        assert!(run(&demo, pending()).await.is_err());
    }
}
