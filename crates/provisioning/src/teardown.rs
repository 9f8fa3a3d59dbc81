//! Teardown Guard
//!
//! Wraps an orchestrator run. Whatever way the run ends (completion,
//! error, panic or cancellation) the guard issues exactly one delete for the
//! anchor resource group, and only if the group was created. Delete
//! failures are logged and reported next to, never instead of, the
//! workflow result.

use crate::anchor::AnchorSlot;
use crate::error::{CleanupError, WorkflowError};
use crate::orchestrator::Orchestrator;
use crate::outcome::{Progress, ProvisioningOutcome};
use cloud_provider::ResourceProvider;
use futures::FutureExt;
use metrics::counter;
use resource_spec::{NameGenerator, ResourceId};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// What the guard did on exit
#[derive(Debug)]
pub enum TeardownOutcome {
    /// The anchor was never created
    NothingToClean,
    /// The anchor was deleted
    Deleted(ResourceId),
    /// Deleting the anchor failed
    Failed(CleanupError),
}

/// Workflow result plus what the guard did afterwards
#[derive(Debug)]
pub struct RunReport {
    pub outcome: ProvisioningOutcome,
    pub teardown: TeardownOutcome,
}

impl RunReport {
    /// The chain completed. Cleanup failures do not change this.
    pub fn is_success(&self) -> bool {
        self.outcome.is_completed()
    }

    /// The error that ended the run; always takes precedence over cleanup errors
    pub fn primary_error(&self) -> Option<&WorkflowError> {
        self.outcome.error()
    }

    pub fn cleanup_error(&self) -> Option<&CleanupError> {
        match &self.teardown {
            TeardownOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Scoped owner of the anchor resource group
pub struct TeardownGuard<'p, P> {
    provider: &'p P,
}

impl<'p, P: ResourceProvider> TeardownGuard<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    /// Run `orchestrator` until it finishes or `cancel` resolves, then release the anchor
    pub async fn run<N, C>(&self, orchestrator: &Orchestrator<'_, P, N>, cancel: C) -> RunReport
    where
        N: NameGenerator,
        C: Future<Output = ()>,
    {
        let mut anchor = AnchorSlot::new();
        let mut progress = Progress::new();

        let finished = tokio::select! {
            result = AssertUnwindSafe(orchestrator.run(&mut anchor, &mut progress)).catch_unwind() => Some(result),
            _ = cancel => None,
        };

        let outcome = match finished {
            Some(Ok(outcome)) => outcome,
            Some(Err(payload)) => {
                let error = WorkflowError::Panicked {
                    stage: progress.stage(),
                    message: panic_message(payload.as_ref()),
                };
                error!("{}", error);
                ProvisioningOutcome::failed(&progress, error)
            }
            None => {
                let error = WorkflowError::Cancelled {
                    stage: progress.stage(),
                };
                warn!("{}", error);
                ProvisioningOutcome::failed(&progress, error)
            }
        };

        let teardown = self.release(anchor).await;
        RunReport { outcome, teardown }
    }

    /// Delete the anchor if owned. Consumes the slot, so this happens at most once.
    pub async fn release(&self, mut anchor: AnchorSlot) -> TeardownOutcome {
        let Some(owned) = anchor.take() else {
            info!("Did not create any resources. No clean up is necessary");
            counter!("teardown_total", "outcome" => "nothing_to_clean").increment(1);
            return TeardownOutcome::NothingToClean;
        };

        info!("Deleting resource group: {}", owned.id);
        match self.provider.delete(&owned.id).await {
            Ok(()) => {
                info!("Deleted resource group: {}", owned.id);
                counter!("teardown_total", "outcome" => "deleted").increment(1);
                TeardownOutcome::Deleted(owned.id)
            }
            Err(source) => {
                let e = CleanupError {
                    anchor: owned.id,
                    source,
                };
                error!("{} ({:?})", e, e.source);
                counter!("teardown_total", "outcome" => "failed").increment(1);
                TeardownOutcome::Failed(e)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Stage;
    use crate::plan::ProvisioningPlan;
    use crate::probe::Observation;
    use cloud_provider::MockProvider;
    use resource_spec::{
        Region, ResourceKind, SequentialNames, ACTION_GROUP_PREFIX, RESOURCE_GROUP_PREFIX,
        STORAGE_ACCOUNT_PREFIX,
    };
    use std::future::pending;
    use std::time::Duration;

    fn plan() -> ProvisioningPlan {
        ProvisioningPlan::new(Region::new("eastus2").unwrap(), "sub")
    }

    fn named(prefix: &str) -> String {
        match prefix {
            RESOURCE_GROUP_PREFIX => "rg1".to_string(),
            STORAGE_ACCOUNT_PREFIX => "sa1".to_string(),
            ACTION_GROUP_PREFIX => "ag1".to_string(),
            _ => "alert1".to_string(),
        }
    }

    async fn guarded(provider: &MockProvider) -> RunReport {
        let orchestrator = Orchestrator::new(provider, named, plan());
        TeardownGuard::new(provider).run(&orchestrator, pending()).await
    }

    #[tokio::test]
    async fn test_action_group_failure_still_deletes_anchor_once() {
        let provider = MockProvider::new("sub").fail_on(ResourceKind::ActionGroup, "quota exceeded");

        let report = guarded(&provider).await;

        assert!(!report.is_success());
        assert_eq!(report.outcome.halted_at(), Some(Stage::StorageCreated));
        assert!(matches!(
            report.primary_error(),
            Some(WorkflowError::Provider {
                kind: ResourceKind::ActionGroup,
                ..
            })
        ));
        let rg1 = ResourceId::new("/subscriptions/sub/resourceGroups/rg1");
        assert_eq!(provider.deletes(), vec![rg1.clone()]);
        assert!(matches!(report.teardown, TeardownOutcome::Deleted(ref id) if *id == rg1));
    }

    #[tokio::test]
    async fn test_success_with_lagging_log_still_succeeds() {
        let provider = MockProvider::new("sub").with_log_lag();

        let report = guarded(&provider).await;

        assert!(report.is_success());
        let ProvisioningOutcome::Completed(set) = &report.outcome else {
            panic!("expected completion");
        };
        assert_eq!(set.probe.observation, Observation::NotYetObserved);
        assert_eq!(provider.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_exactly_one_delete_iff_anchor_created() {
        let kinds = [
            ResourceKind::ResourceGroup,
            ResourceKind::StorageAccount,
            ResourceKind::ActionGroup,
            ResourceKind::ActivityLogAlert,
        ];
        for kind in kinds {
            let provider = MockProvider::new("sub").fail_on(kind, "boom");
            let report = guarded(&provider).await;

            assert!(!report.is_success());
            let expected = if kind == ResourceKind::ResourceGroup { 0 } else { 1 };
            assert_eq!(provider.deletes().len(), expected, "failing {}", kind);
        }

        let provider = MockProvider::new("sub");
        guarded(&provider).await;
        assert_eq!(provider.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_nothing_to_clean_without_anchor() {
        let provider = MockProvider::new("sub").fail_on(ResourceKind::ResourceGroup, "unauthorized");

        let report = guarded(&provider).await;

        assert!(matches!(report.teardown, TeardownOutcome::NothingToClean));
        assert!(provider.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_failure_does_not_replace_workflow_error() {
        let provider = MockProvider::new("sub")
            .fail_on(ResourceKind::StorageAccount, "name taken")
            .fail_delete("resource group locked");

        let report = guarded(&provider).await;

        assert!(matches!(
            report.primary_error(),
            Some(WorkflowError::Provider {
                kind: ResourceKind::StorageAccount,
                ..
            })
        ));
        assert!(report.cleanup_error().is_some());
        assert_eq!(provider.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_failure_after_success_keeps_success() {
        let provider = MockProvider::new("sub").fail_delete("resource group locked");

        let report = guarded(&provider).await;

        assert!(report.is_success());
        assert!(report.primary_error().is_none());
        assert!(report.cleanup_error().is_some());
    }

    #[tokio::test]
    async fn test_cancellation_mid_chain_releases_anchor() {
        let provider = MockProvider::new("sub").hang_on(ResourceKind::ActionGroup);
        let orchestrator = Orchestrator::new(&provider, SequentialNames::new(), plan());

        let report = TeardownGuard::new(&provider)
            .run(&orchestrator, tokio::time::sleep(Duration::from_millis(50)))
            .await;

        assert!(matches!(
            report.primary_error(),
            Some(WorkflowError::Cancelled {
                stage: Stage::StorageCreated
            })
        ));
        assert_eq!(provider.deletes().len(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_before_anchor_cleans_nothing() {
        let provider = MockProvider::new("sub").hang_on(ResourceKind::ResourceGroup);
        let orchestrator = Orchestrator::new(&provider, SequentialNames::new(), plan());

        let report = TeardownGuard::new(&provider)
            .run(&orchestrator, tokio::time::sleep(Duration::from_millis(50)))
            .await;

        assert_eq!(report.outcome.halted_at(), Some(Stage::Start));
        assert!(matches!(report.teardown, TeardownOutcome::NothingToClean));
        assert!(provider.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_panic_after_anchor_still_deletes_once() {
        let provider = MockProvider::new("sub").panic_on(ResourceKind::StorageAccount);

        let report = guarded(&provider).await;

        assert!(!report.is_success());
        assert!(matches!(
            report.primary_error(),
            Some(WorkflowError::Panicked {
                stage: Stage::GroupCreated,
                ..
            })
        ));
        let rg1 = ResourceId::new("/subscriptions/sub/resourceGroups/rg1");
        assert_eq!(provider.deletes(), vec![rg1]);
    }

    #[tokio::test]
    async fn test_panic_before_anchor_cleans_nothing() {
        let provider = MockProvider::new("sub").panic_on(ResourceKind::ResourceGroup);

        let report = guarded(&provider).await;

        assert_eq!(report.outcome.halted_at(), Some(Stage::Start));
        assert!(matches!(report.teardown, TeardownOutcome::NothingToClean));
        assert!(provider.deletes().is_empty());
    }

    #[test]
    fn test_panic_message_from_payload() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&7_u8), "unknown panic");
    }

    #[tokio::test]
    async fn test_release_of_empty_slot() {
        let provider = MockProvider::new("sub");
        let outcome = TeardownGuard::new(&provider).release(AnchorSlot::new()).await;
        assert!(matches!(outcome, TeardownOutcome::NothingToClean));
        assert!(provider.calls().is_empty());
    }
}
