//! Provisioning Orchestrator
//!
//! Drives `Start -> GroupCreated -> StorageCreated -> ActionGroupCreated ->
//! AlertRuleCreated -> Done`. Each create is awaited to completion before
//! the next is built, since later descriptors need earlier identifiers.
//! The first error halts the chain; nothing is retried here.

use crate::anchor::{AnchorSlot, CreatedAnchor};
use crate::error::WorkflowError;
use crate::outcome::{Progress, ProvisionedSet, ProvisioningOutcome, Stage};
use crate::plan::ProvisioningPlan;
use crate::probe::VerificationProbe;
use cloud_provider::ResourceProvider;
use metrics::counter;
use resource_spec::{
    storage_key_listing_conditions, DependentResourceSpec, DescriptorBuilder, NameGenerator,
    ResourceId, ResourceKind, SpecError,
};
use tracing::{error, info};

fn invalid(progress: &Progress, kind: ResourceKind, source: SpecError) -> WorkflowError {
    WorkflowError::InvalidSpec {
        stage: progress.stage(),
        kind,
        source,
    }
}

/// Runs the ordered create chain against one provider
pub struct Orchestrator<'p, P, N> {
    provider: &'p P,
    descriptors: DescriptorBuilder<N>,
    plan: ProvisioningPlan,
}

impl<'p, P: ResourceProvider, N: NameGenerator> Orchestrator<'p, P, N> {
    pub fn new(provider: &'p P, names: N, plan: ProvisioningPlan) -> Self {
        Self {
            provider,
            descriptors: DescriptorBuilder::new(names),
            plan,
        }
    }

    pub fn plan(&self) -> &ProvisioningPlan {
        &self.plan
    }

    /// Run the chain, handing the resource group to `anchor` as soon as it exists
    pub async fn run(&self, anchor: &mut AnchorSlot, progress: &mut Progress) -> ProvisioningOutcome {
        match self.drive(anchor, progress).await {
            Ok(resources) => {
                progress.finish();
                info!("Provisioning completed");
                ProvisioningOutcome::Completed(resources)
            }
            Err(e) => {
                counter!("provisioning_failures_total", "stage" => progress.stage().as_str()).increment(1);
                error!("Provisioning halted at {}: {}", progress.stage(), e);
                ProvisioningOutcome::failed(progress, e)
            }
        }
    }

    async fn drive(
        &self,
        anchor: &mut AnchorSlot,
        progress: &mut Progress,
    ) -> Result<ProvisionedSet, WorkflowError> {
        let plan = &self.plan;

        let group_spec = self.descriptors.resource_group(&plan.region);
        info!("Creating a resource group with name: {}...", group_spec.name);
        let group = self
            .provider
            .create_resource_group(&group_spec)
            .await
            .map_err(|source| WorkflowError::Provider {
                stage: progress.stage(),
                kind: ResourceKind::ResourceGroup,
                source,
            })?;
        anchor.acquire(CreatedAnchor {
            id: group.id.clone(),
            name: group.name.clone(),
            region: group_spec.region,
        });
        progress.reach(Stage::GroupCreated, group.id.clone());
        counter!("provisioning_steps_total", "stage" => Stage::GroupCreated.as_str()).increment(1);
        info!("Created a resource group with name: {}", group.name);
        let group_id = group.id;

        let storage = self.descriptors.storage_account(&plan.region, plan.access_tier);
        let storage_id = self
            .create(progress, &group_id, storage.into(), Stage::StorageCreated)
            .await?;

        let action_group = self
            .descriptors
            .action_group(&plan.action_group_region, &plan.short_name, plan.channels.clone())
            .map_err(|source| invalid(progress, ResourceKind::ActionGroup, source))?;
        let action_group_id = self
            .create(progress, &group_id, action_group.spec.into(), Stage::ActionGroupCreated)
            .await?;

        let alert_rule = self
            .descriptors
            .alert_rule(
                plan.scopes.clone(),
                storage_key_listing_conditions(&storage_id),
                Some(&action_group_id),
                &plan.alert_description,
            )
            .map_err(|source| invalid(progress, ResourceKind::ActivityLogAlert, source))?;
        let alert_rule_id = self
            .create(progress, &group_id, alert_rule.into(), Stage::AlertRuleCreated)
            .await?;

        let probe = VerificationProbe::new(self.provider, plan.look_back)
            .run(&storage_id)
            .await;

        Ok(ProvisionedSet {
            resource_group: group_id,
            storage_account: storage_id,
            action_group: action_group_id,
            alert_rule: alert_rule_id,
            probe,
        })
    }

    /// Create one dependent resource and keep only its identifier
    async fn create(
        &self,
        progress: &mut Progress,
        group: &ResourceId,
        spec: DependentResourceSpec,
        reached: Stage,
    ) -> Result<ResourceId, WorkflowError> {
        let kind = spec.kind();
        info!("Creating {} with name: {}...", kind, spec.name());

        let resource = self
            .provider
            .create_or_update(group, &spec)
            .await
            .map_err(|source| WorkflowError::Provider {
                stage: progress.stage(),
                kind,
                source,
            })?;

        progress.reach(reached, resource.id.clone());
        counter!("provisioning_steps_total", "stage" => reached.as_str()).increment(1);
        info!("Created {} with name: {}", kind, resource.name);
        Ok(resource.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Observation;
    use cloud_provider::{MockProvider, ProviderCall};
    use resource_spec::{NotificationChannelSet, Region, SequentialNames};

    fn plan() -> ProvisioningPlan {
        ProvisioningPlan::new(Region::new("eastus2").unwrap(), "sub")
    }

    #[tokio::test]
    async fn test_full_chain_in_order() {
        let provider = MockProvider::new("sub");
        let orchestrator = Orchestrator::new(&provider, SequentialNames::new(), plan());
        let mut anchor = AnchorSlot::new();
        let mut progress = Progress::new();

        let outcome = orchestrator.run(&mut anchor, &mut progress).await;

        let ProvisioningOutcome::Completed(set) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(progress.stage(), Stage::Done);
        assert_eq!(anchor.owned().map(|a| &a.id), Some(&set.resource_group));
        assert_eq!(set.probe.observation, Observation::Observed(1));

        let kinds: Vec<_> = provider
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::CreateOrUpdate { kind, .. } => Some(kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::ResourceGroup,
                ResourceKind::StorageAccount,
                ResourceKind::ActionGroup,
                ResourceKind::ActivityLogAlert,
            ]
        );
        assert!(provider.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_halts_on_first_failure() {
        let provider = MockProvider::new("sub").fail_on(ResourceKind::StorageAccount, "name taken");
        let orchestrator = Orchestrator::new(&provider, SequentialNames::new(), plan());
        let mut anchor = AnchorSlot::new();
        let mut progress = Progress::new();

        let outcome = orchestrator.run(&mut anchor, &mut progress).await;

        assert_eq!(outcome.halted_at(), Some(Stage::GroupCreated));
        assert!(matches!(
            outcome.error(),
            Some(WorkflowError::Provider {
                kind: ResourceKind::StorageAccount,
                ..
            })
        ));
        assert!(anchor.is_owned());
        // group + storage attempt, nothing after
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_anchor_not_owned_when_group_fails() {
        let provider = MockProvider::new("sub").fail_on(ResourceKind::ResourceGroup, "unauthorized");
        let orchestrator = Orchestrator::new(&provider, SequentialNames::new(), plan());
        let mut anchor = AnchorSlot::new();
        let mut progress = Progress::new();

        let outcome = orchestrator.run(&mut anchor, &mut progress).await;

        assert_eq!(outcome.halted_at(), Some(Stage::Start));
        assert!(!anchor.is_owned());
    }

    #[tokio::test]
    async fn test_invalid_descriptor_halts_before_create() {
        let provider = MockProvider::new("sub");
        let mut plan = plan();
        plan.short_name = "WayTooLongShortName".to_string();
        let orchestrator = Orchestrator::new(&provider, SequentialNames::new(), plan);
        let mut anchor = AnchorSlot::new();
        let mut progress = Progress::new();

        let outcome = orchestrator.run(&mut anchor, &mut progress).await;

        assert_eq!(outcome.halted_at(), Some(Stage::StorageCreated));
        assert!(matches!(
            outcome.error(),
            Some(WorkflowError::InvalidSpec {
                kind: ResourceKind::ActionGroup,
                source: SpecError::InvalidShortName { .. },
                ..
            })
        ));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_receivers_do_not_halt() {
        let provider = MockProvider::new("sub");
        let mut plan = plan();
        plan.channels = NotificationChannelSet::new();
        let orchestrator = Orchestrator::new(&provider, SequentialNames::new(), plan);

        let outcome = orchestrator
            .run(&mut AnchorSlot::new(), &mut Progress::new())
            .await;
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn test_alert_wired_to_created_resources() {
        let provider = MockProvider::new("sub");
        let names = |prefix: &str| match prefix {
            resource_spec::RESOURCE_GROUP_PREFIX => "rg1".to_string(),
            resource_spec::STORAGE_ACCOUNT_PREFIX => "sa1".to_string(),
            resource_spec::ACTION_GROUP_PREFIX => "ag1".to_string(),
            _ => "alert1".to_string(),
        };
        let orchestrator = Orchestrator::new(&provider, names, plan());
        let mut progress = Progress::new();

        let outcome = orchestrator.run(&mut AnchorSlot::new(), &mut progress).await;

        let ProvisioningOutcome::Completed(set) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(set.storage_account.name(), "sa1");
        assert_eq!(set.action_group.name(), "ag1");
        assert_eq!(
            set.alert_rule.as_str(),
            "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Insights/activityLogAlerts/alert1"
        );
        assert_eq!(progress.created().alert_rule.as_ref(), Some(&set.alert_rule));
    }
}
