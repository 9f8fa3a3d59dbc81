//! Workflow stages and outcomes

use crate::error::WorkflowError;
use crate::probe::ProbeReport;
use resource_spec::ResourceId;
use std::fmt;

/// Position in the strictly forward provisioning chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    GroupCreated,
    StorageCreated,
    ActionGroupCreated,
    AlertRuleCreated,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::GroupCreated => "group_created",
            Self::StorageCreated => "storage_created",
            Self::ActionGroupCreated => "action_group_created",
            Self::AlertRuleCreated => "alert_rule_created",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers created so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedResources {
    pub resource_group: Option<ResourceId>,
    pub storage_account: Option<ResourceId>,
    pub action_group: Option<ResourceId>,
    pub alert_rule: Option<ResourceId>,
}

/// Current stage plus the identifiers collected on the way there
#[derive(Debug, Clone)]
pub struct Progress {
    stage: Stage,
    created: CreatedResources,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            stage: Stage::Start,
            created: CreatedResources::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn created(&self) -> &CreatedResources {
        &self.created
    }

    /// Advance to a creation stage, recording the resource that got us there
    pub(crate) fn reach(&mut self, stage: Stage, id: ResourceId) {
        debug_assert!(stage > self.stage, "stages only move forward");
        match stage {
            Stage::GroupCreated => self.created.resource_group = Some(id),
            Stage::StorageCreated => self.created.storage_account = Some(id),
            Stage::ActionGroupCreated => self.created.action_group = Some(id),
            Stage::AlertRuleCreated => self.created.alert_rule = Some(id),
            Stage::Start | Stage::Done => {}
        }
        self.stage = stage;
    }

    pub(crate) fn finish(&mut self) {
        self.stage = Stage::Done;
    }
}

/// Every resource of a completed chain
#[derive(Debug, Clone)]
pub struct ProvisionedSet {
    pub resource_group: ResourceId,
    pub storage_account: ResourceId,
    pub action_group: ResourceId,
    pub alert_rule: ResourceId,
    pub probe: ProbeReport,
}

/// Result of one orchestrator run
#[derive(Debug)]
pub enum ProvisioningOutcome {
    Completed(ProvisionedSet),
    Failed {
        halted_at: Stage,
        created: CreatedResources,
        error: WorkflowError,
    },
}

impl ProvisioningOutcome {
    pub(crate) fn failed(progress: &Progress, error: WorkflowError) -> Self {
        Self::Failed {
            halted_at: progress.stage(),
            created: progress.created().clone(),
            error,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Stage the chain stopped at, if it failed
    pub fn halted_at(&self) -> Option<Stage> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { halted_at, .. } => Some(*halted_at),
        }
    }
}
