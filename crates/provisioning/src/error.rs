//! Workflow Error Types

use crate::outcome::Stage;
use cloud_provider::ProviderError;
use resource_spec::{ResourceId, ResourceKind, SpecError};
use thiserror::Error;

/// Why the provisioning chain stopped early
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A descriptor failed local validation before its create call
    #[error("Invalid {kind} descriptor (halted at {stage}): {source}")]
    InvalidSpec {
        stage: Stage,
        kind: ResourceKind,
        #[source]
        source: SpecError,
    },

    /// The provider rejected a create call
    #[error("Creating {kind} failed (halted at {stage}): {source}")]
    Provider {
        stage: Stage,
        kind: ResourceKind,
        #[source]
        source: ProviderError,
    },

    /// The run was cancelled from outside
    #[error("Provisioning cancelled (halted at {stage})")]
    Cancelled { stage: Stage },

    /// The chain panicked. The anchor is still released before this is reported.
    #[error("Provisioning panicked (halted at {stage}): {message}")]
    Panicked { stage: Stage, message: String },
}

impl WorkflowError {
    /// Last stage reached before the error
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidSpec { stage, .. }
            | Self::Provider { stage, .. }
            | Self::Cancelled { stage }
            | Self::Panicked { stage, .. } => *stage,
        }
    }
}

/// Deleting the anchor on exit failed. Logged, never propagated.
#[derive(Debug, Error)]
#[error("Failed to delete resource group {anchor}: {source}")]
pub struct CleanupError {
    pub anchor: ResourceId,
    #[source]
    pub source: ProviderError,
}
