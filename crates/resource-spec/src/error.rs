//! Descriptor Validation Errors

use crate::alert_rule::ConditionField;
use std::fmt;
use thiserror::Error;

/// Errors raised while building a resource descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// Region identifier was blank
    #[error("Region identifier must not be empty")]
    EmptyRegion,

    /// Action group short name violates the provider limit
    #[error("Action group short name must be 1-{max} characters, got {len}")]
    InvalidShortName { len: usize, max: usize },

    /// One of the required alert conditions is absent
    #[error("Alert rule is missing the required `{0}` condition")]
    MissingCondition(ConditionField),

    /// The same condition field appears more than once
    #[error("Alert rule declares the `{0}` condition more than once")]
    DuplicateCondition(ConditionField),

    /// A condition has nothing to compare against
    #[error("Alert rule condition `{0}` has an empty expected value")]
    EmptyConditionValue(ConditionField),

    /// Alert rule has nothing to watch, or a blank scope
    #[error("Alert rule requires at least one scope and no blank scopes")]
    EmptyScopes,

    /// Alert rule cannot notify anyone
    #[error("Alert rule has no target action group")]
    MissingActionGroup,
}

/// Non-fatal findings attached to a built descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecWarning {
    /// Action group was built without a single receiver
    NoReceivers { action_group: String },
}

impl fmt::Display for SpecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReceivers { action_group } => write!(
                f,
                "action group {} has no receivers; alerts will not notify anyone",
                action_group
            ),
        }
    }
}
