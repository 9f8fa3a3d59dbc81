//! Activity log alert descriptor

use crate::error::SpecError;
use crate::id::ResourceId;
use crate::region::Region;
use std::fmt;

/// Operation recorded when someone retrieves storage account access keys
pub const LIST_KEYS_OPERATION: &str = "Microsoft.Storage/storageAccounts/listkeys/action";

/// Activity log category for security-relevant events
pub const SECURITY_CATEGORY: &str = "Security";

/// Activity log fields an alert condition can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionField {
    Category,
    ResourceId,
    OperationName,
}

impl ConditionField {
    /// Every field a key-listing alert must match, in evaluation order
    pub const REQUIRED: [ConditionField; 3] = [
        ConditionField::Category,
        ConditionField::ResourceId,
        ConditionField::OperationName,
    ];

    fn index(&self) -> usize {
        match self {
            Self::Category => 0,
            Self::ResourceId => 1,
            Self::OperationName => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::ResourceId => "resourceId",
            Self::OperationName => "operationName",
        }
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field == value` leaf condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCondition {
    pub field: ConditionField,
    pub equals: String,
}

impl AlertCondition {
    pub fn new(field: ConditionField, equals: impl Into<String>) -> Self {
        Self {
            field,
            equals: equals.into(),
        }
    }

    pub fn category(category: &str) -> Self {
        Self::new(ConditionField::Category, category)
    }

    pub fn resource_id(id: &ResourceId) -> Self {
        Self::new(ConditionField::ResourceId, id.as_str())
    }

    pub fn operation_name(operation: &str) -> Self {
        Self::new(ConditionField::OperationName, operation)
    }
}

/// Conditions matching a key listing on the given storage account
pub fn storage_key_listing_conditions(storage_account: &ResourceId) -> Vec<AlertCondition> {
    vec![
        AlertCondition::category(SECURITY_CATEGORY),
        AlertCondition::resource_id(storage_account),
        AlertCondition::operation_name(LIST_KEYS_OPERATION),
    ]
}

/// Check that every required field appears exactly once with a value.
///
/// Returns the conditions ordered as [`ConditionField::REQUIRED`]. All of
/// them must match for the alert to fire.
pub(crate) fn validate_conditions(
    conditions: Vec<AlertCondition>,
) -> Result<Vec<AlertCondition>, SpecError> {
    let mut slots: [Option<AlertCondition>; 3] = [None, None, None];

    for condition in conditions {
        if condition.equals.trim().is_empty() {
            return Err(SpecError::EmptyConditionValue(condition.field));
        }
        let index = condition.field.index();
        if slots[index].is_some() {
            return Err(SpecError::DuplicateCondition(condition.field));
        }
        slots[index] = Some(condition);
    }

    ConditionField::REQUIRED
        .iter()
        .zip(slots)
        .map(|(field, slot)| slot.ok_or(SpecError::MissingCondition(*field)))
        .collect()
}

/// Activity log alert to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogAlertSpec {
    pub name: String,
    /// Always the `global` pseudo-region
    pub location: Region,
    pub scopes: Vec<String>,
    /// All conditions must match (logical AND)
    pub conditions: Vec<AlertCondition>,
    pub action_groups: Vec<ResourceId>,
    pub enabled: bool,
    pub description: String,
}
