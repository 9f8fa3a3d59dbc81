//! Deployment regions

use crate::error::SpecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty region identifier (e.g. `eastus2`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Validate and wrap a region identifier
    pub fn new(region: impl Into<String>) -> Result<Self, SpecError> {
        let region = region.into();
        let trimmed = region.trim();
        if trimmed.is_empty() {
            return Err(SpecError::EmptyRegion);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Pseudo-region used by subscription-wide resources such as activity log alerts
    pub fn global() -> Self {
        Self("global".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Region {
    type Error = SpecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
