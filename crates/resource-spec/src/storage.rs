//! Storage account descriptor

use crate::region::Region;
use serde::{Deserialize, Serialize};

/// Replication SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSku {
    StandardLrs,
    StandardGrs,
}

impl StorageSku {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardLrs => "Standard_LRS",
            Self::StandardGrs => "Standard_GRS",
        }
    }
}

/// Storage account kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    BlobStorage,
    StorageV2,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlobStorage => "BlobStorage",
            Self::StorageV2 => "StorageV2",
        }
    }
}

/// Blob access tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessTier {
    #[serde(alias = "hot")]
    Hot,
    #[default]
    #[serde(alias = "cool")]
    Cool,
}

impl AccessTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "Hot",
            Self::Cool => "Cool",
        }
    }
}

/// Storage account to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAccountSpec {
    /// Lower-case alphanumeric account name
    pub name: String,
    pub region: Region,
    pub sku: StorageSku,
    pub kind: StorageKind,
    pub access_tier: AccessTier,
}
