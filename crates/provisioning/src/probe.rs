//! Verification probe
//!
//! Performs the operation the alert watches for (listing storage keys) and
//! looks for it in the activity log. Diagnostic only: nothing here can fail
//! the run.

use chrono::Duration;
use cloud_provider::{ActivityLogQuery, ResourceProvider};
use resource_spec::{ResourceId, LIST_KEYS_OPERATION};
use tracing::{info, warn};

/// What the activity log showed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Matching entries were found
    Observed(usize),
    /// The query worked but nothing matched yet
    NotYetObserved,
    /// The query itself failed
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub keys_listed: bool,
    pub observation: Observation,
}

pub struct VerificationProbe<'p, P> {
    provider: &'p P,
    look_back: Duration,
}

impl<'p, P: ResourceProvider> VerificationProbe<'p, P> {
    pub fn new(provider: &'p P, look_back: Duration) -> Self {
        Self { provider, look_back }
    }

    pub async fn run(&self, storage_account: &ResourceId) -> ProbeReport {
        info!("Listing storage account keys to trigger the alert...");
        let keys_listed = match self.provider.list_storage_keys(storage_account).await {
            Ok(keys) => {
                for key in &keys {
                    info!("Storage key {} ({})", key.key_name, key.permissions);
                }
                true
            }
            Err(e) => {
                warn!("Listing storage keys failed: {}", e);
                false
            }
        };

        let query =
            ActivityLogQuery::look_back(storage_account.clone(), LIST_KEYS_OPERATION, self.look_back);
        info!(
            "Querying activity log for {} since {}",
            query.operation_name, query.from
        );

        let observation = match self.provider.query_activity_log(&query).await {
            Ok(entries) => {
                let matching: Vec<_> = entries.iter().filter(|entry| query.matches(entry)).collect();
                for entry in &matching {
                    info!(
                        "Activity log: {} {} caller={} status={}",
                        entry.event_timestamp,
                        entry.operation_name,
                        entry.caller.as_deref().unwrap_or("-"),
                        entry.status.as_deref().unwrap_or("-")
                    );
                }
                if matching.is_empty() {
                    warn!(
                        "No {} entries in the activity log yet; ingestion can lag by several minutes",
                        LIST_KEYS_OPERATION
                    );
                    Observation::NotYetObserved
                } else {
                    Observation::Observed(matching.len())
                }
            }
            Err(e) => {
                warn!("Activity log query failed: {}", e);
                Observation::Unavailable
            }
        };

        ProbeReport {
            keys_listed,
            observation,
        }
    }
}
