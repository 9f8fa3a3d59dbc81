//! Activity log wire format

use crate::provider::{ActivityLogQuery, LogEntry};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

/// `$filter` expression for the management event listing
pub(super) fn filter(query: &ActivityLogQuery) -> String {
    format!(
        "eventTimestamp ge '{}' and eventTimestamp le '{}' and resourceUri eq '{}'",
        query.from.to_rfc3339_opts(SecondsFormat::Secs, true),
        query.to.to_rfc3339_opts(SecondsFormat::Secs, true),
        query.resource_id
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EventPage {
    #[serde(default)]
    pub value: Vec<EventData>,
    pub next_link: Option<String>,
}

#[derive(Deserialize)]
struct LocalizableString {
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EventData {
    event_timestamp: DateTime<Utc>,
    operation_name: Option<LocalizableString>,
    #[serde(default)]
    resource_id: String,
    category: Option<LocalizableString>,
    caller: Option<String>,
    status: Option<LocalizableString>,
}

impl EventData {
    pub fn into_entry(self) -> LogEntry {
        LogEntry {
            event_timestamp: self.event_timestamp,
            operation_name: self.operation_name.map(|s| s.value).unwrap_or_default(),
            resource_id: self.resource_id,
            category: self.category.map(|s| s.value),
            caller: self.caller,
            status: self.status.map(|s| s.value),
        }
    }
}
