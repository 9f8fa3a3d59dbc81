//! Request bodies for resource creation

use resource_spec::{
    ActionGroupSpec, ActivityLogAlertSpec, DependentResourceSpec, PhoneReceiver,
    ResourceGroupSpec, StorageAccountSpec,
};
use serde_json::{json, Value};

pub(super) fn resource_group(spec: &ResourceGroupSpec) -> Value {
    json!({ "location": spec.region.as_str() })
}

pub(super) fn dependent(spec: &DependentResourceSpec) -> Value {
    match spec {
        DependentResourceSpec::StorageAccount(spec) => storage_account(spec),
        DependentResourceSpec::ActionGroup(spec) => action_group(spec),
        DependentResourceSpec::ActivityLogAlert(spec) => activity_log_alert(spec),
    }
}

fn storage_account(spec: &StorageAccountSpec) -> Value {
    json!({
        "location": spec.region.as_str(),
        "sku": { "name": spec.sku.as_str() },
        "kind": spec.kind.as_str(),
        "properties": { "accessTier": spec.access_tier.as_str() }
    })
}

fn action_group(spec: &ActionGroupSpec) -> Value {
    let channels = &spec.channels;

    json!({
        "location": spec.region.as_str(),
        "properties": {
            "groupShortName": spec.short_name,
            "enabled": spec.enabled,
            "azureAppPushReceivers": channels.app_push.iter()
                .map(|r| json!({ "name": r.name, "emailAddress": r.email_address }))
                .collect::<Vec<_>>(),
            "emailReceivers": channels.email.iter()
                .map(|r| json!({ "name": r.name, "emailAddress": r.email_address }))
                .collect::<Vec<_>>(),
            "smsReceivers": phone_receivers(&channels.sms),
            "voiceReceivers": phone_receivers(&channels.voice),
            "webhookReceivers": channels.webhook.iter()
                .map(|r| json!({ "name": r.name, "serviceUri": r.service_uri }))
                .collect::<Vec<_>>(),
        }
    })
}

fn phone_receivers(receivers: &[PhoneReceiver]) -> Vec<Value> {
    receivers
        .iter()
        .map(|r| json!({ "name": r.name, "countryCode": r.country_code, "phoneNumber": r.phone_number }))
        .collect()
}

fn activity_log_alert(spec: &ActivityLogAlertSpec) -> Value {
    json!({
        "location": spec.location.as_str(),
        "properties": {
            "scopes": spec.scopes,
            "condition": {
                "allOf": spec.conditions.iter()
                    .map(|c| json!({ "field": c.field.as_str(), "equals": c.equals }))
                    .collect::<Vec<_>>(),
            },
            "actions": {
                "actionGroups": spec.action_groups.iter()
                    .map(|id| json!({ "actionGroupId": id.as_str() }))
                    .collect::<Vec<_>>(),
            },
            "enabled": spec.enabled,
            "description": spec.description,
        }
    })
}
