//! Action group descriptor and notification channels

use crate::region::Region;

/// Provider-imposed limit on the action group short name
pub const MAX_SHORT_NAME_LEN: usize = 12;

/// Mobile app push notification target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPushReceiver {
    pub name: String,
    pub email_address: String,
}

/// Email notification target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailReceiver {
    pub name: String,
    pub email_address: String,
}

/// SMS or voice call target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneReceiver {
    pub name: String,
    pub country_code: String,
    pub phone_number: String,
}

/// HTTP callback target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReceiver {
    pub name: String,
    pub service_uri: String,
}

/// Receivers attached to an action group, partitioned by channel.
///
/// Receiver names must be unique within a channel; the provider enforces
/// that, not this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationChannelSet {
    pub app_push: Vec<AppPushReceiver>,
    pub email: Vec<EmailReceiver>,
    pub sms: Vec<PhoneReceiver>,
    pub voice: Vec<PhoneReceiver>,
    pub webhook: Vec<WebhookReceiver>,
}

impl NotificationChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_push(mut self, name: &str, email_address: &str) -> Self {
        self.app_push.push(AppPushReceiver {
            name: name.to_string(),
            email_address: email_address.to_string(),
        });
        self
    }

    pub fn with_email(mut self, name: &str, email_address: &str) -> Self {
        self.email.push(EmailReceiver {
            name: name.to_string(),
            email_address: email_address.to_string(),
        });
        self
    }

    pub fn with_sms(mut self, name: &str, country_code: &str, phone_number: &str) -> Self {
        self.sms.push(PhoneReceiver {
            name: name.to_string(),
            country_code: country_code.to_string(),
            phone_number: phone_number.to_string(),
        });
        self
    }

    pub fn with_voice(mut self, name: &str, country_code: &str, phone_number: &str) -> Self {
        self.voice.push(PhoneReceiver {
            name: name.to_string(),
            country_code: country_code.to_string(),
            phone_number: phone_number.to_string(),
        });
        self
    }

    pub fn with_webhook(mut self, name: &str, service_uri: &str) -> Self {
        self.webhook.push(WebhookReceiver {
            name: name.to_string(),
            service_uri: service_uri.to_string(),
        });
        self
    }

    /// Total receivers across every channel
    pub fn receiver_count(&self) -> usize {
        self.app_push.len() + self.email.len() + self.sms.len() + self.voice.len() + self.webhook.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver_count() == 0
    }
}

/// Action group to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGroupSpec {
    pub name: String,
    pub region: Region,
    /// Display name used in SMS and email notifications
    pub short_name: String,
    pub enabled: bool,
    pub channels: NotificationChannelSet,
}
