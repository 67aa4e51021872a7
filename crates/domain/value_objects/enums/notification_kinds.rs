use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PaymentReceived,
    SubscriptionActivated,
    SubscriptionExpiring,
    SubscriptionPastDue,
    SubscriptionExpired,
    TicketUpdated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PaymentReceived => "payment_received",
            NotificationKind::SubscriptionActivated => "subscription_activated",
            NotificationKind::SubscriptionExpiring => "subscription_expiring",
            NotificationKind::SubscriptionPastDue => "subscription_past_due",
            NotificationKind::SubscriptionExpired => "subscription_expired",
            NotificationKind::TicketUpdated => "ticket_updated",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "payment_received" => Some(NotificationKind::PaymentReceived),
            "subscription_activated" => Some(NotificationKind::SubscriptionActivated),
            "subscription_expiring" => Some(NotificationKind::SubscriptionExpiring),
            "subscription_past_due" => Some(NotificationKind::SubscriptionPastDue),
            "subscription_expired" => Some(NotificationKind::SubscriptionExpired),
            "ticket_updated" => Some(NotificationKind::TicketUpdated),
            _ => None,
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
