use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::notifications::InsertNotificationEntity,
    value_objects::enums::notification_kinds::NotificationKind,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MarkAllReadDto {
    pub updated: usize,
}

fn notification(
    gym_id: Uuid,
    kind: NotificationKind,
    title: &str,
    body: String,
    reference: Option<String>,
) -> InsertNotificationEntity {
    InsertNotificationEntity {
        gym_id,
        kind: kind.to_string(),
        title: title.to_string(),
        body,
        reference,
    }
}

pub fn payment_received(
    gym_id: Uuid,
    member_name: &str,
    amount_minor: i32,
    invoice_id: Uuid,
) -> InsertNotificationEntity {
    notification(
        gym_id,
        NotificationKind::PaymentReceived,
        "Payment received",
        format!("{member_name} paid an invoice in full ({amount_minor} minor units)."),
        Some(invoice_id.to_string()),
    )
}

pub fn subscription_activated(
    gym_id: Uuid,
    plan_name: &str,
    period_end: DateTime<Utc>,
    gateway_order_id: &str,
) -> InsertNotificationEntity {
    notification(
        gym_id,
        NotificationKind::SubscriptionActivated,
        "Subscription active",
        format!(
            "Your {plan_name} plan is active until {}.",
            period_end.format("%Y-%m-%d")
        ),
        Some(gateway_order_id.to_string()),
    )
}

/// `reference` is the period end, so one notice is sent per period.
pub fn subscription_expiring(gym_id: Uuid, period_end: DateTime<Utc>) -> InsertNotificationEntity {
    notification(
        gym_id,
        NotificationKind::SubscriptionExpiring,
        "Subscription ending soon",
        format!(
            "Your subscription ends on {}. Renew to keep access.",
            period_end.format("%Y-%m-%d")
        ),
        Some(period_end.timestamp().to_string()),
    )
}

pub fn subscription_past_due(gym_id: Uuid, grace_ends_at: DateTime<Utc>) -> InsertNotificationEntity {
    notification(
        gym_id,
        NotificationKind::SubscriptionPastDue,
        "Payment overdue",
        format!(
            "Your subscription period has ended. Access continues until {}.",
            grace_ends_at.format("%Y-%m-%d")
        ),
        None,
    )
}

pub fn subscription_expired(gym_id: Uuid) -> InsertNotificationEntity {
    notification(
        gym_id,
        NotificationKind::SubscriptionExpired,
        "Subscription expired",
        "Your subscription has expired. Purchase a plan to restore access.".to_string(),
        None,
    )
}

pub fn ticket_updated(gym_id: Uuid, subject: &str, status: &str, ticket_id: Uuid) -> InsertNotificationEntity {
    notification(
        gym_id,
        NotificationKind::TicketUpdated,
        "Support ticket updated",
        format!("Ticket \"{subject}\" is now {status}."),
        Some(ticket_id.to_string()),
    )
}
