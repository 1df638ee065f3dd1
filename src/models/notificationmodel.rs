use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ExchangeRequest,
    ExchangeAccepted,
    ExchangeDeclined,
    ExchangeScheduled,
    ExchangeCompleted,
    ExchangeCancelled,
    Message,
}

impl NotificationType {
    pub fn to_str(&self) -> &str {
        match self {
            NotificationType::ExchangeRequest => "exchange_request",
            NotificationType::ExchangeAccepted => "exchange_accepted",
            NotificationType::ExchangeDeclined => "exchange_declined",
            NotificationType::ExchangeScheduled => "exchange_scheduled",
            NotificationType::ExchangeCompleted => "exchange_completed",
            NotificationType::ExchangeCancelled => "exchange_cancelled",
            NotificationType::Message => "message",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    pub notification_type: NotificationType,
    pub message: String,
    pub exchange_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}
