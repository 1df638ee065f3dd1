use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only chat log scoped to one exchange.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub exchange_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}
