use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::notificationmodel::Notification;

#[derive(Validate, Debug, Deserialize)]
pub struct PaginationParams {
    #[validate(range(min = 1))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

/// Omitting `notification_ids` marks everything unread as read.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub notification_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct NotificationListDto {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
    pub page: u32,
    pub limit: u32,
}
