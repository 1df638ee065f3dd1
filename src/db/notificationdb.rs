// db/notificationdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::{Notification, NotificationType};

#[async_trait]
pub trait NotificationExt {
    async fn create_notification(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        notification_type: NotificationType,
        message: String,
        exchange_id: Option<Uuid>,
    ) -> Result<Notification, sqlx::Error>;

    async fn get_notifications(
        &self,
        recipient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error>;

    async fn get_unread_notification_count(&self, recipient_id: Uuid)
        -> Result<i64, sqlx::Error>;

    /// Marks the given notifications read, or every unread one when
    /// `notification_ids` is `None`. Recipient-scoped either way.
    async fn mark_notifications_read(
        &self,
        recipient_id: Uuid,
        notification_ids: Option<Vec<Uuid>>,
    ) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        notification_type: NotificationType,
        message: String,
        exchange_id: Option<Uuid>,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications
                (recipient_id, sender_id, notification_type, message, exchange_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, recipient_id, sender_id, notification_type, message,
                      exchange_id, is_read, created_at
            "#,
        )
        .bind(recipient_id)
        .bind(sender_id)
        .bind(notification_type)
        .bind(message)
        .bind(exchange_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_notifications(
        &self,
        recipient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, recipient_id, sender_id, notification_type, message,
                   exchange_id, is_read, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_unread_notification_count(
        &self,
        recipient_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE recipient_id = $1 AND is_read = false
            "#,
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_notifications_read(
        &self,
        recipient_id: Uuid,
        notification_ids: Option<Vec<Uuid>>,
    ) -> Result<u64, sqlx::Error> {
        let result = match notification_ids {
            Some(ids) => {
                sqlx::query(
                    r#"
                    UPDATE notifications
                    SET is_read = true
                    WHERE recipient_id = $1 AND id = ANY($2)
                    "#,
                )
                .bind(recipient_id)
                .bind(ids)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE notifications
                    SET is_read = true
                    WHERE recipient_id = $1 AND is_read = false
                    "#,
                )
                .bind(recipient_id)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected())
    }
}
