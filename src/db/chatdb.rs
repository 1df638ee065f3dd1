// db/chatdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::Message;

#[async_trait]
pub trait ChatExt {
    async fn create_message(
        &self,
        exchange_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, sqlx::Error>;

    /// Oldest-first so the client can render top-down; `limit` takes the
    /// most recent messages.
    async fn get_exchange_messages(
        &self,
        exchange_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn create_message(
        &self,
        exchange_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (exchange_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, exchange_id, sender_id, content, created_at
            "#,
        )
        .bind(exchange_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_exchange_messages(
        &self,
        exchange_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, exchange_id, sender_id, content, created_at
            FROM (
                SELECT id, exchange_id, sender_id, content, created_at
                FROM messages
                WHERE exchange_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(exchange_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
