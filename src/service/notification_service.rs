// service/notification_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{db::DBClient, notificationdb::NotificationExt},
    models::{
        exchangemodel::Exchange,
        notificationmodel::NotificationType,
    },
};

/// Writes notification rows as a side effect of exchange transitions.
/// Delivery is best-effort: a failed write is logged and never rolls back
/// the already-committed status change.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn notify_exchange_requested(&self, exchange: &Exchange, service_title: &str) {
        self.store(
            exchange.provider_id,
            exchange.requester_id,
            NotificationType::ExchangeRequest,
            format!("You have a new exchange request for \"{}\"", service_title),
            Some(exchange.id),
        )
        .await;
    }

    pub async fn notify_exchange_accepted(&self, exchange: &Exchange) {
        self.store(
            exchange.requester_id,
            exchange.provider_id,
            NotificationType::ExchangeAccepted,
            "Your exchange request was accepted".to_string(),
            Some(exchange.id),
        )
        .await;
    }

    pub async fn notify_exchange_declined(&self, exchange: &Exchange) {
        self.store(
            exchange.requester_id,
            exchange.provider_id,
            NotificationType::ExchangeDeclined,
            "Your exchange request was declined".to_string(),
            Some(exchange.id),
        )
        .await;
    }

    pub async fn notify_exchange_scheduled(&self, exchange: &Exchange, actor_id: Uuid) {
        let when = exchange
            .scheduled_date
            .map(|date| date.format("%B %e, %Y at %H:%M UTC").to_string())
            .unwrap_or_else(|| "a new date".to_string());

        self.store(
            exchange.other_party(actor_id),
            actor_id,
            NotificationType::ExchangeScheduled,
            format!("Your exchange was scheduled for {}", when),
            Some(exchange.id),
        )
        .await;
    }

    pub async fn notify_exchange_completed(&self, exchange: &Exchange, actor_id: Uuid) {
        self.store(
            exchange.other_party(actor_id),
            actor_id,
            NotificationType::ExchangeCompleted,
            "Your exchange was marked as completed. You can now rate your counterpart"
                .to_string(),
            Some(exchange.id),
        )
        .await;
    }

    pub async fn notify_exchange_cancelled(&self, exchange: &Exchange, actor_id: Uuid) {
        self.store(
            exchange.other_party(actor_id),
            actor_id,
            NotificationType::ExchangeCancelled,
            "Your exchange was cancelled".to_string(),
            Some(exchange.id),
        )
        .await;
    }

    pub async fn notify_new_message(&self, exchange: &Exchange, sender_id: Uuid) {
        self.store(
            exchange.other_party(sender_id),
            sender_id,
            NotificationType::Message,
            "You have a new message".to_string(),
            Some(exchange.id),
        )
        .await;
    }

    async fn store(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        notification_type: NotificationType,
        message: String,
        exchange_id: Option<Uuid>,
    ) {
        tracing::debug!(
            "notification {} -> {}: {}",
            notification_type.to_str(),
            recipient_id,
            message
        );

        if let Err(e) = self
            .db_client
            .create_notification(recipient_id, sender_id, notification_type, message, exchange_id)
            .await
        {
            tracing::warn!(
                "failed to store {} notification for {}: {}",
                notification_type.to_str(),
                recipient_id,
                e
            );
        }
    }
}
