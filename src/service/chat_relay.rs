// service/chat_relay.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::chatmodel::Message;

const CHANNEL_CAPACITY: usize = 64;

/// One broadcast event per persisted chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub message_id: Uuid,
    pub exchange_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Message> for ChatEvent {
    fn from(message: &Message) -> Self {
        ChatEvent {
            message_id: message.id,
            exchange_id: message.exchange_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }
}

/// In-process pub/sub keyed by exchange id. Persistence and broadcast are
/// two separate steps; a message may land in the database without reaching
/// a live subscriber, which is acceptable since chat history is served from
/// the database.
#[derive(Debug, Default)]
pub struct ChatRelay {
    channels: RwLock<HashMap<Uuid, broadcast::Sender<ChatEvent>>>,
}

impl ChatRelay {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    pub async fn subscribe(&self, exchange_id: Uuid) -> broadcast::Receiver<ChatEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(exchange_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Best-effort fanout; drops the channel again once the last
    /// subscriber is gone.
    pub async fn publish(&self, exchange_id: Uuid, event: ChatEvent) {
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&exchange_id) {
                Some(sender) => sender.send(event).is_ok(),
                None => return,
            }
        };

        if !delivered {
            let mut channels = self.channels.write().await;
            if let Some(sender) = channels.get(&exchange_id) {
                if sender.receiver_count() == 0 {
                    channels.remove(&exchange_id);
                }
            }
        }
    }

    pub async fn subscriber_count(&self, exchange_id: Uuid) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(&exchange_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(exchange_id: Uuid, content: &str) -> ChatEvent {
        ChatEvent {
            message_id: Uuid::new_v4(),
            exchange_id,
            sender_id: Uuid::new_v4(),
            content: content.to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let relay = ChatRelay::new();
        let exchange_id = Uuid::new_v4();

        let mut rx = relay.subscribe(exchange_id).await;
        relay.publish(exchange_id, event(exchange_id, "hello")).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.content, "hello");
        assert_eq!(received.exchange_id, exchange_id);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let relay = ChatRelay::new();
        let exchange_id = Uuid::new_v4();

        relay.publish(exchange_id, event(exchange_id, "lost")).await;
        assert_eq!(relay.subscriber_count(exchange_id).await, 0);
    }

    #[tokio::test]
    async fn channels_are_scoped_per_exchange() {
        let relay = ChatRelay::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut rx_a = relay.subscribe(a).await;
        let mut rx_b = relay.subscribe(b).await;

        relay.publish(a, event(a, "for a")).await;

        assert_eq!(rx_a.recv().await.unwrap().content, "for a");
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_subscribers_release_the_channel() {
        let relay = ChatRelay::new();
        let exchange_id = Uuid::new_v4();

        let rx = relay.subscribe(exchange_id).await;
        assert_eq!(relay.subscriber_count(exchange_id).await, 1);
        drop(rx);

        relay.publish(exchange_id, event(exchange_id, "gone")).await;
        assert_eq!(relay.subscriber_count(exchange_id).await, 0);
    }
}
