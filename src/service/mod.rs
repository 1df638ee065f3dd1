pub mod chat_relay;
pub mod notification_service;
