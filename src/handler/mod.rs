pub mod auth;
pub mod chat;
pub mod exchange;
pub mod notification_handler;
pub mod rating;
pub mod services;
pub mod users;
