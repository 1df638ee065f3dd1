pub mod chatdb;
pub mod db;
pub mod exchangedb;
pub mod notificationdb;
pub mod servicedb;
pub mod userdb;
