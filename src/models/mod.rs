pub mod chatmodel;
pub mod exchangemodel;
pub mod notificationmodel;
pub mod servicemodel;
pub mod usermodel;
