pub mod exchangedtos;
pub mod notificationdtos;
pub mod response;
pub mod servicedtos;
pub mod userdtos;
