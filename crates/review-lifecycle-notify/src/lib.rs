pub mod dispatcher;
pub mod error;
pub mod log;
pub mod notification;
pub mod sendgrid;

pub use dispatcher::NotificationDispatcher;
pub use error::DispatchError;
pub use log::LogDispatcher;
pub use notification::{Notification, NotificationKind};
pub use sendgrid::SendGridDispatcher;
