pub mod notification;

pub use notification::{CallbackEnvelope, Notification, OrderNotice, RefundNotice};
