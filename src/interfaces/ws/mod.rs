//! WebSocket interfaces

pub mod notifications;

pub use notifications::{ws_notifications_handler, EventFilter, NotificationQuery};
