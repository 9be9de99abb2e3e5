//! # bd-notifications
//!
//! Notifications and background job processing for Builders RS.
//!
//! Every state change of the lifecycle engine produces a [`NotificationEvent`].
//! The pipeline stamps it, posts it to the configured webhook with a fixed
//! retry policy, and persists it to the global feed and/or a user's feed.
//! Delivery failures never reach the caller: the record is persisted with a
//! placeholder payload instead.

pub mod channels;
pub mod event;
pub mod jobs;
pub mod service;
pub mod storage;

pub use channels::{ChannelHandler, DeliveryResult, RetryPolicy, WebhookChannel};
pub use event::{EventType, NotificationEvent};
pub use jobs::WorkerPool;
pub use service::{BackgroundNotifier, NotificationService, Notifier};
pub use storage::{MemoryNotificationStore, NotificationStore};
