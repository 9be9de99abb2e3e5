//! Notification storage
//!
//! Append-only feeds: one global list plus one list per user.

use std::collections::HashMap;

use async_trait::async_trait;
use bd_core::traits::Id;
use tokio::sync::RwLock;

use crate::event::NotificationEvent;

/// Notification storage trait
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn append_global(&self, event: NotificationEvent);

    async fn append_for_user(&self, user_id: Id, event: NotificationEvent);

    /// Global feed in arrival order
    async fn list_global(&self) -> Vec<NotificationEvent>;

    /// A user's feed in arrival order
    async fn list_for_user(&self, user_id: Id) -> Vec<NotificationEvent>;

    async fn clear_global(&self);

    async fn clear_for_user(&self, user_id: Id);
}

/// In-memory notification store
pub struct MemoryNotificationStore {
    global: RwLock<Vec<NotificationEvent>>,
    by_user: RwLock<HashMap<Id, Vec<NotificationEvent>>>,
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            global: RwLock::new(Vec::new()),
            by_user: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn append_global(&self, event: NotificationEvent) {
        self.global.write().await.push(event);
    }

    async fn append_for_user(&self, user_id: Id, event: NotificationEvent) {
        self.by_user
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(event);
    }

    async fn list_global(&self) -> Vec<NotificationEvent> {
        self.global.read().await.clone()
    }

    async fn list_for_user(&self, user_id: Id) -> Vec<NotificationEvent> {
        self.by_user
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn clear_global(&self) {
        self.global.write().await.clear();
    }

    async fn clear_for_user(&self, user_id: Id) {
        self.by_user.write().await.remove(&user_id);
    }
}
