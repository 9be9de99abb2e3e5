//! Notification Service
//!
//! enrich -> dispatch -> persist. Dispatch errors are logged and turned into
//! a degraded record; nothing here returns an error to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use bd_core::clock::Clock;
use bd_core::traits::Id;

use crate::channels::ChannelHandler;
use crate::event::NotificationEvent;
use crate::jobs::WorkerPool;
use crate::storage::NotificationStore;

/// Best-effort notification sink used by the business workflows
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish to the global feed
    async fn send(&self, event: NotificationEvent);

    /// Publish to one user's feed
    async fn send_for_user(&self, event: NotificationEvent, user_id: Id);

    /// Global feed plus the given user's feed
    async fn broadcast(&self, event: NotificationEvent, user_id: Id) {
        self.send(event.clone()).await;
        self.send_for_user(event, user_id).await;
    }
}

/// Runs the pipeline inline
pub struct NotificationService {
    channel: Arc<dyn ChannelHandler>,
    store: Arc<dyn NotificationStore>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(
        channel: Arc<dyn ChannelHandler>,
        store: Arc<dyn NotificationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            channel,
            store,
            clock,
        }
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    /// Run the full pipeline and return the persisted record
    pub async fn dispatch(&self, event: NotificationEvent) -> NotificationEvent {
        let record = self.enrich_and_deliver(event).await;
        self.store.append_global(record.clone()).await;
        record
    }

    /// Same as [`dispatch`](Self::dispatch), addressed to one user
    pub async fn dispatch_for_user(&self, event: NotificationEvent, user_id: Id) -> NotificationEvent {
        let record = self.enrich_and_deliver(event.for_user(user_id)).await;
        self.store.append_for_user(user_id, record.clone()).await;
        record
    }

    async fn enrich_and_deliver(&self, event: NotificationEvent) -> NotificationEvent {
        let event = event.enrich(self.clock.now());

        if !self.channel.is_available() {
            tracing::debug!(event_type = %event.event_type, "External dispatch disabled");
            return event;
        }

        match self.channel.deliver(&event).await {
            Ok(result) => {
                tracing::debug!(
                    event_type = %event.event_type,
                    channel = result.channel,
                    attempts = result.attempts,
                    "Notification delivered"
                );
                event
            }
            Err(e) => {
                tracing::warn!(
                    event_type = %event.event_type,
                    channel = self.channel.name(),
                    error = %e,
                    "Notification delivery failed, persisting placeholder"
                );
                event.degrade()
            }
        }
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn send(&self, event: NotificationEvent) {
        self.dispatch(event).await;
    }

    async fn send_for_user(&self, event: NotificationEvent, user_id: Id) {
        self.dispatch_for_user(event, user_id).await;
    }
}

/// Hands each notification to the worker pool and returns immediately
#[derive(Clone)]
pub struct BackgroundNotifier {
    service: Arc<NotificationService>,
    pool: WorkerPool,
}

impl BackgroundNotifier {
    pub fn new(service: Arc<NotificationService>, pool: WorkerPool) -> Self {
        Self { service, pool }
    }
}

#[async_trait]
impl Notifier for BackgroundNotifier {
    async fn send(&self, event: NotificationEvent) {
        let service = self.service.clone();
        self.pool.spawn("notification", async move {
            service.dispatch(event).await;
        });
    }

    async fn send_for_user(&self, event: NotificationEvent, user_id: Id) {
        let service = self.service.clone();
        self.pool.spawn("notification", async move {
            service.dispatch_for_user(event, user_id).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{ChannelError, ChannelResult, DeliveryResult, RetryPolicy, WebhookChannel};
    use crate::event::EventType;
    use crate::storage::MemoryNotificationStore;
    use bd_core::clock::FixedClock;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct CountingChannel {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl ChannelHandler for CountingChannel {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn deliver(&self, _event: &NotificationEvent) -> ChannelResult<DeliveryResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ChannelError::HttpStatus(500))
            } else {
                Ok(DeliveryResult {
                    channel: "counting",
                    attempts: 1,
                })
            }
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()))
    }

    fn event() -> NotificationEvent {
        NotificationEvent::new(EventType::OrderCreated, serde_json::json!({"orderId": 5}))
    }

    #[tokio::test]
    async fn test_dispatch_enriches_and_persists() {
        let channel = Arc::new(CountingChannel {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let store = Arc::new(MemoryNotificationStore::new());
        let clock = clock();
        let service = NotificationService::new(channel.clone(), store.clone(), clock.clone());

        let record = service.dispatch(event()).await;
        assert_eq!(record.timestamp, Some(clock.now()));
        assert_eq!(record.payload["orderId"], 5);
        assert_eq!(store.list_global().await, vec![record]);
        assert_eq!(channel.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_persists_placeholder() {
        let channel = Arc::new(CountingChannel {
            calls: AtomicU32::new(0),
            fail: true,
        });
        let store = Arc::new(MemoryNotificationStore::new());
        let service = NotificationService::new(channel, store.clone(), clock());

        let record = service.dispatch_for_user(event(), 4).await;
        assert!(record.is_degraded());
        assert_eq!(record.user_id, Some(4));
        assert_eq!(store.list_for_user(4).await.len(), 1);
        assert!(store.list_global().await.is_empty());
    }

    #[tokio::test]
    async fn test_webhook_exhaustion_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let channel = WebhookChannel::new(server.uri(), Duration::from_secs(2))
            .unwrap()
            .with_retry(RetryPolicy {
                max_attempts: 3,
                backoff: Duration::from_millis(5),
            });
        let store = Arc::new(MemoryNotificationStore::new());
        let service = NotificationService::new(Arc::new(channel), store.clone(), clock());

        service.send(event()).await;
        let feed = store.list_global().await;
        assert_eq!(feed.len(), 1);
        assert!(feed[0].is_degraded());
    }

    #[tokio::test]
    async fn test_disabled_channel_skips_dispatch() {
        let channel = WebhookChannel::new("http://127.0.0.1:9", Duration::from_secs(1))
            .unwrap()
            .with_enabled(false);
        let store = Arc::new(MemoryNotificationStore::new());
        let service = NotificationService::new(Arc::new(channel), store.clone(), clock());

        let record = service.dispatch(event()).await;
        assert!(!record.is_degraded());
        assert_eq!(store.list_global().await.len(), 1);
    }

    #[tokio::test]
    async fn test_background_notifier_broadcasts() {
        let channel = Arc::new(CountingChannel {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let store = Arc::new(MemoryNotificationStore::new());
        let service = Arc::new(NotificationService::new(channel, store.clone(), clock()));
        let pool = WorkerPool::new(4);
        let notifier = BackgroundNotifier::new(service, pool.clone());

        notifier.broadcast(event(), 9).await;
        pool.wait_idle().await;

        assert_eq!(store.list_global().await.len(), 1);
        assert_eq!(store.list_for_user(9).await.len(), 1);
    }
}
