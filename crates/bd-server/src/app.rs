//! Wiring: repositories, notification pipeline, services and the router

use std::sync::Arc;

use axum::{routing::get, Router};
use bd_api::AppState;
use bd_core::clock::{Clock, SystemClock};
use bd_core::config::AppConfig;
use bd_db::Repositories;
use bd_notifications::{
    BackgroundNotifier, MemoryNotificationStore, NotificationService, NotificationStore, Notifier,
    WebhookChannel, WorkerPool,
};
use bd_services::{seed, CalendarTrigger, Services};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::health::{self, HealthState};

pub struct Application {
    pub services: Arc<Services>,
    pub notifications: Arc<dyn NotificationStore>,
    pub pool: WorkerPool,
}

impl Application {
    /// Wire everything against the wall clock in the configured zone
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.scheduler.tz()?));
        Self::with_clock(config, clock).await
    }

    pub async fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let repos = Repositories::in_memory();
        if config.seed_demo_data {
            seed::seed_demo_data(&repos).await?;
        }

        let pool = WorkerPool::new(config.workers.pool_size);
        let notifications: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new());
        let channel = WebhookChannel::from_config(&config.notifications)?;
        tracing::info!(
            url = channel.url(),
            enabled = config.notifications.external_enabled,
            "Webhook channel configured"
        );
        let pipeline = Arc::new(NotificationService::new(
            Arc::new(channel),
            notifications.clone(),
            clock.clone(),
        ));
        let notifier: Arc<dyn Notifier> = Arc::new(BackgroundNotifier::new(pipeline, pool.clone()));

        let services = Arc::new(Services::new(repos, notifier, clock, pool.clone()));
        Ok(Self {
            services,
            notifications,
            pool,
        })
    }

    pub fn router(&self) -> Router {
        let health_routes = Router::new()
            .route("/health", get(health::health_check))
            .with_state(Arc::new(HealthState::new(self.pool.clone())));

        Router::new()
            .merge(health_routes)
            .merge(bd_api::router(AppState::new(
                self.services.clone(),
                self.notifications.clone(),
            )))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CompressionLayer::new())
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    ),
            )
    }

    /// Arm the daily sweep; stops when `shutdown` is cancelled
    pub fn spawn_trigger(
        &self,
        config: &AppConfig,
        shutdown: CancellationToken,
    ) -> anyhow::Result<Vec<JoinHandle<()>>> {
        if !config.scheduler.enabled {
            tracing::info!("Calendar trigger disabled");
            return Ok(Vec::new());
        }
        let trigger = CalendarTrigger::from_config(
            self.services.lifecycle.clone(),
            self.services.clock.clone(),
            &config.scheduler,
            shutdown,
        )?;
        Ok(trigger.spawn())
    }
}
