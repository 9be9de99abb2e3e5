//! Builders RS Server
//!
//! HTTP server and daily lifecycle sweep for the construction request engine.

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bd_core::config::AppConfig;

mod app;
mod health;

use app::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        timezone = %config.scheduler.timezone,
        "Starting Builders RS"
    );

    let application = Application::build(&config).await?;

    let shutdown = CancellationToken::new();
    let trigger_tasks = application.spawn_trigger(&config, shutdown.clone())?;

    let addr = config.server_addr();
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, application.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    futures::future::join_all(trigger_tasks).await;
    application.pool.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,bd_server=debug,bd_services=debug,bd_api=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use bd_core::clock::FixedClock;
    use chrono::NaiveDate;
    use tower::ServiceExt;

    async fn test_app(seed: bool) -> (Application, Router) {
        let mut config = AppConfig::default();
        config.seed_demo_data = seed;
        config.notifications.external_enabled = false;
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()));
        let application = Application::with_clock(&config, clock).await.unwrap();
        let router = application.router();
        (application, router)
    }

    async fn get(router: Router, uri: &str, user: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(user) = user {
            request = request.header("x-user-id", user);
        }
        let response = router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_, router) = test_app(false).await;
        let (status, body) = get(router, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["pendingJobs"], 0);
    }

    #[tokio::test]
    async fn test_seeded_catalog_is_served() {
        let (_, router) = test_app(true).await;
        let (status, body) = get(router, "/api/construction-types", Some("1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(|a| a.len()), Some(5));
    }

    #[tokio::test]
    async fn test_unseeded_server_has_no_users() {
        let (_, router) = test_app(false).await;
        let (status, _) = get(router, "/api/materials", Some("1")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_disabled_trigger_spawns_nothing() {
        let (application, _) = test_app(false).await;
        let mut config = AppConfig::default();
        config.scheduler.enabled = false;
        let tasks = application
            .spawn_trigger(&config, CancellationToken::new())
            .unwrap();
        assert!(tasks.is_empty());
    }
}
