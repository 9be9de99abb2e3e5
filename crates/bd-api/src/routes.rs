//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{catalog, cron, metrics, notifications, orders, projects, requests};

/// Create the complete API router
pub fn router(state: AppState) -> Router {
    Router::new().nest("/api", api_router()).with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/requests", requests_router())
        .nest("/orders", orders_router())
        .nest("/projects", projects_router())
        .nest("/materials", materials_router())
        .nest("/construction-types", construction_types_router())
        .nest("/notifications", notifications_router())
        .route("/cron/:action", post(cron::run_phase))
        .nest("/metrics", metrics_router())
        .nest("/reports", reports_router())
}

fn requests_router() -> Router<AppState> {
    Router::new()
        .route("/", get(requests::list_requests).post(requests::submit_request))
        .route("/:id", get(requests::get_request))
}

fn orders_router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders))
        .route("/:id", get(orders::get_order))
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route(
            "/:id",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
}

fn materials_router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::list_materials).post(catalog::create_material))
        .route(
            "/:id",
            get(catalog::get_material).patch(catalog::update_material),
        )
        .route("/:id/restock", post(catalog::restock_material))
}

fn construction_types_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::list_construction_types).post(catalog::create_construction_type),
        )
        .route(
            "/:id",
            get(catalog::get_construction_type).patch(catalog::update_construction_type),
        )
}

fn notifications_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::list_global).delete(notifications::clear_global),
        )
        .route(
            "/by-user",
            get(notifications::list_for_user).delete(notifications::clear_for_user),
        )
}

fn metrics_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(metrics::status_counts))
        .route("/types", get(metrics::type_stats))
        .route("/projects/:id/types", get(metrics::project_type_stats))
}

fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(metrics::orders_report))
        .route("/summary", get(metrics::construction_summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use bd_core::clock::FixedClock;
    use bd_core::traits::Id;
    use bd_db::Repositories;
    use bd_notifications::{MemoryNotificationStore, NotificationService, WebhookChannel, WorkerPool};
    use bd_services::{seed, Services};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::extractors::USER_ID_HEADER;

    struct TestApp {
        router: Router,
        services: Arc<Services>,
        architect: Id,
        plain_user: Id,
    }

    async fn test_app() -> TestApp {
        let repos = Repositories::in_memory();
        seed::seed_demo_data(&repos).await.unwrap();
        let architect = repos.users.find_by_username("arq1").await.unwrap().unwrap().id.unwrap();
        let plain_user = repos.users.find_by_username("user1").await.unwrap().unwrap().id.unwrap();

        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()));
        let store = Arc::new(MemoryNotificationStore::new());
        let channel = WebhookChannel::new("http://localhost:9/webhook", Duration::from_millis(50))
            .unwrap()
            .with_enabled(false);
        let notifier = Arc::new(NotificationService::new(
            Arc::new(channel),
            store.clone(),
            clock.clone(),
        ));
        let services = Arc::new(Services::new(repos, notifier, clock, WorkerPool::new(2)));

        TestApp {
            router: router(AppState::new(services.clone(), store)),
            services,
            architect,
            plain_user,
        }
    }

    async fn call(
        app: &TestApp,
        method: Method,
        uri: &str,
        user: Option<Id>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_project(app: &TestApp, name: &str) -> Id {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/projects",
            Some(app.architect),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_missing_or_unknown_user_is_unauthorized() {
        let app = test_app().await;
        let (status, body) = call(&app, Method::GET, "/api/projects", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["_type"], "Error");

        let (status, _) = call(&app, Method::GET, "/api/projects", Some(999), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_to_order_flow() {
        let app = test_app().await;
        let project_id = create_project(&app, "Ciudadela").await;
        let house = app
            .services
            .repos
            .construction_types
            .find_by_name("HOUSE")
            .await
            .unwrap()
            .unwrap()
            .id
            .unwrap();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/requests",
            Some(app.architect),
            Some(json!({
                "projectId": project_id,
                "constructionTypeId": house,
                "latitude": 4.6,
                "longitude": -74.08
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "PENDING");
        app.services.pool.wait_idle().await;

        let (status, orders) = call(&app, Method::GET, "/api/orders", Some(app.architect), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders.as_array().unwrap().len(), 1);
        assert_eq!(orders[0]["scheduledStartDate"], "2025-01-11");
        assert_eq!(orders[0]["scheduledEndDate"], "2025-01-15");

        let (_, approved) = call(
            &app,
            Method::GET,
            "/api/requests?status=APPROVED",
            Some(app.architect),
            None,
        )
        .await;
        assert_eq!(approved.as_array().unwrap().len(), 1);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/cron/start?date=2025-01-11",
            Some(app.architect),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "action": "start", "dateUsed": "2025-01-11", "status": "OK", "affected": 1 })
        );

        let (_, counts) = call(&app, Method::GET, "/api/metrics/status", Some(app.architect), None).await;
        assert_eq!(counts[1], json!({ "status": "IN_PROGRESS", "count": 1 }));

        let (_, feed) = call(&app, Method::GET, "/api/notifications", Some(app.architect), None).await;
        let kinds: Vec<&str> = feed
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["eventType"].as_str())
            .collect();
        assert!(kinds.contains(&"CONSTRUCTION_REQUEST_CREATED"));
        assert!(kinds.contains(&"ORDER_CREATED"));
        assert!(kinds.contains(&"ORDER_STARTED"));
    }

    #[tokio::test]
    async fn test_plain_user_cannot_submit() {
        let app = test_app().await;
        let project_id = create_project(&app, "Riverside").await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/requests",
            Some(app.plain_user),
            Some(json!({
                "projectId": project_id,
                "constructionTypeId": 1,
                "latitude": 1.0,
                "longitude": 1.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["errorIdentifier"], "urn:builders:api:errors:MissingPermission");
    }

    #[tokio::test]
    async fn test_invalid_request_payload() {
        let app = test_app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/requests",
            Some(app.architect),
            Some(json!({ "projectId": 1, "constructionTypeId": 1, "latitude": 120.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("latitude must be between -90 and 90"), "{message}");
        assert!(message.contains("longitude can't be blank"), "{message}");
    }

    #[tokio::test]
    async fn test_cron_date_handling() {
        let app = test_app().await;

        let (status, body) = call(&app, Method::POST, "/api/cron/all?date=", Some(app.architect), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dateUsed"], "2025-01-10");
        assert_eq!(body["affected"], 0);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/cron/finish?date=10-01-2025",
            Some(app.architect),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::POST, "/api/cron/lunch", Some(app.architect), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_project_crud() {
        let app = test_app().await;
        let id = create_project(&app, "Harbor").await;

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/projects",
            Some(app.architect),
            Some(json!({ "name": "Harbor" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(
            &app,
            Method::PATCH,
            &format!("/api/projects/{id}"),
            Some(app.architect),
            Some(json!({ "description": "east pier" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "east pier");

        let (status, _) = call(&app, Method::DELETE, &format!("/api/projects/{id}"), Some(app.architect), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, &format!("/api/projects/{id}"), Some(app.architect), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_restock_material() {
        let app = test_app().await;
        let cement = app.services.repos.materials.find_by_code("Ce").await.unwrap().unwrap();
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/materials/{}/restock", cement.id.unwrap()),
            Some(app.architect),
            Some(json!({ "quantity": 250.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock"], 1250.0);
    }

    #[tokio::test]
    async fn test_edit_catalog_entries() {
        let app = test_app().await;
        let repos = &app.services.repos;
        let sand = repos.materials.find_by_code("Ar").await.unwrap().unwrap();
        let gym = repos.construction_types.find_by_name("GYM").await.unwrap().unwrap();

        let (status, body) = call(
            &app,
            Method::PATCH,
            &format!("/api/materials/{}", sand.id.unwrap()),
            Some(app.architect),
            Some(json!({ "unit": "m3" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["unit"], "m3");
        assert_eq!(body["stock"], 2500.0);

        let (status, body) = call(
            &app,
            Method::PATCH,
            &format!("/api/construction-types/{}", gym.id.unwrap()),
            Some(app.architect),
            Some(json!({
                "durationDays": 7,
                "recipe": [{ "materialId": sand.id.unwrap(), "quantity": 12.5 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["durationDays"], 7);
        assert_eq!(body["recipe"].as_array().unwrap().len(), 1);

        let (status, _) = call(
            &app,
            Method::PATCH,
            &format!("/api/construction-types/{}", gym.id.unwrap()),
            Some(app.architect),
            Some(json!({ "durationDays": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
