//! Axum extractors and shared state for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use bd_core::traits::Id;
use bd_models::User;
use bd_notifications::NotificationStore;
use bd_services::Services;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl AppState {
    pub fn new(services: Arc<Services>, notifications: Arc<dyn NotificationStore>) -> Self {
        Self {
            services,
            notifications,
        }
    }
}

/// Caller identified by the `X-User-Id` header
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Id {
        self.0.id.unwrap_or_default()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<Id>().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user = app_state
            .services
            .repos
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .ok_or_else(|| ApiError::unauthorized(format!("Unknown user {}", user_id)))?;

        Ok(CurrentUser(user))
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
