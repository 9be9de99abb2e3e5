//! # bd-api
//!
//! HTTP API for Builders RS.
//!
//! JSON (camelCase) over axum. The caller is identified by the `X-User-Id`
//! header; domain errors map onto HTTP statuses through [`error::ApiError`].

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
