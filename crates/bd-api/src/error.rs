//! API error handling
//!
//! Every failure leaves the API as `{ "_type": "Error", "errorIdentifier", "message" }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bd_core::error::{BdError, ValidationErrors};
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "urn:builders:api:errors:NotFound",
            ApiError::Validation(_) => "urn:builders:api:errors:PropertyConstraintViolation",
            ApiError::Unauthorized(_) => "urn:builders:api:errors:Unauthenticated",
            ApiError::Forbidden(_) => "urn:builders:api:errors:MissingPermission",
            ApiError::BadRequest(_) => "urn:builders:api:errors:InvalidRequest",
            ApiError::Conflict(_) => "urn:builders:api:errors:Conflict",
            ApiError::Internal(_) => "urn:builders:api:errors:InternalError",
        }
    }
}

impl From<BdError> for ApiError {
    fn from(err: BdError) -> Self {
        match err {
            BdError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            BdError::Validation(errors) => ApiError::Validation(errors),
            BdError::Unauthorized { message } => ApiError::Unauthorized(message),
            BdError::Forbidden { message } => ApiError::Forbidden(message),
            BdError::Conflict { message } => ApiError::Conflict(message),
            other => {
                tracing::error!(code = other.error_code(), error = %other, "Request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "errorIdentifier")]
    error_identifier: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_identifier = self.identifier();
        let message = match self {
            ApiError::Validation(errors) => errors.full_messages().join(", "),
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        };

        (
            status,
            Json(ErrorBody {
                type_name: "Error",
                error_identifier,
                message,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
