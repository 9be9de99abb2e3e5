//! Core error types for Builders RS
//!
//! One taxonomy shared by every crate: validation, conflict, authorization,
//! not-found, fatal configuration and external dispatch failures.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::traits::Entity;

/// Core error type for all Builders operations
#[derive(Error, Debug)]
pub enum BdError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Non-retryable misconfiguration (e.g. a construction type without a usable duration)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BdError {
    /// Not-found error keyed on the entity's primary key
    pub fn not_found<E: Entity>(id: impl std::fmt::Display) -> Self {
        BdError::NotFound {
            entity: E::TYPE_NAME,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        BdError::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        BdError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        BdError::Conflict {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            BdError::NotFound { .. } => 404,
            BdError::Unauthorized { .. } => 401,
            BdError::Forbidden { .. } => 403,
            BdError::Validation(_) => 422,
            BdError::Conflict { .. } => 409,
            BdError::Config(_) | BdError::Storage(_) | BdError::Internal(_) => 500,
            BdError::ExternalService { .. } => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BdError::NotFound { .. } => "not_found",
            BdError::Unauthorized { .. } => "unauthorized",
            BdError::Forbidden { .. } => "forbidden",
            BdError::Validation(_) => "validation_failed",
            BdError::Conflict { .. } => "conflict",
            BdError::Config(_) => "configuration_error",
            BdError::Storage(_) => "storage_error",
            BdError::ExternalService { .. } => "external_service_error",
            BdError::Internal(_) => "internal_error",
        }
    }
}

/// Validation errors collection
///
/// Field keys are kept ordered so `full_messages` is stable.
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("{}", self.full_messages().join("; "))]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in err.field_errors() {
            for e in field_errors {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

impl From<validator::ValidationErrors> for BdError {
    fn from(err: validator::ValidationErrors) -> Self {
        BdError::Validation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect_and_merge() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("latitude", "can't be blank");
        let mut other = ValidationErrors::new();
        other.add_base("request is incomplete");
        other.add("latitude", "must be between -90 and 90");
        errors.merge(other);

        assert!(errors.has_error("latitude"));
        assert_eq!(errors.get("latitude").map(|v| v.len()), Some(2));
        assert_eq!(
            errors.full_messages(),
            vec![
                "request is incomplete".to_string(),
                "latitude can't be blank".to_string(),
                "latitude must be between -90 and 90".to_string(),
            ]
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(BdError::forbidden("nope").status_code(), 403);
        assert_eq!(BdError::conflict("taken").status_code(), 409);
        assert_eq!(BdError::Config("duration".into()).status_code(), 500);
        assert_eq!(
            BdError::Validation(ValidationErrors::new()).error_code(),
            "validation_failed"
        );
    }
}
