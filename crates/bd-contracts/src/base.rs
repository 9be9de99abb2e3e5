//! Base contract system

use bd_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T: ?Sized>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Run `validator` derive rules and convert the outcome
pub fn validate_dto<T: validator::Validate>(dto: &T) -> ValidationResult {
    dto.validate().map_err(ValidationErrors::from)
}
