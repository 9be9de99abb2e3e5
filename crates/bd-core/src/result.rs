//! Result type aliases

use crate::error::BdError;

/// Standard Result type for Builders operations
pub type BdResult<T> = Result<T, BdError>;
