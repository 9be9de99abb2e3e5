//! Core traits shared by models, repositories and services

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Role that allows submitting construction requests
pub const ROLE_ARCHITECT: &str = "ROLE_ARCHITECT";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for entities with timestamps (created_at, updated_at)
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Trait for entities that belong to a project
pub trait ProjectScoped {
    fn project_id(&self) -> Id;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Send + Sync {
    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}

/// The caller on whose behalf a service runs
pub trait UserContext: Send + Sync {
    fn id(&self) -> Id;
    fn has_role(&self, role: &str) -> bool;

    fn is_architect(&self) -> bool {
        self.has_role(ROLE_ARCHITECT)
    }

    fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}
