//! # bd-db
//!
//! Repository layer for Builders RS.
//!
//! Each entity gets an async repository trait describing exactly the lookups
//! the lifecycle engine needs, plus an in-memory implementation.

pub mod construction_types;
pub mod materials;
pub mod memory;
pub mod orders;
pub mod projects;
pub mod repository;
pub mod requests;
pub mod users;

use std::sync::Arc;

pub use construction_types::{ConstructionTypeRepository, MemoryConstructionTypeRepository};
pub use materials::{MaterialRepository, MemoryMaterialRepository};
pub use orders::{MemoryOrderRepository, OrderRepository};
pub use projects::{MemoryProjectRepository, ProjectRepository};
pub use repository::{RepositoryError, RepositoryResult};
pub use requests::{MemoryRequestRepository, RequestRepository};
pub use users::{MemoryUserRepository, UserRepository};

/// Handles to every repository, shared across services
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepository>,
    pub materials: Arc<dyn MaterialRepository>,
    pub construction_types: Arc<dyn ConstructionTypeRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Fresh, empty in-memory storage
    pub fn in_memory() -> Self {
        Self {
            projects: Arc::new(MemoryProjectRepository::new()),
            materials: Arc::new(MemoryMaterialRepository::new()),
            construction_types: Arc::new(MemoryConstructionTypeRepository::new()),
            requests: Arc::new(MemoryRequestRepository::new()),
            orders: Arc::new(MemoryOrderRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
        }
    }
}
