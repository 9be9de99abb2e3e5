//! # bd-models
//!
//! Domain models for Builders RS.
//!
//! Entities for projects, the material catalog, construction types and their
//! recipes, construction requests and the orders they turn into.
//! Each model implements the core traits from `bd-core` (Entity, Identifiable, etc.)

pub use bd_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};

pub mod construction_type;
pub mod material;
pub mod order;
pub mod project;
pub mod request;
pub mod user;

pub use construction_type::{
    ConstructionType, CreateConstructionTypeDto, RecipeLine, UpdateConstructionTypeDto,
};
pub use material::{CreateMaterialDto, MaterialType, RestockDto, UpdateMaterialDto};
pub use order::{ConstructionOrder, Coordinates, MaterialConsumption, OrderStatus};
pub use project::{CreateProjectDto, Project, ProjectStatus, UpdateProjectDto};
pub use request::{ConstructionRequest, CreateRequestDto, RequestStatus};
pub use user::User;
