//! Catalog services: projects, material types and construction types

use std::sync::Arc;

use bd_contracts::catalog::{ConstructionTypeContract, MaterialContract, ProjectContract};
use bd_contracts::{validate_dto, Contract};
use bd_core::error::{BdError, ValidationErrors};
use bd_core::result::BdResult;
use bd_core::traits::Id;
use bd_db::Repositories;
use bd_models::{
    ConstructionType, CreateConstructionTypeDto, CreateMaterialDto, CreateProjectDto,
    MaterialType, Project, RecipeLine, RestockDto, UpdateConstructionTypeDto, UpdateMaterialDto,
    UpdateProjectDto,
};

use crate::ledger::InventoryLedger;
use crate::locks::KeyedLocks;

pub struct ProjectService {
    repos: Repositories,
    project_locks: KeyedLocks,
}

impl ProjectService {
    pub fn new(repos: Repositories, project_locks: KeyedLocks) -> Self {
        Self {
            repos,
            project_locks,
        }
    }

    pub async fn create(&self, creator_id: Id, dto: CreateProjectDto) -> BdResult<Project> {
        ProjectContract.validate(&dto)?;
        let mut project = Project::new(dto.name.trim()).with_created_by(creator_id);
        project.description = dto.description;
        let project = self.repos.projects.save(project).await?;
        tracing::info!(project_id = ?project.id, name = %project.name, "Project created");
        Ok(project)
    }

    /// Change descriptive fields; dates and progress belong to the lifecycle
    pub async fn update(&self, id: Id, dto: UpdateProjectDto) -> BdResult<Project> {
        ProjectContract.validate(&dto)?;
        let _guard = self.project_locks.lock(id).await;
        let mut project = self.get(id).await?;
        if let Some(name) = dto.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = dto.description {
            project.description = Some(description);
        }
        Ok(self.repos.projects.save(project).await?)
    }

    pub async fn get(&self, id: Id) -> BdResult<Project> {
        self.repos
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| BdError::not_found::<Project>(id))
    }

    pub async fn list(&self) -> BdResult<Vec<Project>> {
        Ok(self.repos.projects.find_all().await?)
    }

    /// Refused while the project still owns orders or requests
    pub async fn delete(&self, id: Id) -> BdResult<()> {
        let _guard = self.project_locks.lock(id).await;
        self.get(id).await?;

        let orders = self.repos.orders.count_by_project(id).await?;
        let requests = self.repos.requests.count_by_project(id).await?;
        if orders > 0 || requests > 0 {
            return Err(BdError::conflict(format!(
                "project {} still has {} orders and {} requests",
                id, orders, requests
            )));
        }
        self.repos.projects.delete(id).await?;
        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }
}

pub struct MaterialService {
    repos: Repositories,
    ledger: Arc<InventoryLedger>,
}

impl MaterialService {
    pub fn new(repos: Repositories, ledger: Arc<InventoryLedger>) -> Self {
        Self { repos, ledger }
    }

    pub async fn create(&self, dto: CreateMaterialDto) -> BdResult<MaterialType> {
        MaterialContract.validate(&dto)?;
        let material = MaterialType::new(dto.code, dto.name, dto.unit, dto.stock);
        Ok(self.repos.materials.save(material).await?)
    }

    pub async fn get(&self, id: Id) -> BdResult<MaterialType> {
        self.repos
            .materials
            .find_by_id(id)
            .await?
            .ok_or_else(|| BdError::not_found::<MaterialType>(id))
    }

    pub async fn list(&self) -> BdResult<Vec<MaterialType>> {
        Ok(self.repos.materials.find_all().await?)
    }

    /// Rename or change the unit; stock is left to the ledger
    pub async fn update(&self, id: Id, dto: UpdateMaterialDto) -> BdResult<MaterialType> {
        MaterialContract.validate(&dto)?;
        let mut material = self.get(id).await?;
        if let Some(name) = dto.name {
            material.name = name.trim().to_string();
        }
        if let Some(unit) = dto.unit {
            material.unit = unit.trim().to_string();
        }
        Ok(self.repos.materials.save(material).await?)
    }

    pub async fn restock(&self, id: Id, dto: RestockDto) -> BdResult<MaterialType> {
        validate_dto(&dto)?;
        Ok(self.ledger.restock(id, dto.quantity).await?)
    }
}

pub struct ConstructionTypeService {
    repos: Repositories,
}

impl ConstructionTypeService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn check_materials_exist(
        &self,
        recipe: &[RecipeLine],
        errors: &mut ValidationErrors,
    ) -> BdResult<()> {
        for line in recipe {
            if self.repos.materials.find_by_id(line.material_id).await?.is_none() {
                errors.add("recipe", format!("material {} does not exist", line.material_id));
            }
        }
        Ok(())
    }

    pub async fn create(&self, dto: CreateConstructionTypeDto) -> BdResult<ConstructionType> {
        let mut errors = match ConstructionTypeContract.validate(&dto) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        self.check_materials_exist(&dto.recipe, &mut errors).await?;
        errors.into_result()?;

        let construction_type = ConstructionType {
            id: None,
            name: dto.name.trim().to_string(),
            duration_days: dto.duration_days,
            recipe: dto.recipe,
        };
        Ok(self.repos.construction_types.save(construction_type).await?)
    }

    /// Orders already created keep the consumption they were charged
    pub async fn update(
        &self,
        id: Id,
        dto: UpdateConstructionTypeDto,
    ) -> BdResult<ConstructionType> {
        let mut errors = match ConstructionTypeContract.validate(&dto) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(recipe) = &dto.recipe {
            self.check_materials_exist(recipe, &mut errors).await?;
        }
        errors.into_result()?;

        let mut construction_type = self.get(id).await?;
        if let Some(name) = dto.name {
            construction_type.name = name.trim().to_string();
        }
        if let Some(duration_days) = dto.duration_days {
            construction_type.duration_days = duration_days;
        }
        if let Some(recipe) = dto.recipe {
            construction_type.recipe = recipe;
        }
        let construction_type = self.repos.construction_types.save(construction_type).await?;
        tracing::info!(construction_type_id = id, name = %construction_type.name, "Construction type updated");
        Ok(construction_type)
    }

    pub async fn get(&self, id: Id) -> BdResult<ConstructionType> {
        self.repos
            .construction_types
            .find_by_id(id)
            .await?
            .ok_or_else(|| BdError::not_found::<ConstructionType>(id))
    }

    pub async fn list(&self) -> BdResult<Vec<ConstructionType>> {
        Ok(self.repos.construction_types.find_all().await?)
    }
}
