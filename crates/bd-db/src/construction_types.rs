//! Construction type repository

use async_trait::async_trait;
use bd_core::traits::Id;
use bd_models::ConstructionType;

use crate::memory::MemoryTable;
use crate::repository::{Record, RepositoryResult};

#[async_trait]
pub trait ConstructionTypeRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ConstructionType>>;
    async fn find_all(&self) -> RepositoryResult<Vec<ConstructionType>>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<ConstructionType>>;
    async fn save(&self, construction_type: ConstructionType)
        -> RepositoryResult<ConstructionType>;
}

impl Record for ConstructionType {
    fn record_id(&self) -> Option<Id> {
        self.id
    }

    fn assign_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

#[derive(Default)]
pub struct MemoryConstructionTypeRepository {
    table: MemoryTable<ConstructionType>,
}

impl MemoryConstructionTypeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConstructionTypeRepository for MemoryConstructionTypeRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ConstructionType>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<ConstructionType>> {
        Ok(self.table.all().await)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<ConstructionType>> {
        Ok(self.table.find(|t| t.name == name).await)
    }

    async fn save(
        &self,
        construction_type: ConstructionType,
    ) -> RepositoryResult<ConstructionType> {
        self.table
            .save(construction_type, |new, existing| {
                (new.name == existing.name)
                    .then(|| format!("construction type '{}' already exists", new.name))
            })
            .await
    }
}
