//! Material repository

use async_trait::async_trait;
use bd_core::traits::Id;
use bd_models::MaterialType;

use crate::memory::MemoryTable;
use crate::repository::{Record, RepositoryResult};

#[async_trait]
pub trait MaterialRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<MaterialType>>;
    async fn find_all(&self) -> RepositoryResult<Vec<MaterialType>>;
    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<MaterialType>>;
    /// Insert or update; codes are unique
    async fn save(&self, material: MaterialType) -> RepositoryResult<MaterialType>;
}

impl Record for MaterialType {
    fn record_id(&self) -> Option<Id> {
        self.id
    }

    fn assign_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

#[derive(Default)]
pub struct MemoryMaterialRepository {
    table: MemoryTable<MaterialType>,
}

impl MemoryMaterialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MaterialRepository for MemoryMaterialRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<MaterialType>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<MaterialType>> {
        Ok(self.table.all().await)
    }

    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<MaterialType>> {
        Ok(self.table.find(|m| m.code == code).await)
    }

    async fn save(&self, material: MaterialType) -> RepositoryResult<MaterialType> {
        self.table
            .save(material, |new, existing| {
                (new.code == existing.code)
                    .then(|| format!("material code '{}' is already taken", new.code))
            })
            .await
    }
}
