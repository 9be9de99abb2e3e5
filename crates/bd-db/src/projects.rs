//! Project repository

use async_trait::async_trait;
use bd_core::traits::Id;
use bd_models::Project;
use chrono::{DateTime, Utc};

use crate::memory::MemoryTable;
use crate::repository::{Record, RepositoryResult};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>>;
    async fn find_all(&self) -> RepositoryResult<Vec<Project>>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Project>>;
    /// Insert or update; names are unique
    async fn save(&self, project: Project) -> RepositoryResult<Project>;
    async fn delete(&self, id: Id) -> RepositoryResult<()>;
}

impl Record for Project {
    fn record_id(&self) -> Option<Id> {
        self.id
    }

    fn assign_id(&mut self, id: Id) {
        self.id = Some(id);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }
}

#[derive(Default)]
pub struct MemoryProjectRepository {
    table: MemoryTable<Project>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Project>> {
        Ok(self.table.all().await)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Project>> {
        Ok(self.table.find(|p| p.name == name).await)
    }

    async fn save(&self, project: Project) -> RepositoryResult<Project> {
        self.table
            .save(project, |new, existing| {
                (new.name == existing.name)
                    .then(|| format!("project name '{}' is already taken", new.name))
            })
            .await
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table.remove(id).await
    }
}
