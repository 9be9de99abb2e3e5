//! Construction request repository

use async_trait::async_trait;
use bd_core::traits::Id;
use bd_models::{ConstructionRequest, RequestStatus};
use chrono::{DateTime, Utc};

use crate::memory::{no_conflicts, MemoryTable};
use crate::repository::{Record, RepositoryResult};

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ConstructionRequest>>;
    async fn find_all(&self) -> RepositoryResult<Vec<ConstructionRequest>>;
    async fn find_by_project_id(&self, project_id: Id)
        -> RepositoryResult<Vec<ConstructionRequest>>;
    async fn find_by_status(&self, status: RequestStatus)
        -> RepositoryResult<Vec<ConstructionRequest>>;
    async fn save(&self, request: ConstructionRequest) -> RepositoryResult<ConstructionRequest>;
    async fn count_by_project(&self, project_id: Id) -> RepositoryResult<usize>;
}

impl Record for ConstructionRequest {
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
pub struct MemoryRequestRepository {
    table: MemoryTable<ConstructionRequest>,
}

impl MemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestRepository for MemoryRequestRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ConstructionRequest>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<ConstructionRequest>> {
        Ok(self.table.all().await)
    }

    async fn find_by_project_id(
        &self,
        project_id: Id,
    ) -> RepositoryResult<Vec<ConstructionRequest>> {
        Ok(self.table.filter(|r| r.project_id == project_id).await)
    }

    async fn find_by_status(
        &self,
        status: RequestStatus,
    ) -> RepositoryResult<Vec<ConstructionRequest>> {
        Ok(self.table.filter(|r| r.status == status).await)
    }

    async fn save(&self, request: ConstructionRequest) -> RepositoryResult<ConstructionRequest> {
        self.table.save(request, no_conflicts).await
    }

    async fn count_by_project(&self, project_id: Id) -> RepositoryResult<usize> {
        Ok(self.table.count(|r| r.project_id == project_id).await)
    }
}
