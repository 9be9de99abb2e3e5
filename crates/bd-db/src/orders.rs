//! Construction order repository
//!
//! Besides plain lookups this exposes the derived queries scheduling relies
//! on: the latest scheduled end date of a project and coordinate occupancy.

use async_trait::async_trait;
use bd_core::traits::Id;
use bd_models::{ConstructionOrder, OrderStatus};
use chrono::{DateTime, NaiveDate, Utc};

use crate::memory::MemoryTable;
use crate::repository::{Record, RepositoryResult};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ConstructionOrder>>;
    async fn find_all(&self) -> RepositoryResult<Vec<ConstructionOrder>>;
    async fn find_by_project_id(&self, project_id: Id) -> RepositoryResult<Vec<ConstructionOrder>>;
    async fn find_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<ConstructionOrder>>;
    async fn find_by_request_id(&self, request_id: Id)
        -> RepositoryResult<Option<ConstructionOrder>>;
    async fn find_by_scheduled_start_date(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ConstructionOrder>>;
    async fn find_by_scheduled_end_date(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ConstructionOrder>>;
    /// Insert or update; coordinates are unique within a project
    async fn save(&self, order: ConstructionOrder) -> RepositoryResult<ConstructionOrder>;
    /// Only used to undo an order whose request could not be settled
    async fn delete(&self, id: Id) -> RepositoryResult<()>;
    async fn exists_by_coordinates(
        &self,
        project_id: Id,
        latitude: f64,
        longitude: f64,
    ) -> RepositoryResult<bool>;
    async fn max_scheduled_end_date(&self, project_id: Id) -> RepositoryResult<Option<NaiveDate>>;
    async fn count_by_project(&self, project_id: Id) -> RepositoryResult<usize>;
    async fn count_finished_by_project(&self, project_id: Id) -> RepositoryResult<usize>;
}

impl Record for ConstructionOrder {
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
pub struct MemoryOrderRepository {
    table: MemoryTable<ConstructionOrder>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<ConstructionOrder>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<ConstructionOrder>> {
        Ok(self.table.all().await)
    }

    async fn find_by_project_id(&self, project_id: Id) -> RepositoryResult<Vec<ConstructionOrder>> {
        Ok(self.table.filter(|o| o.project_id == project_id).await)
    }

    async fn find_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<ConstructionOrder>> {
        Ok(self.table.filter(|o| o.status == status).await)
    }

    async fn find_by_request_id(
        &self,
        request_id: Id,
    ) -> RepositoryResult<Option<ConstructionOrder>> {
        Ok(self.table.find(|o| o.request_id == request_id).await)
    }

    async fn find_by_scheduled_start_date(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ConstructionOrder>> {
        Ok(self.table.filter(|o| o.scheduled_start_date == date).await)
    }

    async fn find_by_scheduled_end_date(
        &self,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ConstructionOrder>> {
        Ok(self.table.filter(|o| o.scheduled_end_date == date).await)
    }

    async fn save(&self, order: ConstructionOrder) -> RepositoryResult<ConstructionOrder> {
        self.table
            .save(order, |new, existing| {
                (new.project_id == existing.project_id
                    && new.coordinates() == existing.coordinates())
                .then(|| {
                    format!(
                        "coordinate {} is already occupied in project {}",
                        new.coordinates(),
                        new.project_id
                    )
                })
            })
            .await
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        self.table.remove(id).await
    }

    async fn exists_by_coordinates(
        &self,
        project_id: Id,
        latitude: f64,
        longitude: f64,
    ) -> RepositoryResult<bool> {
        Ok(self
            .table
            .find(|o| o.project_id == project_id && o.latitude == latitude && o.longitude == longitude)
            .await
            .is_some())
    }

    async fn max_scheduled_end_date(&self, project_id: Id) -> RepositoryResult<Option<NaiveDate>> {
        Ok(self
            .table
            .filter(|o| o.project_id == project_id)
            .await
            .into_iter()
            .map(|o| o.scheduled_end_date)
            .max())
    }

    async fn count_by_project(&self, project_id: Id) -> RepositoryResult<usize> {
        Ok(self.table.count(|o| o.project_id == project_id).await)
    }

    async fn count_finished_by_project(&self, project_id: Id) -> RepositoryResult<usize> {
        Ok(self
            .table
            .count(|o| o.project_id == project_id && o.status == OrderStatus::Finished)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn order(project_id: Id, lat: f64, start: u32, end: u32) -> ConstructionOrder {
        ConstructionOrder {
            id: None,
            request_id: 1,
            project_id,
            construction_type_id: 1,
            requested_by: 1,
            latitude: lat,
            longitude: -74.0,
            requested_date: day(1),
            scheduled_start_date: day(start),
            scheduled_end_date: day(end),
            status: OrderStatus::Pending,
            observations: String::new(),
            materials_consumption: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_max_end_date_and_counts() {
        let repo = MemoryOrderRepository::new();
        assert_eq!(repo.max_scheduled_end_date(1).await.unwrap(), None);

        repo.save(order(1, 1.0, 11, 15)).await.unwrap();
        let mut second = repo.save(order(1, 2.0, 16, 19)).await.unwrap();
        repo.save(order(2, 1.0, 2, 30)).await.unwrap();

        assert_eq!(repo.max_scheduled_end_date(1).await.unwrap(), Some(day(19)));
        assert_eq!(repo.count_by_project(1).await.unwrap(), 2);

        second.status = OrderStatus::Finished;
        repo.save(second).await.unwrap();
        assert_eq!(repo.count_finished_by_project(1).await.unwrap(), 1);
        assert_eq!(repo.find_by_scheduled_start_date(day(16)).await.unwrap().len(), 1);
        assert_eq!(repo.find_by_scheduled_end_date(day(30)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_coordinates_unique_per_project() {
        let repo = MemoryOrderRepository::new();
        repo.save(order(1, 4.5, 11, 15)).await.unwrap();

        assert!(repo.exists_by_coordinates(1, 4.5, -74.0).await.unwrap());
        assert!(!repo.exists_by_coordinates(2, 4.5, -74.0).await.unwrap());

        let err = repo.save(order(1, 4.5, 16, 19)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        // Same point in another project is fine
        repo.save(order(2, 4.5, 16, 19)).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_frees_coordinates() {
        let repo = MemoryOrderRepository::new();
        let saved = repo.save(order(1, 4.5, 11, 15)).await.unwrap();

        repo.delete(saved.id.unwrap()).await.unwrap();
        assert!(!repo.exists_by_coordinates(1, 4.5, -74.0).await.unwrap());
        assert_eq!(repo.max_scheduled_end_date(1).await.unwrap(), None);

        let err = repo.delete(saved.id.unwrap()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
