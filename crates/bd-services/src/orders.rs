//! Order queries
//!
//! Orders are created only by the order creation workflow and moved only by
//! the lifecycle scheduler; this service is read-only.

use bd_core::error::BdError;
use bd_core::result::BdResult;
use bd_core::traits::Id;
use bd_db::Repositories;
use bd_models::{ConstructionOrder, OrderStatus};

pub struct OrderQueryService {
    repos: Repositories,
}

impl OrderQueryService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn get(&self, id: Id) -> BdResult<ConstructionOrder> {
        self.repos
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| BdError::not_found::<ConstructionOrder>(id))
    }

    pub async fn list(&self) -> BdResult<Vec<ConstructionOrder>> {
        Ok(self.repos.orders.find_all().await?)
    }

    pub async fn list_by_project(&self, project_id: Id) -> BdResult<Vec<ConstructionOrder>> {
        Ok(self.repos.orders.find_by_project_id(project_id).await?)
    }

    pub async fn list_by_status(&self, status: OrderStatus) -> BdResult<Vec<ConstructionOrder>> {
        Ok(self.repos.orders.find_by_status(status).await?)
    }
}
