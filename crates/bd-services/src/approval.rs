//! Request Approval Pipeline
//!
//! Classifies a freshly submitted request as PENDING or REJECTED. Only the
//! first failing check is reported, coordinates before stock. The stock check
//! is a read-only projection; the authoritative deduction happens when the
//! order is created.

use std::sync::Arc;

use bd_core::result::BdResult;
use bd_db::OrderRepository;
use bd_models::{ConstructionRequest, ConstructionType, RequestStatus};

use crate::ledger::InventoryLedger;

pub const VALIDATIONS_OK: &str = "Validations OK. Request ready for order creation.";

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: RequestStatus,
    pub observation: String,
}

impl Classification {
    fn pending() -> Self {
        Self {
            status: RequestStatus::Pending,
            observation: VALIDATIONS_OK.to_string(),
        }
    }

    fn rejected(observation: String) -> Self {
        Self {
            status: RequestStatus::Rejected,
            observation,
        }
    }
}

pub struct RequestApprovalPipeline {
    orders: Arc<dyn OrderRepository>,
    ledger: Arc<InventoryLedger>,
}

impl RequestApprovalPipeline {
    pub fn new(orders: Arc<dyn OrderRepository>, ledger: Arc<InventoryLedger>) -> Self {
        Self { orders, ledger }
    }

    pub async fn classify(
        &self,
        request: &ConstructionRequest,
        construction_type: &ConstructionType,
    ) -> BdResult<Classification> {
        let occupied = self
            .orders
            .exists_by_coordinates(request.project_id, request.latitude, request.longitude)
            .await?;
        if occupied {
            return Ok(Classification::rejected(format!(
                "Coordinate {} is already occupied by an order in this project.",
                request.coordinates()
            )));
        }

        let projection = self.ledger.preview(&construction_type.recipe).await?;
        if !projection.is_sufficient() {
            let shortages = projection
                .shortages
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(Classification::rejected(format!(
                "Insufficient stock for: {}",
                shortages
            )));
        }

        Ok(Classification::pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bd_db::{MaterialRepository, MemoryMaterialRepository, MemoryOrderRepository};
    use bd_models::{ConstructionOrder, Coordinates, MaterialType, OrderStatus};
    use chrono::NaiveDate;

    struct Fixture {
        orders: Arc<MemoryOrderRepository>,
        pipeline: RequestApprovalPipeline,
        house: ConstructionType,
    }

    async fn fixture(cement_stock: f64) -> Fixture {
        let materials = Arc::new(MemoryMaterialRepository::new());
        let cement = materials
            .save(MaterialType::new("Ce", "Cement", "kg", cement_stock))
            .await
            .unwrap();
        let orders = Arc::new(MemoryOrderRepository::new());
        let ledger = Arc::new(InventoryLedger::new(materials));
        let mut house = ConstructionType::new("HOUSE", 3).with_line(cement.id.unwrap(), 100.0);
        house.id = Some(1);
        Fixture {
            pipeline: RequestApprovalPipeline::new(orders.clone(), ledger),
            orders,
            house,
        }
    }

    async fn occupy(orders: &MemoryOrderRepository, lat: f64, lng: f64) {
        let day = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        orders
            .save(ConstructionOrder {
                id: None,
                request_id: 1,
                project_id: 1,
                construction_type_id: 1,
                requested_by: 1,
                latitude: lat,
                longitude: lng,
                requested_date: day,
                scheduled_start_date: day,
                scheduled_end_date: day,
                status: OrderStatus::Pending,
                observations: String::new(),
                materials_consumption: vec![],
                created_at: None,
                updated_at: None,
            })
            .await
            .unwrap();
    }

    fn request(lat: f64, lng: f64) -> ConstructionRequest {
        ConstructionRequest::new(1, 1, 1, Coordinates::new(lat, lng))
    }

    #[tokio::test]
    async fn test_pending_when_everything_passes() {
        let f = fixture(500.0).await;
        let c = f.pipeline.classify(&request(4.6, -74.1), &f.house).await.unwrap();
        assert_eq!(c.status, RequestStatus::Pending);
        assert_eq!(c.observation, VALIDATIONS_OK);
    }

    #[tokio::test]
    async fn test_rejected_for_insufficient_stock() {
        let f = fixture(50.0).await;
        let c = f.pipeline.classify(&request(4.6, -74.1), &f.house).await.unwrap();
        assert_eq!(c.status, RequestStatus::Rejected);
        assert_eq!(
            c.observation,
            "Insufficient stock for: Cement (required 100, available 50)"
        );
    }

    #[tokio::test]
    async fn test_coordinate_conflict_wins_over_stock() {
        let f = fixture(50.0).await;
        occupy(&f.orders, 4.6, -74.1).await;
        let c = f.pipeline.classify(&request(4.6, -74.1), &f.house).await.unwrap();
        assert_eq!(c.status, RequestStatus::Rejected);
        assert!(c.observation.starts_with("Coordinate (4.6, -74.1) is already occupied"));
    }

    #[tokio::test]
    async fn test_other_project_coordinates_are_free() {
        let f = fixture(500.0).await;
        occupy(&f.orders, 4.6, -74.1).await;
        let mut r = request(4.6, -74.1);
        r.project_id = 2;
        let c = f.pipeline.classify(&r, &f.house).await.unwrap();
        assert_eq!(c.status, RequestStatus::Pending);
    }
}
