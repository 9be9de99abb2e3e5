//! Construction order model
//!
//! An order is the committed, scheduled execution of a request. Its status
//! only ever moves PENDING -> IN_PROGRESS -> FINISHED.

use bd_core::{BdError, BdResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Entity, Id, Identifiable, ProjectScoped, Timestamped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Finished,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [Self::Pending, Self::InProgress, Self::Finished];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Finished => "FINISHED",
        }
    }

    /// The only state this one may advance to
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair, compared exactly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Stock movement of one recipe line, captured when the order committed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialConsumption {
    pub material_id: Id,
    pub material_name: String,
    pub stock_before: f64,
    pub required: f64,
    pub stock_after: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionOrder {
    pub id: Option<Id>,
    /// Originating request
    pub request_id: Id,
    pub project_id: Id,
    pub construction_type_id: Id,
    pub requested_by: Id,
    pub latitude: f64,
    pub longitude: f64,
    pub requested_date: NaiveDate,
    pub scheduled_start_date: NaiveDate,
    pub scheduled_end_date: NaiveDate,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub materials_consumption: Vec<MaterialConsumption>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConstructionOrder {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Move one step forward in the lifecycle
    pub fn advance_to(&mut self, target: OrderStatus) -> BdResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(BdError::conflict(format!(
                "order {} cannot move from {} to {}",
                self.id.unwrap_or_default(),
                self.status,
                target
            )));
        }
        self.status = target;
        Ok(())
    }
}

impl Identifiable for ConstructionOrder {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for ConstructionOrder {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl ProjectScoped for ConstructionOrder {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Entity for ConstructionOrder {
    const TYPE_NAME: &'static str = "ConstructionOrder";
}
