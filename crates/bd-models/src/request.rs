//! Construction request model
//!
//! A request is classified PENDING or REJECTED when submitted. A PENDING
//! request later settles exactly once on APPROVED or FAILED. Observations are
//! system-written and only ever appended to.

use bd_core::{BdError, BdResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::order::Coordinates;
use crate::{Entity, Id, Identifiable, ProjectScoped, Timestamped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionRequest {
    pub id: Option<Id>,
    pub project_id: Id,
    pub construction_type_id: Id,
    pub requested_by: Id,
    pub latitude: f64,
    pub longitude: f64,
    pub request_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub observations: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConstructionRequest {
    pub fn new(
        project_id: Id,
        construction_type_id: Id,
        requested_by: Id,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: None,
            project_id,
            construction_type_id,
            requested_by,
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            request_date: None,
            status: RequestStatus::Pending,
            observations: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_request_date(mut self, date: NaiveDate) -> Self {
        self.request_date = Some(date);
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Append a line to the observation trail
    pub fn append_observation(&mut self, note: impl AsRef<str>) {
        let note = note.as_ref();
        if note.is_empty() {
            return;
        }
        if !self.observations.is_empty() {
            self.observations.push('\n');
        }
        self.observations.push_str(note);
    }

    /// Settle a PENDING request on APPROVED or FAILED
    pub fn settle(&mut self, status: RequestStatus, note: impl AsRef<str>) -> BdResult<()> {
        if self.status.is_terminal() {
            return Err(BdError::conflict(format!(
                "request {} is already {}",
                self.id.unwrap_or_default(),
                self.status
            )));
        }
        if !matches!(status, RequestStatus::Approved | RequestStatus::Failed) {
            return Err(BdError::Internal(format!(
                "{} is not a settlement status",
                status
            )));
        }
        self.status = status;
        self.append_observation(note);
        Ok(())
    }
}

impl Identifiable for ConstructionRequest {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for ConstructionRequest {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl ProjectScoped for ConstructionRequest {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Entity for ConstructionRequest {
    const TYPE_NAME: &'static str = "ConstructionRequest";
}

/// Submission payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestDto {
    #[validate(required(message = "can't be blank"))]
    pub project_id: Option<Id>,
    #[validate(required(message = "can't be blank"))]
    pub construction_type_id: Option<Id>,
    #[validate(
        required(message = "can't be blank"),
        range(min = -90.0, max = 90.0, message = "must be between -90 and 90")
    )]
    pub latitude: Option<f64>,
    #[validate(
        required(message = "can't be blank"),
        range(min = -180.0, max = 180.0, message = "must be between -180 and 180")
    )]
    pub longitude: Option<f64>,
    pub request_date: Option<NaiveDate>,
}
