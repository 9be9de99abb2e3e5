//! Project model
//!
//! A project groups the construction orders built one after another by a
//! single crew. Its dates and completion percentage are derived by the
//! lifecycle sweep.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Entity, Id, Identifiable, Timestamped};

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProgress,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::InProgress => "IN_PROGRESS",
        }
    }
}

/// Project entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Option<Id>,

    /// Display name, globally unique
    pub name: String,

    pub description: Option<String>,

    /// Creating user
    pub created_by: Option<Id>,

    /// Date the first order started
    pub start_date: Option<NaiveDate>,

    /// Latest scheduled end date across the project's orders
    pub end_date: Option<NaiveDate>,

    /// 0..=100, finished orders over total orders
    #[serde(default)]
    pub progress_percentage: f64,

    #[serde(default)]
    pub status: ProjectStatus,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            created_by: None,
            start_date: None,
            end_date: None,
            progress_percentage: 0.0,
            status: ProjectStatus::Planned,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_by(mut self, user_id: Id) -> Self {
        self.created_by = Some(user_id);
        self
    }

    /// Record that construction has begun on `date`; the first start date sticks
    pub fn mark_started(&mut self, date: NaiveDate) -> bool {
        let mut changed = false;
        if self.start_date.is_none() {
            self.start_date = Some(date);
            changed = true;
        }
        if self.status != ProjectStatus::InProgress {
            self.status = ProjectStatus::InProgress;
            changed = true;
        }
        changed
    }
}

impl Identifiable for Project {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Project {
    const TYPE_NAME: &'static str = "Project";
}

/// DTO for creating a project
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectDto {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "is too long (maximum is 2000 characters)"))]
    pub description: Option<String>,
}

/// DTO for editing a project's descriptive fields
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectDto {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "is too long (maximum is 2000 characters)"))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_started_keeps_first_date() {
        let mut project = Project::new("Riverside");
        let first = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let later = NaiveDate::from_ymd_opt(2025, 1, 16).unwrap();

        assert!(project.mark_started(first));
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert!(!project.mark_started(later));
        assert_eq!(project.start_date, Some(first));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
