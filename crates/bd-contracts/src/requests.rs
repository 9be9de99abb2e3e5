//! Contracts for construction requests
//!
//! Two gates guard a request. `SubmitRequestContract` checks the submission
//! payload synchronously. `OrderPreconditionContract` is the stricter check run
//! again right before an order is created, against freshly loaded entities.

use bd_core::error::ValidationErrors;
use bd_models::{ConstructionRequest, ConstructionType, CreateRequestDto, Project, User};

use crate::base::{validate_dto, Contract, ValidationResult};

/// Validates a request submission payload
#[derive(Debug, Default)]
pub struct SubmitRequestContract;

impl SubmitRequestContract {
    pub fn new() -> Self {
        Self
    }
}

impl Contract<CreateRequestDto> for SubmitRequestContract {
    fn validate(&self, dto: &CreateRequestDto) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_dto(dto) {
            errors.merge(e);
        }
        validate_finite("latitude", dto.latitude, &mut errors);
        validate_finite("longitude", dto.longitude, &mut errors);

        errors.into_result()
    }
}

fn validate_finite(field: &str, value: Option<f64>, errors: &mut ValidationErrors) {
    if let Some(v) = value {
        if !v.is_finite() {
            errors.add(field, "must be a finite number");
        }
    }
}

/// Everything order creation needs, resolved at the moment it runs
#[derive(Debug, Clone, Copy)]
pub struct OrderPreconditions<'a> {
    pub request: &'a ConstructionRequest,
    pub project: Option<&'a Project>,
    pub construction_type: Option<&'a ConstructionType>,
    pub requester: Option<&'a User>,
}

/// Structural completeness gate for order creation
#[derive(Debug, Default)]
pub struct OrderPreconditionContract;

impl OrderPreconditionContract {
    pub fn new() -> Self {
        Self
    }

    /// Single-line failure detail, messages joined with `"; "`
    pub fn detail(errors: &ValidationErrors) -> String {
        errors.full_messages().join("; ")
    }
}

impl<'a> Contract<OrderPreconditions<'a>> for OrderPreconditionContract {
    fn validate(&self, input: &OrderPreconditions<'a>) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        let request = input.request;

        if input.project.is_none() {
            errors.add_base(format!("project {} is missing", request.project_id));
        }
        if input.construction_type.is_none() {
            errors.add_base(format!(
                "construction type {} is missing",
                request.construction_type_id
            ));
        }
        if input.requester.is_none() {
            errors.add_base(format!("requester {} is missing", request.requested_by));
        }
        if request.request_date.is_none() {
            errors.add_base("request date is missing");
        }
        if !request.latitude.is_finite() || !request.longitude.is_finite() {
            errors.add_base("coordinates are missing");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bd_models::Coordinates;
    use chrono::NaiveDate;

    fn dto() -> CreateRequestDto {
        CreateRequestDto {
            project_id: Some(1),
            construction_type_id: Some(1),
            latitude: Some(4.65),
            longitude: Some(-74.05),
            request_date: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        assert!(SubmitRequestContract::new().validate(&dto()).is_ok());
    }

    #[test]
    fn test_missing_coordinates() {
        let mut d = dto();
        d.latitude = None;
        d.longitude = Some(f64::NAN);
        let errors = SubmitRequestContract::new().validate(&d).unwrap_err();
        assert!(errors.has_error("latitude"));
        assert!(errors.has_error("longitude"));
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let mut d = dto();
        d.longitude = Some(200.0);
        let errors = SubmitRequestContract::new().validate(&d).unwrap_err();
        assert!(errors.has_error("longitude"));
        assert!(!errors.has_error("latitude"));
    }

    #[test]
    fn test_preconditions_join_every_missing_piece() {
        let request = ConstructionRequest::new(7, 8, 9, Coordinates::new(1.0, 2.0));
        let input = OrderPreconditions {
            request: &request,
            project: None,
            construction_type: None,
            requester: None,
        };
        let errors = OrderPreconditionContract::new().validate(&input).unwrap_err();
        assert_eq!(
            OrderPreconditionContract::detail(&errors),
            "project 7 is missing; construction type 8 is missing; requester 9 is missing; request date is missing"
        );
    }

    #[test]
    fn test_preconditions_pass() {
        let request = ConstructionRequest::new(1, 1, 1, Coordinates::new(1.0, 2.0))
            .with_request_date(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        let project = Project::new("P");
        let construction_type = ConstructionType::new("HOUSE", 3);
        let user = User::new("arq1", "Juliana Lopez");
        let input = OrderPreconditions {
            request: &request,
            project: Some(&project),
            construction_type: Some(&construction_type),
            requester: Some(&user),
        };
        assert!(OrderPreconditionContract::new().validate(&input).is_ok());
    }
}
