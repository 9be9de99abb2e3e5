//! Catalog contracts: projects, materials and construction types
//!
//! Uniqueness against stored data is checked by the services; these contracts
//! only look at the payload itself.

use std::collections::HashSet;

use bd_core::error::ValidationErrors;
use bd_models::{
    CreateConstructionTypeDto, CreateMaterialDto, CreateProjectDto, RecipeLine,
    UpdateConstructionTypeDto, UpdateMaterialDto, UpdateProjectDto,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::base::{validate_dto, Contract, ValidationResult};

static MATERIAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{0,15}$").expect("valid material code regex"));

#[derive(Debug, Default)]
pub struct ProjectContract;

impl Contract<CreateProjectDto> for ProjectContract {
    fn validate(&self, dto: &CreateProjectDto) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_dto(dto) {
            errors.merge(e);
        }
        if dto.name.trim().is_empty() && !errors.has_error("name") {
            errors.add("name", "can't be blank");
        }
        errors.into_result()
    }
}

impl Contract<UpdateProjectDto> for ProjectContract {
    fn validate(&self, dto: &UpdateProjectDto) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_dto(dto) {
            errors.merge(e);
        }
        if let Some(name) = &dto.name {
            if name.trim().is_empty() && !errors.has_error("name") {
                errors.add("name", "can't be blank");
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Default)]
pub struct MaterialContract;

impl Contract<CreateMaterialDto> for MaterialContract {
    fn validate(&self, dto: &CreateMaterialDto) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_dto(dto) {
            errors.merge(e);
        }
        if !errors.has_error("code") && !MATERIAL_CODE.is_match(&dto.code) {
            errors.add("code", "must start with a letter and contain only letters, digits, '-' or '_'");
        }
        if !dto.stock.is_finite() {
            errors.add("stock", "must be a finite number");
        }
        errors.into_result()
    }
}

impl Contract<UpdateMaterialDto> for MaterialContract {
    fn validate(&self, dto: &UpdateMaterialDto) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_dto(dto) {
            errors.merge(e);
        }
        for (field, value) in [("name", &dto.name), ("unit", &dto.unit)] {
            if let Some(value) = value {
                if value.trim().is_empty() && !errors.has_error(field) {
                    errors.add(field, "can't be blank");
                }
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Default)]
pub struct ConstructionTypeContract;

fn check_recipe(recipe: &[RecipeLine], errors: &mut ValidationErrors) {
    let mut seen = HashSet::new();
    for line in recipe {
        if !(line.quantity.is_finite() && line.quantity > 0.0) {
            errors.add(
                "recipe",
                format!("quantity for material {} must be greater than 0", line.material_id),
            );
        }
        if !seen.insert(line.material_id) {
            errors.add(
                "recipe",
                format!("material {} is listed more than once", line.material_id),
            );
        }
    }
}

impl Contract<CreateConstructionTypeDto> for ConstructionTypeContract {
    fn validate(&self, dto: &CreateConstructionTypeDto) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_dto(dto) {
            errors.merge(e);
        }

        check_recipe(&dto.recipe, &mut errors);
        errors.into_result()
    }
}

impl Contract<UpdateConstructionTypeDto> for ConstructionTypeContract {
    fn validate(&self, dto: &UpdateConstructionTypeDto) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_dto(dto) {
            errors.merge(e);
        }
        if let Some(name) = &dto.name {
            if name.trim().is_empty() && !errors.has_error("name") {
                errors.add("name", "can't be blank");
            }
        }
        if let Some(recipe) = &dto.recipe {
            check_recipe(recipe, &mut errors);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_code_format() {
        let mut dto = CreateMaterialDto {
            code: "Ce".into(),
            name: "Cement".into(),
            unit: "kg".into(),
            stock: 1000.0,
        };
        assert!(MaterialContract.validate(&dto).is_ok());

        dto.code = "9x".into();
        let errors = MaterialContract.validate(&dto).unwrap_err();
        assert!(errors.has_error("code"));
    }

    #[test]
    fn test_negative_stock_rejected() {
        let dto = CreateMaterialDto {
            code: "Gr".into(),
            name: "Gravel".into(),
            unit: "kg".into(),
            stock: -1.0,
        };
        assert!(MaterialContract.validate(&dto).unwrap_err().has_error("stock"));
    }

    #[test]
    fn test_construction_type_recipe() {
        let dto = CreateConstructionTypeDto {
            name: "HOUSE".into(),
            duration_days: 0,
            recipe: vec![RecipeLine::new(1, 100.0), RecipeLine::new(1, 0.0)],
        };
        let errors = ConstructionTypeContract.validate(&dto).unwrap_err();
        assert!(errors.has_error("duration_days"));
        assert_eq!(errors.get("recipe").map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_construction_type_update_checks_new_recipe() {
        let dto = UpdateConstructionTypeDto {
            recipe: Some(vec![RecipeLine::new(2, 5.0), RecipeLine::new(2, 1.0)]),
            ..Default::default()
        };
        let errors = ConstructionTypeContract.validate(&dto).unwrap_err();
        assert_eq!(
            errors.get("recipe").cloned(),
            Some(vec!["material 2 is listed more than once".to_string()])
        );

        let dto = UpdateConstructionTypeDto {
            duration_days: Some(0),
            ..Default::default()
        };
        assert!(ConstructionTypeContract.validate(&dto).unwrap_err().has_error("duration_days"));
        assert!(ConstructionTypeContract
            .validate(&UpdateConstructionTypeDto::default())
            .is_ok());
    }

    #[test]
    fn test_blank_material_unit_on_update() {
        let dto = UpdateMaterialDto {
            name: None,
            unit: Some("  ".into()),
        };
        assert!(MaterialContract.validate(&dto).unwrap_err().has_error("unit"));
    }

    #[test]
    fn test_blank_project_name() {
        let dto = CreateProjectDto {
            name: "   ".into(),
            description: None,
        };
        assert!(ProjectContract.validate(&dto).unwrap_err().has_error("name"));
    }
}
