//! Material catalog
//!
//! `stock` is the only ledger quantity per material. It is mutated through the
//! inventory ledger and nowhere else.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Entity, Id, Identifiable};

/// Material type with its current stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialType {
    pub id: Option<Id>,
    /// Short unique code, e.g. `Ce`
    pub code: String,
    pub name: String,
    /// Unit of measure, e.g. `kg`
    pub unit: String,
    pub stock: f64,
}

impl MaterialType {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        stock: f64,
    ) -> Self {
        Self {
            id: None,
            code: code.into(),
            name: name.into(),
            unit: unit.into(),
            stock,
        }
    }
}

impl Identifiable for MaterialType {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for MaterialType {
    const TYPE_NAME: &'static str = "MaterialType";
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialDto {
    #[validate(length(min = 1, max = 16, message = "must be between 1 and 16 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "can't be blank"))]
    pub unit: String,
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    #[serde(default)]
    pub stock: f64,
}

/// Descriptive fields only; stock moves through restock and orders
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialDto {
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32, message = "can't be blank"))]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestockDto {
    #[validate(range(min = 0.000001, message = "must be greater than 0"))]
    pub quantity: f64,
}
