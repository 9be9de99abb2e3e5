//! Construction type catalog
//!
//! A construction type fixes how many working days a build takes and the
//! recipe of materials one order consumes.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Entity, Id, Identifiable};

/// One recipe line: a fixed quantity of a material per order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub material_id: Id,
    pub quantity: f64,
}

impl RecipeLine {
    pub fn new(material_id: Id, quantity: f64) -> Self {
        Self {
            material_id,
            quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionType {
    pub id: Option<Id>,
    pub name: String,
    /// Working days, excluding the handover day
    pub duration_days: i32,
    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
}

impl ConstructionType {
    pub fn new(name: impl Into<String>, duration_days: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            duration_days,
            recipe: Vec::new(),
        }
    }

    pub fn with_line(mut self, material_id: Id, quantity: f64) -> Self {
        self.recipe.push(RecipeLine::new(material_id, quantity));
        self
    }
}

impl Identifiable for ConstructionType {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for ConstructionType {
    const TYPE_NAME: &'static str = "ConstructionType";
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConstructionTypeDto {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub duration_days: i32,
    #[validate(length(min = 1, message = "must contain at least one material"))]
    pub recipe: Vec<RecipeLine>,
}

/// A present `recipe` replaces the whole recipe
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConstructionTypeDto {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub duration_days: Option<i32>,
    #[validate(length(min = 1, message = "must contain at least one material"))]
    pub recipe: Option<Vec<RecipeLine>>,
}
