//! Inventory Ledger
//!
//! The single writer of material stock. A recipe is either satisfied and
//! deducted as a whole or not touched at all. Per-material locks make
//! check-then-deduct linearizable; multi-material reservations take their
//! locks in ascending id order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bd_core::error::BdError;
use bd_core::traits::Id;
use bd_db::{MaterialRepository, RepositoryError};
use bd_models::{MaterialConsumption, MaterialType, RecipeLine};
use thiserror::Error;

use crate::locks::KeyedLocks;

/// One material the recipe needs more of than is in stock
#[derive(Debug, Clone, PartialEq)]
pub struct Shortage {
    pub material_id: Id,
    pub material_name: String,
    pub required: f64,
    pub available: f64,
}

impl fmt::Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (required {}, available {})",
            self.material_name, self.required, self.available
        )
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Insufficient stock for: {}", format_shortages(.0))]
    InsufficientStock(Vec<Shortage>),

    #[error("Unknown material {0}")]
    UnknownMaterial(Id),

    #[error("Invalid quantity {quantity} for material {material_id}")]
    InvalidQuantity { material_id: Id, quantity: f64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn format_shortages(shortages: &[Shortage]) -> String {
    shortages
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<LedgerError> for BdError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownMaterial(id) => BdError::NotFound {
                entity: "MaterialType",
                field: "id",
                value: id.to_string(),
            },
            LedgerError::Repository(e) => e.into(),
            other => BdError::conflict(other.to_string()),
        }
    }
}

/// Committed deduction of one recipe, in recipe order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsumptionSnapshot {
    pub lines: Vec<MaterialConsumption>,
}

impl ConsumptionSnapshot {
    /// Human-readable table for the order's observations
    pub fn observation_table(&self) -> String {
        let mut table = String::from("Material | StockBefore | Required | StockAfter");
        for line in &self.lines {
            table.push_str(&format!(
                "\n{} | {} | {} | {}",
                line.material_name, line.stock_before, line.required, line.stock_after
            ));
        }
        table
    }
}

/// Read-only view of whether a recipe could be satisfied right now
#[derive(Debug, Clone, Default)]
pub struct StockProjection {
    pub shortages: Vec<Shortage>,
}

impl StockProjection {
    pub fn is_sufficient(&self) -> bool {
        self.shortages.is_empty()
    }
}

pub struct InventoryLedger {
    materials: Arc<dyn MaterialRepository>,
    locks: KeyedLocks,
}

/// Sum quantities per material, keeping first-seen order
fn aggregate(recipe: &[RecipeLine]) -> LedgerResult<Vec<(Id, f64)>> {
    let mut order = Vec::new();
    let mut totals: HashMap<Id, f64> = HashMap::new();
    for line in recipe {
        if !(line.quantity.is_finite() && line.quantity > 0.0) {
            return Err(LedgerError::InvalidQuantity {
                material_id: line.material_id,
                quantity: line.quantity,
            });
        }
        let total = totals.entry(line.material_id).or_insert_with(|| {
            order.push(line.material_id);
            0.0
        });
        *total += line.quantity;
    }
    Ok(order.into_iter().map(|id| (id, totals[&id])).collect())
}

impl InventoryLedger {
    pub fn new(materials: Arc<dyn MaterialRepository>) -> Self {
        Self {
            materials,
            locks: KeyedLocks::new(),
        }
    }

    async fn load(&self, id: Id) -> LedgerResult<MaterialType> {
        self.materials
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::UnknownMaterial(id))
    }

    /// Compare the recipe with current stock without reserving anything
    pub async fn preview(&self, recipe: &[RecipeLine]) -> LedgerResult<StockProjection> {
        let mut projection = StockProjection::default();
        for (material_id, required) in aggregate(recipe)? {
            let material = self.load(material_id).await?;
            if material.stock < required {
                projection.shortages.push(Shortage {
                    material_id,
                    material_name: material.name,
                    required,
                    available: material.stock,
                });
            }
        }
        Ok(projection)
    }

    /// Atomically check every line and deduct all of them, or none
    pub async fn check_and_reserve(&self, recipe: &[RecipeLine]) -> LedgerResult<ConsumptionSnapshot> {
        let lines = aggregate(recipe)?;
        let _guards = self.locks.lock_many(lines.iter().map(|(id, _)| *id)).await;

        let mut loaded = Vec::with_capacity(lines.len());
        let mut shortages = Vec::new();
        for (material_id, required) in &lines {
            let material = self.load(*material_id).await?;
            if material.stock < *required {
                shortages.push(Shortage {
                    material_id: *material_id,
                    material_name: material.name.clone(),
                    required: *required,
                    available: material.stock,
                });
            }
            loaded.push((material, *required));
        }
        if !shortages.is_empty() {
            return Err(LedgerError::InsufficientStock(shortages));
        }

        let mut snapshot = ConsumptionSnapshot::default();
        for (material, required) in loaded {
            let before = material.stock;
            let mut updated = material.clone();
            updated.stock = before - required;

            if let Err(e) = self.materials.save(updated).await {
                self.undo(&snapshot).await;
                return Err(e.into());
            }
            snapshot.lines.push(MaterialConsumption {
                material_id: material.id.unwrap_or_default(),
                material_name: material.name,
                stock_before: before,
                required,
                stock_after: before - required,
            });
        }

        tracing::debug!(lines = snapshot.lines.len(), "Stock reserved");
        Ok(snapshot)
    }

    /// Give back a reservation whose order could not be committed
    pub async fn release(&self, snapshot: &ConsumptionSnapshot) -> LedgerResult<()> {
        let _guards = self
            .locks
            .lock_many(snapshot.lines.iter().map(|l| l.material_id))
            .await;
        for line in &snapshot.lines {
            let mut material = self.load(line.material_id).await?;
            material.stock += line.required;
            self.materials.save(material).await?;
        }
        tracing::info!(lines = snapshot.lines.len(), "Stock reservation released");
        Ok(())
    }

    /// Caller already holds the locks
    async fn undo(&self, snapshot: &ConsumptionSnapshot) {
        for line in &snapshot.lines {
            let restored = match self.load(line.material_id).await {
                Ok(mut material) => {
                    material.stock += line.required;
                    self.materials.save(material).await.map(|_| ())
                }
                Err(LedgerError::Repository(e)) => Err(e),
                Err(_) => continue,
            };
            if let Err(e) = restored {
                tracing::error!(material_id = line.material_id, error = %e, "Failed to undo partial deduction");
            }
        }
    }

    /// Add stock to a material
    pub async fn restock(&self, material_id: Id, quantity: f64) -> LedgerResult<MaterialType> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(LedgerError::InvalidQuantity {
                material_id,
                quantity,
            });
        }
        let _guard = self.locks.lock(material_id).await;
        let mut material = self.load(material_id).await?;
        material.stock += quantity;
        let saved = self.materials.save(material).await?;
        tracing::info!(material_id, quantity, stock = saved.stock, "Material restocked");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bd_db::MemoryMaterialRepository;

    async fn setup() -> (Arc<MemoryMaterialRepository>, InventoryLedger, Id, Id) {
        let repo = Arc::new(MemoryMaterialRepository::new());
        let cement = repo
            .save(MaterialType::new("Ce", "Cement", "kg", 150.0))
            .await
            .unwrap();
        let sand = repo
            .save(MaterialType::new("Ar", "Sand", "kg", 40.0))
            .await
            .unwrap();
        let ledger = InventoryLedger::new(repo.clone());
        (repo, ledger, cement.id.unwrap(), sand.id.unwrap())
    }

    async fn stock(repo: &MemoryMaterialRepository, id: Id) -> f64 {
        repo.find_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_reserve_deducts_and_snapshots() {
        let (repo, ledger, cement, sand) = setup().await;
        let recipe = vec![RecipeLine::new(cement, 100.0), RecipeLine::new(sand, 40.0)];

        let snapshot = ledger.check_and_reserve(&recipe).await.unwrap();
        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.lines[0].stock_before, 150.0);
        assert_eq!(snapshot.lines[0].stock_after, 50.0);
        assert_eq!(snapshot.lines[1].stock_after, 0.0);
        assert_eq!(stock(&repo, cement).await, 50.0);
        assert_eq!(stock(&repo, sand).await, 0.0);
        assert_eq!(
            snapshot.observation_table(),
            "Material | StockBefore | Required | StockAfter\nCement | 150 | 100 | 50\nSand | 40 | 40 | 0"
        );
    }

    #[tokio::test]
    async fn test_all_or_nothing() {
        let (repo, ledger, cement, sand) = setup().await;
        let recipe = vec![RecipeLine::new(cement, 100.0), RecipeLine::new(sand, 41.0)];

        let err = ledger.check_and_reserve(&recipe).await.unwrap_err();
        match err {
            LedgerError::InsufficientStock(shortages) => {
                assert_eq!(shortages.len(), 1);
                assert_eq!(shortages[0].material_name, "Sand");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stock(&repo, cement).await, 150.0);
        assert_eq!(stock(&repo, sand).await, 40.0);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_overdraw() {
        let (repo, ledger, cement, _) = setup().await;
        let ledger = Arc::new(ledger);
        let recipe = vec![RecipeLine::new(cement, 100.0)];

        let a = tokio::spawn({
            let ledger = ledger.clone();
            let recipe = recipe.clone();
            async move { ledger.check_and_reserve(&recipe).await.is_ok() }
        });
        let b = tokio::spawn({
            let ledger = ledger.clone();
            let recipe = recipe.clone();
            async move { ledger.check_and_reserve(&recipe).await.is_ok() }
        });
        let wins = [a.await.unwrap(), b.await.unwrap()]
            .iter()
            .filter(|ok| **ok)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(stock(&repo, cement).await, 50.0);
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let (repo, ledger, cement, _) = setup().await;
        let snapshot = ledger
            .check_and_reserve(&[RecipeLine::new(cement, 30.0)])
            .await
            .unwrap();
        ledger.release(&snapshot).await.unwrap();
        assert_eq!(stock(&repo, cement).await, 150.0);
    }

    #[tokio::test]
    async fn test_preview_is_read_only() {
        let (repo, ledger, cement, sand) = setup().await;
        let projection = ledger
            .preview(&[RecipeLine::new(cement, 10.0), RecipeLine::new(sand, 100.0)])
            .await
            .unwrap();
        assert!(!projection.is_sufficient());
        assert_eq!(projection.shortages[0].to_string(), "Sand (required 100, available 40)");
        assert_eq!(stock(&repo, sand).await, 40.0);
    }

    #[tokio::test]
    async fn test_unknown_material_and_restock() {
        let (_, ledger, cement, _) = setup().await;
        assert!(matches!(
            ledger.check_and_reserve(&[RecipeLine::new(999, 1.0)]).await,
            Err(LedgerError::UnknownMaterial(999))
        ));
        assert_eq!(ledger.restock(cement, 50.0).await.unwrap().stock, 200.0);
        assert!(ledger.restock(cement, -5.0).await.is_err());
    }
}
