//! Order metrics and reports
//!
//! Aggregates are recomputed from the repositories on every call.

use std::collections::{BTreeMap, HashMap};

use bd_core::error::BdError;
use bd_core::result::BdResult;
use bd_core::traits::Id;
use bd_db::Repositories;
use bd_models::{ConstructionOrder, OrderStatus, Project};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    pub construction_type_id: Id,
    pub type_name: String,
    pub total: usize,
    pub by_status: BTreeMap<OrderStatus, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReportRow {
    pub order_id: Id,
    pub project_name: String,
    pub type_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionSummaryRow {
    pub type_name: String,
    pub total_finished: usize,
    pub total_in_progress: usize,
    pub total_pending: usize,
}

fn zeroed() -> BTreeMap<OrderStatus, usize> {
    OrderStatus::ALL.iter().map(|s| (*s, 0)).collect()
}

pub struct MetricsService {
    repos: Repositories,
}

impl MetricsService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Global order count per status, zeros included
    pub async fn status_counts(&self) -> BdResult<Vec<StatusCount>> {
        let mut counts = zeroed();
        for order in self.repos.orders.find_all().await? {
            *counts.entry(order.status).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    pub async fn type_stats(&self) -> BdResult<Vec<TypeStats>> {
        let orders = self.repos.orders.find_all().await?;
        self.stats_for(&orders).await
    }

    pub async fn project_type_stats(&self, project_id: Id) -> BdResult<Vec<TypeStats>> {
        if self.repos.projects.find_by_id(project_id).await?.is_none() {
            return Err(BdError::not_found::<Project>(project_id));
        }
        let orders = self.repos.orders.find_by_project_id(project_id).await?;
        self.stats_for(&orders).await
    }

    async fn stats_for(&self, orders: &[ConstructionOrder]) -> BdResult<Vec<TypeStats>> {
        let mut stats: Vec<TypeStats> = self
            .repos
            .construction_types
            .find_all()
            .await?
            .into_iter()
            .filter_map(|t| {
                Some(TypeStats {
                    construction_type_id: t.id?,
                    type_name: t.name,
                    total: 0,
                    by_status: zeroed(),
                })
            })
            .collect();

        for order in orders {
            if let Some(entry) = stats
                .iter_mut()
                .find(|s| s.construction_type_id == order.construction_type_id)
            {
                entry.total += 1;
                *entry.by_status.entry(order.status).or_default() += 1;
            }
        }
        stats.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        Ok(stats)
    }

    /// Flat order listing, optionally restricted to one status
    pub async fn orders_report(&self, status: Option<OrderStatus>) -> BdResult<Vec<OrderReportRow>> {
        let orders = match status {
            Some(status) => self.repos.orders.find_by_status(status).await?,
            None => self.repos.orders.find_all().await?,
        };
        let project_names: HashMap<Id, String> = self
            .repos
            .projects
            .find_all()
            .await?
            .into_iter()
            .filter_map(|p| Some((p.id?, p.name)))
            .collect();
        let type_names: HashMap<Id, String> = self
            .repos
            .construction_types
            .find_all()
            .await?
            .into_iter()
            .filter_map(|t| Some((t.id?, t.name)))
            .collect();

        Ok(orders
            .into_iter()
            .map(|o| OrderReportRow {
                order_id: o.id.unwrap_or_default(),
                project_name: project_names.get(&o.project_id).cloned().unwrap_or_default(),
                type_name: type_names
                    .get(&o.construction_type_id)
                    .cloned()
                    .unwrap_or_default(),
                latitude: o.latitude,
                longitude: o.longitude,
                start: o.scheduled_start_date,
                end: o.scheduled_end_date,
                status: o.status,
            })
            .collect())
    }

    pub async fn construction_summary(&self) -> BdResult<Vec<ConstructionSummaryRow>> {
        Ok(self
            .type_stats()
            .await?
            .into_iter()
            .map(|s| {
                let count = |status: OrderStatus| s.by_status.get(&status).copied().unwrap_or(0);
                ConstructionSummaryRow {
                    total_finished: count(OrderStatus::Finished),
                    total_in_progress: count(OrderStatus::InProgress),
                    total_pending: count(OrderStatus::Pending),
                    type_name: s.type_name,
                }
            })
            .collect())
    }
}
