//! Lifecycle Scheduler
//!
//! The daily sweep. Each phase is a function of (date, current state) and only
//! touches entities still in the expected prior state, so running a phase
//! twice for the same date changes nothing the second time.
//!
//! Project mutations take the same per-project lock as order creation.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bd_core::error::BdError;
use bd_core::result::BdResult;
use bd_core::traits::Id;
use bd_db::Repositories;
use bd_models::{ConstructionOrder, OrderStatus, Project};
use bd_notifications::{EventType, Notifier};
use chrono::NaiveDate;
use serde::Serialize;

use crate::events;
use crate::locks::KeyedLocks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Finish,
    Delivery,
    Progress,
}

impl Phase {
    /// Sweep order
    pub const ALL: [Phase; 4] = [Phase::Start, Phase::Finish, Phase::Delivery, Phase::Progress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Finish => "finish",
            Phase::Delivery => "delivery",
            Phase::Progress => "progress",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = BdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| BdError::NotFound {
                entity: "Phase",
                field: "name",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReport {
    pub phase: Phase,
    pub date: NaiveDate,
    /// Orders transitioned or projects changed
    pub affected: usize,
}

pub struct LifecycleScheduler {
    repos: Repositories,
    notifier: Arc<dyn Notifier>,
    project_locks: KeyedLocks,
}

impl LifecycleScheduler {
    pub fn new(repos: Repositories, notifier: Arc<dyn Notifier>, project_locks: KeyedLocks) -> Self {
        Self {
            repos,
            notifier,
            project_locks,
        }
    }

    pub async fn run(&self, phase: Phase, date: NaiveDate) -> BdResult<PhaseReport> {
        let affected = match phase {
            Phase::Start => self.start_orders(date).await?,
            Phase::Finish => self.finish_orders(date).await?,
            Phase::Delivery => self.update_delivery(date).await?,
            Phase::Progress => self.update_progress().await?,
        };
        tracing::info!(phase = %phase, %date, affected, "Lifecycle phase completed");
        Ok(PhaseReport {
            phase,
            date,
            affected,
        })
    }

    pub async fn start(&self, date: NaiveDate) -> BdResult<PhaseReport> {
        self.run(Phase::Start, date).await
    }

    pub async fn finish(&self, date: NaiveDate) -> BdResult<PhaseReport> {
        self.run(Phase::Finish, date).await
    }

    pub async fn delivery(&self, date: NaiveDate) -> BdResult<PhaseReport> {
        self.run(Phase::Delivery, date).await
    }

    pub async fn progress(&self, date: NaiveDate) -> BdResult<PhaseReport> {
        self.run(Phase::Progress, date).await
    }

    /// All four phases for `date`, start through progress
    pub async fn run_all(&self, date: NaiveDate) -> BdResult<Vec<PhaseReport>> {
        let mut reports = Vec::with_capacity(Phase::ALL.len());
        for phase in Phase::ALL {
            reports.push(self.run(phase, date).await?);
        }
        Ok(reports)
    }

    async fn start_orders(&self, date: NaiveDate) -> BdResult<usize> {
        let orders = self.repos.orders.find_by_scheduled_start_date(date).await?;
        let started = self
            .advance(orders, OrderStatus::Pending, OrderStatus::InProgress, EventType::OrderStarted)
            .await?;

        let projects: BTreeSet<Id> = started.iter().map(|o| o.project_id).collect();
        for project_id in projects {
            let _guard = self.project_locks.lock(project_id).await;
            let Some(mut project) = self.repos.projects.find_by_id(project_id).await? else {
                tracing::warn!(project_id, "Started order belongs to a missing project");
                continue;
            };
            if project.mark_started(date) {
                self.repos.projects.save(project).await?;
                tracing::debug!(project_id, %date, "Project marked in progress");
            }
        }
        Ok(started.len())
    }

    async fn finish_orders(&self, date: NaiveDate) -> BdResult<usize> {
        let orders = self.repos.orders.find_by_scheduled_end_date(date).await?;
        let finished = self
            .advance(orders, OrderStatus::InProgress, OrderStatus::Finished, EventType::OrderFinished)
            .await?;
        Ok(finished.len())
    }

    /// Move every order in `from` to `to`, one notification per transition
    async fn advance(
        &self,
        orders: Vec<ConstructionOrder>,
        from: OrderStatus,
        to: OrderStatus,
        event_type: EventType,
    ) -> BdResult<Vec<ConstructionOrder>> {
        let mut type_names: HashMap<Id, String> = HashMap::new();
        let mut moved = Vec::new();

        for mut order in orders.into_iter().filter(|o| o.status == from) {
            order.advance_to(to)?;
            let order = self.repos.orders.save(order).await?;
            tracing::debug!(order_id = ?order.id, status = %order.status, "Order advanced");

            let type_name = match type_names.get(&order.construction_type_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .repos
                        .construction_types
                        .find_by_id(order.construction_type_id)
                        .await?
                        .map(|t| t.name)
                        .unwrap_or_default();
                    type_names.insert(order.construction_type_id, name.clone());
                    name
                }
            };
            self.notifier
                .broadcast(events::order_event(event_type, &order, &type_name), order.requested_by)
                .await;
            moved.push(order);
        }
        Ok(moved)
    }

    async fn update_delivery(&self, date: NaiveDate) -> BdResult<usize> {
        let projects: BTreeSet<Id> = self
            .repos
            .orders
            .find_by_scheduled_end_date(date)
            .await?
            .into_iter()
            .filter(|o| o.status == OrderStatus::Finished)
            .map(|o| o.project_id)
            .collect();

        let mut changed = 0;
        for project_id in projects {
            let _guard = self.project_locks.lock(project_id).await;
            let Some(mut project) = self.repos.projects.find_by_id(project_id).await? else {
                continue;
            };
            let latest = self.repos.orders.max_scheduled_end_date(project_id).await?;
            if latest.is_none() || project.end_date == latest {
                continue;
            }
            project.end_date = latest;
            let project = self.repos.projects.save(project).await?;
            self.announce(EventType::ProjectDeliveryUpdated, &project).await;
            changed += 1;
        }
        Ok(changed)
    }

    async fn update_progress(&self) -> BdResult<usize> {
        let mut changed = 0;
        for project in self.repos.projects.find_all().await? {
            let Some(project_id) = project.id else { continue };
            let _guard = self.project_locks.lock(project_id).await;

            let total = self.repos.orders.count_by_project(project_id).await?;
            if total == 0 {
                continue;
            }
            let finished = self.repos.orders.count_finished_by_project(project_id).await?;
            let percentage = 100.0 * finished as f64 / total as f64;

            let Some(mut project) = self.repos.projects.find_by_id(project_id).await? else {
                continue;
            };
            if (project.progress_percentage - percentage).abs() < f64::EPSILON {
                continue;
            }
            project.progress_percentage = percentage;
            let project = self.repos.projects.save(project).await?;
            self.announce(EventType::ProjectProgressUpdated, &project).await;
            changed += 1;
        }
        Ok(changed)
    }

    async fn announce(&self, event_type: EventType, project: &Project) {
        let event = events::project_event(event_type, project);
        match project.created_by {
            Some(owner) => self.notifier.broadcast(event, owner).await,
            None => self.notifier.send(event).await,
        }
    }
}
