//! # bd-services
//!
//! Lifecycle engine and business services for Builders RS.
//!
//! A request is classified synchronously on submission
//! ([`RequestApprovalPipeline`]), turned into a scheduled order in the
//! background ([`OrderCreationWorkflow`]) and then moved through its states by
//! the daily sweep ([`LifecycleScheduler`]). Stock only changes through the
//! [`InventoryLedger`].

pub mod approval;
pub mod catalog;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod locks;
pub mod metrics;
pub mod order_workflow;
pub mod orders;
pub mod requests;
pub mod scheduling;
pub mod seed;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use bd_core::clock::Clock;
use bd_db::Repositories;
use bd_notifications::{Notifier, WorkerPool};

pub use approval::{Classification, RequestApprovalPipeline};
pub use catalog::{ConstructionTypeService, MaterialService, ProjectService};
pub use ledger::{InventoryLedger, LedgerError};
pub use lifecycle::{LifecycleScheduler, Phase, PhaseReport};
pub use locks::KeyedLocks;
pub use metrics::MetricsService;
pub use order_workflow::{OrderCreationWorkflow, WorkflowOutcome};
pub use orders::OrderQueryService;
pub use requests::ConstructionRequestService;
pub use scheduling::{ScheduleWindow, SchedulingCalculator};
pub use trigger::CalendarTrigger;

/// Every service, wired against one set of repositories
pub struct Services {
    pub repos: Repositories,
    pub clock: Arc<dyn Clock>,
    pub pool: WorkerPool,
    pub ledger: Arc<InventoryLedger>,
    pub requests: ConstructionRequestService,
    pub orders: OrderQueryService,
    pub projects: ProjectService,
    pub materials: MaterialService,
    pub construction_types: ConstructionTypeService,
    pub lifecycle: Arc<LifecycleScheduler>,
    pub metrics: MetricsService,
}

impl Services {
    pub fn new(
        repos: Repositories,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        pool: WorkerPool,
    ) -> Self {
        // Order creation, the sweep and project edits serialize on these
        let project_locks = KeyedLocks::new();
        let ledger = Arc::new(InventoryLedger::new(repos.materials.clone()));

        let workflow = Arc::new(OrderCreationWorkflow::new(
            repos.clone(),
            ledger.clone(),
            notifier.clone(),
            project_locks.clone(),
        ));
        let requests = ConstructionRequestService::new(
            repos.clone(),
            RequestApprovalPipeline::new(repos.orders.clone(), ledger.clone()),
            workflow,
            notifier.clone(),
            clock.clone(),
            pool.clone(),
        );
        let lifecycle = Arc::new(LifecycleScheduler::new(
            repos.clone(),
            notifier,
            project_locks.clone(),
        ));

        Self {
            requests,
            orders: OrderQueryService::new(repos.clone()),
            projects: ProjectService::new(repos.clone(), project_locks),
            materials: MaterialService::new(repos.clone(), ledger.clone()),
            construction_types: ConstructionTypeService::new(repos.clone()),
            metrics: MetricsService::new(repos.clone()),
            lifecycle,
            ledger,
            clock,
            pool,
            repos,
        }
    }
}
