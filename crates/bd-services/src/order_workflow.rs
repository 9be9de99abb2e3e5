//! Order Creation Workflow
//!
//! Turns a PENDING request into exactly one scheduled order, or settles it as
//! FAILED. Runs in the background after submission. The whole run holds the
//! project's lock, so window computation and the commit that claims the
//! window are serialized per project.
//!
//! Steps, in order:
//! 1. resolve the construction type (missing type or duration is fatal)
//! 2. re-check structural completeness against fresh data
//! 3. compute the schedule window
//! 4. reserve stock, build the consumption table
//! 5. persist the order; a failed save returns the reserved stock
//! 6. approve the request; if that cannot be saved the order is removed and
//!    its stock returned
//! 7. on success move the project end date and notify
//! 8. on failure fail the request and notify

use std::sync::Arc;

use bd_contracts::requests::{OrderPreconditionContract, OrderPreconditions};
use bd_contracts::Contract;
use bd_core::error::BdError;
use bd_core::result::BdResult;
use bd_core::traits::Id;
use bd_db::Repositories;
use bd_models::{ConstructionOrder, ConstructionRequest, ConstructionType, OrderStatus, RequestStatus};
use bd_notifications::{EventType, Notifier, WorkerPool};

use crate::events;
use crate::ledger::{ConsumptionSnapshot, InventoryLedger};
use crate::locks::KeyedLocks;
use crate::scheduling::SchedulingCalculator;

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    Approved(ConstructionOrder),
    Failed { detail: String },
    /// The request had already settled; nothing was done
    Skipped(RequestStatus),
}

enum Failure {
    /// Structural gate rejected the request
    Incomplete(String),
    Error(BdError),
}

impl From<BdError> for Failure {
    fn from(err: BdError) -> Self {
        Failure::Error(err)
    }
}

pub struct OrderCreationWorkflow {
    repos: Repositories,
    ledger: Arc<InventoryLedger>,
    scheduler: SchedulingCalculator,
    notifier: Arc<dyn Notifier>,
    project_locks: KeyedLocks,
}

impl OrderCreationWorkflow {
    pub fn new(
        repos: Repositories,
        ledger: Arc<InventoryLedger>,
        notifier: Arc<dyn Notifier>,
        project_locks: KeyedLocks,
    ) -> Self {
        Self {
            scheduler: SchedulingCalculator::new(repos.orders.clone()),
            repos,
            ledger,
            notifier,
            project_locks,
        }
    }

    /// Run in the background on `pool`
    pub fn spawn(self: &Arc<Self>, pool: &WorkerPool, request_id: Id) {
        let workflow = self.clone();
        pool.spawn("order_creation", async move {
            match workflow.run(request_id).await {
                Ok(WorkflowOutcome::Approved(order)) => {
                    tracing::info!(request_id, order_id = ?order.id, "Order created");
                }
                Ok(WorkflowOutcome::Failed { detail }) => {
                    tracing::warn!(request_id, %detail, "Order creation failed");
                }
                Ok(WorkflowOutcome::Skipped(status)) => {
                    tracing::debug!(request_id, %status, "Request already settled");
                }
                Err(e) => {
                    tracing::error!(request_id, error = %e, "Order creation workflow aborted");
                }
            }
        });
    }

    async fn load_request(&self, request_id: Id) -> BdResult<ConstructionRequest> {
        self.repos
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| BdError::not_found::<ConstructionRequest>(request_id))
    }

    pub async fn run(&self, request_id: Id) -> BdResult<WorkflowOutcome> {
        let request = self.load_request(request_id).await?;
        if request.status.is_terminal() {
            return Ok(WorkflowOutcome::Skipped(request.status));
        }

        let _project_guard = self.project_locks.lock(request.project_id).await;

        // Another run may have settled it while we waited
        let request = self.load_request(request_id).await?;
        if request.status.is_terminal() {
            return Ok(WorkflowOutcome::Skipped(request.status));
        }

        match self.create_order(&request).await {
            Ok((order, construction_type)) => match self.settle_approved(&request, &order).await {
                Ok(approved) => Ok(self.approve(approved, order, &construction_type).await),
                Err(e) => {
                    self.roll_back(&order).await;
                    self.fail(request, Failure::Error(e)).await
                }
            },
            Err(failure) => self.fail(request, failure).await,
        }
    }

    async fn resolve_type(&self, request: &ConstructionRequest) -> BdResult<ConstructionType> {
        let construction_type = self
            .repos
            .construction_types
            .find_by_id(request.construction_type_id)
            .await?
            .ok_or_else(|| {
                BdError::Config(format!(
                    "construction type {} not found",
                    request.construction_type_id
                ))
            })?;
        if construction_type.duration_days <= 0 {
            return Err(BdError::Config(format!(
                "construction type {} has no positive duration ({})",
                construction_type.name, construction_type.duration_days
            )));
        }
        Ok(construction_type)
    }

    async fn create_order(
        &self,
        request: &ConstructionRequest,
    ) -> Result<(ConstructionOrder, ConstructionType), Failure> {
        let construction_type = self.resolve_type(request).await?;

        let project = self
            .repos
            .projects
            .find_by_id(request.project_id)
            .await
            .map_err(BdError::from)?;
        let requester = self
            .repos
            .users
            .find_by_id(request.requested_by)
            .await
            .map_err(BdError::from)?;
        let preconditions = OrderPreconditions {
            request,
            project: project.as_ref(),
            construction_type: Some(&construction_type),
            requester: requester.as_ref(),
        };
        if let Err(errors) = OrderPreconditionContract::new().validate(&preconditions) {
            return Err(Failure::Incomplete(OrderPreconditionContract::detail(&errors)));
        }
        let request_date = request
            .request_date
            .ok_or_else(|| Failure::Incomplete("request date is missing".into()))?;

        let window = self
            .scheduler
            .next_window(request.project_id, request_date, construction_type.duration_days)
            .await?;

        let occupied = self
            .repos
            .orders
            .exists_by_coordinates(request.project_id, request.latitude, request.longitude)
            .await
            .map_err(BdError::from)?;
        if occupied {
            return Err(BdError::conflict(format!(
                "coordinate {} is already occupied in project {}",
                request.coordinates(),
                request.project_id
            ))
            .into());
        }

        let snapshot = self
            .ledger
            .check_and_reserve(&construction_type.recipe)
            .await
            .map_err(BdError::from)?;

        let order = ConstructionOrder {
            id: None,
            request_id: request.id.unwrap_or_default(),
            project_id: request.project_id,
            construction_type_id: request.construction_type_id,
            requested_by: request.requested_by,
            latitude: request.latitude,
            longitude: request.longitude,
            requested_date: request_date,
            scheduled_start_date: window.start,
            scheduled_end_date: window.end,
            status: OrderStatus::Pending,
            observations: snapshot.observation_table(),
            materials_consumption: snapshot.lines.clone(),
            created_at: None,
            updated_at: None,
        };

        match self.repos.orders.save(order).await {
            Ok(order) => Ok((order, construction_type)),
            Err(e) => {
                if let Err(release_err) = self.ledger.release(&snapshot).await {
                    tracing::error!(
                        request_id = ?request.id,
                        error = %release_err,
                        "Failed to release stock after order save failure"
                    );
                }
                Err(BdError::from(e).into())
            }
        }
    }

    async fn settle_approved(
        &self,
        request: &ConstructionRequest,
        order: &ConstructionOrder,
    ) -> BdResult<ConstructionRequest> {
        let mut request = request.clone();
        request.settle(
            RequestStatus::Approved,
            format!(
                "Approved: order {} scheduled {} → {} at {}",
                order.id.unwrap_or_default(),
                order.scheduled_start_date,
                order.scheduled_end_date,
                order.coordinates()
            ),
        )?;
        Ok(self.repos.requests.save(request).await?)
    }

    /// Undo a saved order: drop it and give its stock back
    async fn roll_back(&self, order: &ConstructionOrder) {
        if let Some(order_id) = order.id {
            if let Err(e) = self.repos.orders.delete(order_id).await {
                tracing::error!(order_id, error = %e, "Failed to remove order during rollback");
            }
        }
        let snapshot = ConsumptionSnapshot {
            lines: order.materials_consumption.clone(),
        };
        if let Err(e) = self.ledger.release(&snapshot).await {
            tracing::error!(order_id = ?order.id, error = %e, "Failed to release stock during rollback");
        }
    }

    async fn approve(
        &self,
        request: ConstructionRequest,
        order: ConstructionOrder,
        construction_type: &ConstructionType,
    ) -> WorkflowOutcome {
        match self.repos.projects.find_by_id(order.project_id).await {
            Ok(Some(mut project)) => {
                project.end_date = project.end_date.max(Some(order.scheduled_end_date));
                if let Err(e) = self.repos.projects.save(project).await {
                    tracing::error!(project_id = order.project_id, error = %e, "Failed to update project end date");
                }
            }
            Ok(None) => {
                tracing::warn!(project_id = order.project_id, "Project vanished after order commit");
            }
            Err(e) => {
                tracing::error!(project_id = order.project_id, error = %e, "Failed to load project after order commit");
            }
        }

        self.notifier
            .broadcast(
                events::order_event(EventType::OrderCreated, &order, &construction_type.name),
                order.requested_by,
            )
            .await;
        self.notifier
            .broadcast(
                events::request_event(EventType::ConstructionRequestApproved, &request),
                request.requested_by,
            )
            .await;

        WorkflowOutcome::Approved(order)
    }

    async fn fail(
        &self,
        mut request: ConstructionRequest,
        failure: Failure,
    ) -> BdResult<WorkflowOutcome> {
        let (detail, note, incomplete) = match failure {
            Failure::Incomplete(detail) => {
                let note = format!("[FAILED] {}", detail);
                (detail, note, true)
            }
            Failure::Error(e) => {
                let detail = e.to_string();
                let note = format!("Order creation error: {}", detail);
                (detail, note, false)
            }
        };

        request.settle(RequestStatus::Failed, note)?;
        let request = self.repos.requests.save(request).await?;

        if incomplete {
            self.notifier
                .broadcast(
                    events::request_failed_event(&request, &detail),
                    request.requested_by,
                )
                .await;
        }
        self.notifier
            .broadcast(
                events::order_failed_event(&request, &detail),
                request.requested_by,
            )
            .await;
        self.notifier
            .broadcast(
                events::request_event(EventType::ConstructionRequestFailed, &request),
                request.requested_by,
            )
            .await;

        Ok(WorkflowOutcome::Failed { detail })
    }
}
