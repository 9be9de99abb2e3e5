//! Construction Request Service
//!
//! Synchronous submission boundary: authorize, validate, classify, persist,
//! notify. A PENDING request is then handed to the order creation workflow on
//! the worker pool, and the caller gets the PENDING record back immediately.

use std::sync::Arc;

use bd_contracts::requests::SubmitRequestContract;
use bd_contracts::Contract;
use bd_core::clock::Clock;
use bd_core::error::BdError;
use bd_core::result::BdResult;
use bd_core::traits::{Id, UserContext};
use bd_db::Repositories;
use bd_models::{
    ConstructionRequest, ConstructionType, Coordinates, CreateRequestDto, Project, RequestStatus,
    User,
};
use bd_notifications::{EventType, Notifier, WorkerPool};

use crate::approval::RequestApprovalPipeline;
use crate::events;
use crate::order_workflow::OrderCreationWorkflow;

pub struct ConstructionRequestService {
    repos: Repositories,
    pipeline: RequestApprovalPipeline,
    workflow: Arc<OrderCreationWorkflow>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    pool: WorkerPool,
}

impl ConstructionRequestService {
    pub fn new(
        repos: Repositories,
        pipeline: RequestApprovalPipeline,
        workflow: Arc<OrderCreationWorkflow>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            repos,
            pipeline,
            workflow,
            notifier,
            clock,
            pool,
        }
    }

    /// Submit a request on behalf of `requester_id`
    pub async fn submit(
        &self,
        requester_id: Id,
        dto: CreateRequestDto,
    ) -> BdResult<ConstructionRequest> {
        let requester = self
            .repos
            .users
            .find_by_id(requester_id)
            .await?
            .ok_or_else(|| BdError::not_found::<User>(requester_id))?;
        if !requester.is_architect() {
            return Err(BdError::forbidden(
                "only architects can submit construction requests",
            ));
        }

        SubmitRequestContract::new().validate(&dto)?;
        let (project_id, type_id, latitude, longitude) = match (
            dto.project_id,
            dto.construction_type_id,
            dto.latitude,
            dto.longitude,
        ) {
            (Some(p), Some(t), Some(lat), Some(lng)) => (p, t, lat, lng),
            _ => return Err(BdError::Internal("validated request lost a field".into())),
        };

        if self.repos.projects.find_by_id(project_id).await?.is_none() {
            return Err(BdError::not_found::<Project>(project_id));
        }
        let construction_type = self
            .repos
            .construction_types
            .find_by_id(type_id)
            .await?
            .ok_or_else(|| BdError::not_found::<ConstructionType>(type_id))?;

        let request_date = dto.request_date.unwrap_or_else(|| self.clock.today());
        let mut request = ConstructionRequest::new(
            project_id,
            type_id,
            requester_id,
            Coordinates::new(latitude, longitude),
        )
        .with_request_date(request_date);

        let classification = self.pipeline.classify(&request, &construction_type).await?;
        request.status = classification.status;
        request.append_observation(&classification.observation);
        let request = self.repos.requests.save(request).await?;

        let event_type = match request.status {
            RequestStatus::Pending => EventType::ConstructionRequestCreated,
            _ => EventType::ConstructionRequestRejected,
        };
        tracing::info!(
            request_id = ?request.id,
            project_id,
            status = %request.status,
            "Construction request submitted"
        );
        self.notifier
            .broadcast(events::request_event(event_type, &request), requester_id)
            .await;

        if request.status == RequestStatus::Pending {
            if let Some(id) = request.id {
                self.workflow.spawn(&self.pool, id);
            }
        }

        Ok(request)
    }

    pub async fn get(&self, id: Id) -> BdResult<ConstructionRequest> {
        self.repos
            .requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| BdError::not_found::<ConstructionRequest>(id))
    }

    pub async fn list(&self) -> BdResult<Vec<ConstructionRequest>> {
        Ok(self.repos.requests.find_all().await?)
    }

    pub async fn list_by_project(&self, project_id: Id) -> BdResult<Vec<ConstructionRequest>> {
        Ok(self.repos.requests.find_by_project_id(project_id).await?)
    }

    pub async fn list_by_status(&self, status: RequestStatus) -> BdResult<Vec<ConstructionRequest>> {
        Ok(self.repos.requests.find_by_status(status).await?)
    }
}
