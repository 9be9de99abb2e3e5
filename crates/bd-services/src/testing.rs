//! Shared fixtures for service tests

use std::sync::Arc;

use async_trait::async_trait;
use bd_core::clock::FixedClock;
use bd_core::traits::{Id, ROLE_ARCHITECT, ROLE_USER};
use bd_db::Repositories;
use bd_models::{
    ConstructionRequest, ConstructionType, Coordinates, MaterialType, Project, User,
};
use bd_notifications::{EventType, NotificationEvent, Notifier};
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::ledger::InventoryLedger;
use crate::locks::KeyedLocks;
use crate::order_workflow::OrderCreationWorkflow;

/// Keeps every event it is handed, with the addressed user
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(NotificationEvent, Option<Id>)>>,
}

impl RecordingNotifier {
    pub async fn event_types(&self) -> Vec<EventType> {
        self.events.lock().await.iter().map(|(e, _)| e.event_type).collect()
    }

    pub async fn for_user(&self, user_id: Id) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|(_, user)| *user == Some(user_id))
            .map(|(e, _)| e.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, event: NotificationEvent) {
        self.events.lock().await.push((event, None));
    }

    async fn send_for_user(&self, event: NotificationEvent, user_id: Id) {
        self.events.lock().await.push((event, Some(user_id)));
    }
}

pub struct Fixture {
    pub repos: Repositories,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub ledger: Arc<InventoryLedger>,
    pub locks: KeyedLocks,
    pub architect: Id,
    pub plain_user: Id,
    pub project_id: Id,
    pub cement: Id,
    pub house: Id,
    pub lake: Id,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_cement(1000.0).await
    }

    pub async fn with_cement(cement_stock: f64) -> Self {
        let repos = Repositories::in_memory();
        let mut material_ids = Vec::new();
        for (code, name, stock) in [
            ("Ce", "Cement", cement_stock),
            ("Gr", "Gravel", 1500.0),
            ("Ar", "Sand", 2500.0),
        ] {
            let material = repos
                .materials
                .save(MaterialType::new(code, name, "kg", stock))
                .await
                .unwrap();
            material_ids.push(material.id.unwrap());
        }
        let (cement, gravel, sand) = (material_ids[0], material_ids[1], material_ids[2]);

        let house = repos
            .construction_types
            .save(
                ConstructionType::new("HOUSE", 3)
                    .with_line(cement, 100.0)
                    .with_line(gravel, 50.0)
                    .with_line(sand, 90.0),
            )
            .await
            .unwrap();
        let lake = repos
            .construction_types
            .save(
                ConstructionType::new("LAKE", 2)
                    .with_line(cement, 50.0)
                    .with_line(gravel, 60.0)
                    .with_line(sand, 80.0),
            )
            .await
            .unwrap();

        let architect = repos
            .users
            .save(User::new("arq1", "Architect One").with_role(ROLE_ARCHITECT))
            .await
            .unwrap();
        let plain_user = repos
            .users
            .save(User::new("user1", "Plain User").with_role(ROLE_USER))
            .await
            .unwrap();
        let project = repos
            .projects
            .save(Project::new("Ciudadela").with_created_by(architect.id.unwrap()))
            .await
            .unwrap();

        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()));
        let ledger = Arc::new(InventoryLedger::new(repos.materials.clone()));

        Self {
            clock,
            notifier: Arc::new(RecordingNotifier::default()),
            ledger,
            locks: KeyedLocks::new(),
            architect: architect.id.unwrap(),
            plain_user: plain_user.id.unwrap(),
            project_id: project.id.unwrap(),
            cement,
            house: house.id.unwrap(),
            lake: lake.id.unwrap(),
            repos,
        }
    }

    pub fn workflow(&self) -> OrderCreationWorkflow {
        OrderCreationWorkflow::new(
            self.repos.clone(),
            self.ledger.clone(),
            self.notifier.clone(),
            self.locks.clone(),
        )
    }

    /// Persist a PENDING request directly, skipping classification
    pub async fn pending_request(&self, type_id: Id, lat: f64, lng: f64, date: NaiveDate) -> Id {
        let request = ConstructionRequest::new(
            self.project_id,
            type_id,
            self.architect,
            Coordinates::new(lat, lng),
        )
        .with_request_date(date);
        self.repos.requests.save(request).await.unwrap().id.unwrap()
    }

    pub async fn request(&self, id: Id) -> ConstructionRequest {
        self.repos.requests.find_by_id(id).await.unwrap().unwrap()
    }

    pub async fn project(&self) -> Project {
        self.repos.projects.find_by_id(self.project_id).await.unwrap().unwrap()
    }

    pub async fn stock_levels(&self) -> Vec<f64> {
        self.repos
            .materials
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.stock)
            .collect()
    }
}
