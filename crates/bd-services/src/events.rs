//! Notification payloads for lifecycle events

use bd_models::{ConstructionOrder, ConstructionRequest, Project};
use bd_notifications::{EventType, NotificationEvent};
use serde_json::json;

pub fn request_event(event_type: EventType, request: &ConstructionRequest) -> NotificationEvent {
    NotificationEvent::new(
        event_type,
        json!({
            "requestId": request.id,
            "projectId": request.project_id,
            "constructionTypeId": request.construction_type_id,
            "latitude": request.latitude,
            "longitude": request.longitude,
            "status": request.status,
            "observations": request.observations,
        }),
    )
}

pub fn order_event(
    event_type: EventType,
    order: &ConstructionOrder,
    type_name: &str,
) -> NotificationEvent {
    NotificationEvent::new(
        event_type,
        json!({
            "orderId": order.id,
            "requestId": order.request_id,
            "projectId": order.project_id,
            "constructionType": type_name,
            "scheduledStartDate": order.scheduled_start_date,
            "scheduledEndDate": order.scheduled_end_date,
            "latitude": order.latitude,
            "longitude": order.longitude,
            "status": order.status,
        }),
    )
}

pub fn order_failed_event(request: &ConstructionRequest, detail: &str) -> NotificationEvent {
    NotificationEvent::new(
        EventType::OrderCreationFailed,
        json!({
            "requestId": request.id,
            "projectId": request.project_id,
            "error": detail,
        }),
    )
}

pub fn request_failed_event(request: &ConstructionRequest, detail: &str) -> NotificationEvent {
    NotificationEvent::new(
        EventType::RequestFailed,
        json!({
            "requestId": request.id,
            "detail": detail,
        }),
    )
}

pub fn project_event(event_type: EventType, project: &Project) -> NotificationEvent {
    NotificationEvent::new(
        event_type,
        json!({
            "projectId": project.id,
            "name": project.name,
            "startDate": project.start_date,
            "endDate": project.end_date,
            "progressPercentage": project.progress_percentage,
            "status": project.status,
        }),
    )
}
