use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::AppError;
use shared_utils::time::local_today;

use crate::models::{AvailabilityQuery, ScheduleChangeRequest};
use crate::SchedulingState;

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<SchedulingState>>,
    Path(specialist_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let date = query
        .date
        .ok_or_else(|| AppError::BadRequest("date query parameter is required".to_string()))?;
    let service_id = query
        .service_id
        .ok_or_else(|| AppError::BadRequest("service_id query parameter is required".to_string()))?;

    let response = state
        .availability()
        .available_times(specialist_id, service_id, date)
        .await?;

    Ok(Json(json!(response)))
}

// ==============================================================================
// SCHEDULE CHANGES (ADMIN)
// ==============================================================================

#[axum::debug_handler]
pub async fn validate_schedule_change(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ScheduleChangeRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Validating schedule change: {:?}", request);

    let report = state
        .schedule_changes()
        .validate_change(&request, local_today())
        .await?;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn apply_schedule_change(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ScheduleChangeRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Applying schedule change: {:?}", request);

    let outcome = state
        .schedule_changes()
        .apply_change(&request, local_today())
        .await?;

    Ok(Json(json!({
        "success": true,
        "schedule": outcome.schedule,
        "validation": outcome.validation,
        "notifications_sent": outcome.notifications_sent,
        "notifications_failed": outcome.notifications_failed,
    })))
}
