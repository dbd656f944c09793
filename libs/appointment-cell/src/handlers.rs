use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::debug;

use schedule_cell::SchedulingState;
use shared_models::AppError;

use crate::models::BookAppointmentRequest;
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Booking request received for specialist {:?}", request.specialist_id);

    let booking_service = BookingService::new(state.store.clone());
    let confirmation = booking_service.book_appointment(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": confirmation.appointment,
            "patient": confirmation.patient,
        })),
    ))
}
