use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::SchedulingState;

pub fn schedule_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/availability/{specialist_id}", get(handlers::get_availability))
        .route("/schedules/validate-change", post(handlers::validate_schedule_change))
        .route("/schedules/apply-change", post(handlers::apply_schedule_change))
        .with_state(state)
}
