// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use schedule_cell::SchedulingState;

use crate::handlers;

/// Public booking routes; authorization is enforced in front of this router.
pub fn appointment_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .with_state(state)
}
