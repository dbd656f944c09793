use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::appointment_routes;
use schedule_cell::{schedule_routes, SchedulingState};

pub fn create_router(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking API is running!" }))
        .merge(schedule_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use schedule_cell::LogNotificationSender;
    use serde_json::{json, Value};
    use shared_database::fixtures::seeded_store;
    use tower::ServiceExt;

    #[tokio::test]
    async fn availability_and_booking_share_one_store() {
        let (store, specialist, service) = seeded_store(1).await;
        let state = SchedulingState::new(Arc::new(store), Arc::new(LogNotificationSender));
        let app = create_router(Arc::new(state));

        let booking = json!({
            "specialist_id": specialist.id,
            "service_id": service.id,
            "appointment_date": "2099-06-01",
            "appointment_time": "09:00",
            "patient_info": { "name": "Ana Torres", "email": "ana@example.com" }
        });
        let created = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/appointments")
                    .header("content-type", "application/json")
                    .body(Body::from(booking.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!(
                        "/availability/{}?date=2099-06-01&service_id={}",
                        specialist.id, service.id
                    ))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["available_times"][0], "09:45");
    }
}
