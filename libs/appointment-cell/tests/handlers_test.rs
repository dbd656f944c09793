use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::appointment_routes;
use schedule_cell::{LogNotificationSender, SchedulingState};
use shared_database::fixtures::{closure, date, seeded_store, service};
use shared_database::InMemoryStore;
use shared_models::{Service, Specialist};

async fn app() -> (Router, Arc<InMemoryStore>, Specialist, Service) {
    let (store, specialist, facial) = seeded_store(1).await;
    let store = Arc::new(store);
    let state = SchedulingState::new(store.clone(), Arc::new(LogNotificationSender));
    (appointment_routes(Arc::new(state)), store, specialist, facial)
}

fn booking_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn payload(specialist: &Specialist, service: &Service, at: &str) -> Value {
    json!({
        "specialist_id": specialist.id,
        "service_id": service.id,
        "appointment_date": "2025-06-02",
        "appointment_time": at,
        "patient_info": {
            "name": "Ana Torres",
            "email": "ana@example.com",
            "phone": "555-0101"
        }
    })
}

#[tokio::test]
async fn test_book_appointment_created() {
    let (app, store, specialist, facial) = app().await;

    let response = app
        .oneshot(booking_request(payload(&specialist, &facial, "09:00")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["appointment"]["appointment_time"], "09:00");
    assert_eq!(json["appointment"]["duration"], 45);
    assert_eq!(json["appointment"]["status"], "scheduled");
    assert_eq!(json["patient"]["email"], "ana@example.com");
    assert_eq!(store.appointments().await.len(), 1);
}

#[tokio::test]
async fn test_double_booking_is_conflict_with_retry_hint() {
    let (app, _, specialist, facial) = app().await;

    let first = app
        .clone()
        .oneshot(booking_request(payload(&specialist, &facial, "09:00")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(booking_request(payload(&specialist, &facial, "09:30")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let json = body_json(second).await;
    assert_eq!(json["kind"], "slot_unavailable");
    assert!(json["error"].as_str().unwrap().contains("different time"));
}

#[tokio::test]
async fn test_missing_patient_email_is_bad_request() {
    let (app, store, specialist, facial) = app().await;
    let mut body = payload(&specialist, &facial, "09:00");
    body["patient_info"]["email"] = Value::Null;

    let response = app.oneshot(booking_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "invalid_request");
    assert!(store.patients().await.is_empty());
}

#[tokio::test]
async fn test_malformed_time_is_bad_request() {
    let (app, _, specialist, facial) = app().await;

    let response = app
        .oneshot(booking_request(payload(&specialist, &facial, "9 o'clock")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "invalid_time_format");
}

#[tokio::test]
async fn test_closed_date_is_conflict_with_reason() {
    let (app, store, specialist, facial) = app().await;
    store
        .add_closure(closure(specialist.id, date(2025, 6, 2), date(2025, 6, 2), "Capacitación"))
        .await;

    let response = app
        .oneshot(booking_request(payload(&specialist, &facial, "09:00")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "closure_conflict");
    assert_eq!(json["details"]["reason"], "Capacitación");
}

#[tokio::test]
async fn test_unknown_service_is_not_found() {
    let (app, _, specialist, _) = app().await;
    let unseeded = service("Desconocido", 30);

    let response = app
        .oneshot(booking_request(payload(&specialist, &unseeded, "10:00")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["kind"], "entity_not_found");
}
