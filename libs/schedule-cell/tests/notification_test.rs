use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::{
    build_notifications, ConflictType, DispatchSummary, HttpNotificationSender, NotificationSender,
    ScheduleConflict,
};
use shared_config::AppConfig;
use shared_database::fixtures::{date, standard_schedule, time};

fn conflict(email: &str) -> ScheduleConflict {
    ScheduleConflict {
        appointment_id: Uuid::new_v4(),
        patient_name: "Carla Méndez".to_string(),
        patient_email: email.to_string(),
        appointment_date: date(2025, 6, 9),
        appointment_time: time(9, 30),
        service_name: "Limpieza facial".to_string(),
        conflict_type: ConflictType::OutsideHours,
    }
}

#[tokio::test]
async fn test_webhook_receives_each_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "patient_email": "carla@example.com",
            "original_time": "09:30",
            "conflict_type": "outside_hours",
            "new_schedule": { "start_time": "09:00", "end_time": "18:00" }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sender = HttpNotificationSender::new(format!("{}/notify", mock_server.uri()));
    let schedule = standard_schedule(Uuid::new_v4(), 1);
    let notifications = build_notifications(&[conflict("carla@example.com")], &schedule);

    let summary = sender.send_all(&notifications).await;
    assert_eq!(summary, DispatchSummary { succeeded: 1, failed: 0 });
}

#[tokio::test]
async fn test_non_success_status_counts_as_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .and(body_partial_json(serde_json::json!({ "patient_email": "bounce@example.com" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("mailer down"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let sender = HttpNotificationSender::new(format!("{}/notify", mock_server.uri()));
    let schedule = standard_schedule(Uuid::new_v4(), 1);
    let notifications = build_notifications(
        &[
            conflict("ok@example.com"),
            conflict("bounce@example.com"),
            conflict("also-ok@example.com"),
        ],
        &schedule,
    );

    let summary = sender.send_all(&notifications).await;
    assert_eq!(summary, DispatchSummary { succeeded: 2, failed: 1 });
}

#[tokio::test]
async fn test_unreachable_webhook_counts_as_failed() {
    // Nothing listens on the discard port
    let sender = HttpNotificationSender::new("http://127.0.0.1:9/notify");
    let schedule = standard_schedule(Uuid::new_v4(), 1);
    let notifications = build_notifications(&[conflict("carla@example.com")], &schedule);

    let summary = sender.send_all(&notifications).await;
    assert_eq!(summary, DispatchSummary { succeeded: 0, failed: 1 });
}

#[test]
fn test_sender_only_built_when_webhook_configured() {
    let mut config = AppConfig::default();
    assert!(HttpNotificationSender::from_config(&config).is_none());

    config.notification_webhook_url = "https://mailer.internal/notify".to_string();
    assert!(HttpNotificationSender::from_config(&config).is_some());
}
