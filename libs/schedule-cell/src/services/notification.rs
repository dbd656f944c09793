// libs/schedule-cell/src/services/notification.rs
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::WorkSchedule;

use crate::models::{
    DispatchSummary, NewScheduleSummary, NotificationError, ScheduleChangeNotification,
    ScheduleConflict,
};

/// One payload per conflicting appointment, carrying the new schedule for
/// display in the outgoing message.
pub fn build_notifications(
    conflicts: &[ScheduleConflict],
    new_schedule: &WorkSchedule,
) -> Vec<ScheduleChangeNotification> {
    let summary = NewScheduleSummary::from(new_schedule);

    conflicts
        .iter()
        .map(|conflict| ScheduleChangeNotification {
            appointment_id: conflict.appointment_id,
            patient_email: conflict.patient_email.clone(),
            patient_name: conflict.patient_name.clone(),
            original_date: conflict.appointment_date,
            original_time: conflict.appointment_time,
            service_name: conflict.service_name.clone(),
            conflict_type: conflict.conflict_type,
            new_schedule: summary.clone(),
        })
        .collect()
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_one(&self, notification: &ScheduleChangeNotification) -> Result<(), NotificationError>;

    /// Sends every payload once, in order. A failed send is counted, never
    /// retried.
    async fn send_all(&self, notifications: &[ScheduleChangeNotification]) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for notification in notifications {
            match self.send_one(notification).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    warn!(
                        "Failed to notify {} about appointment {}: {}",
                        notification.patient_email, notification.appointment_id, e
                    );
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

/// Posts each payload as JSON to an external mailer webhook.
pub struct HttpNotificationSender {
    client: Client,
    webhook_url: String,
}

impl HttpNotificationSender {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config
            .is_notification_configured()
            .then(|| Self::new(config.notification_webhook_url.clone()))
    }
}

#[async_trait]
impl NotificationSender for HttpNotificationSender {
    async fn send_one(&self, notification: &ScheduleChangeNotification) -> Result<(), NotificationError> {
        debug!("Posting schedule change notice for appointment {}", notification.appointment_id);

        let response = self
            .client
            .post(&self.webhook_url)
            .header("Content-Type", "application/json")
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send_one(&self, notification: &ScheduleChangeNotification) -> Result<(), NotificationError> {
        info!(
            appointment_id = %notification.appointment_id,
            patient_email = %notification.patient_email,
            conflict_type = %notification.conflict_type,
            original_date = %notification.original_date,
            "Schedule change notice (log only)"
        );
        Ok(())
    }
}
