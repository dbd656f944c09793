pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

use std::sync::Arc;

use tracing::info;

use shared_config::AppConfig;
use shared_database::{InMemoryStore, SchedulingStore, SupabaseStore};

pub use models::*;
pub use router::schedule_routes;
pub use services::*;

/// Collaborators shared by every scheduling request.
#[derive(Clone)]
pub struct SchedulingState {
    pub store: Arc<dyn SchedulingStore>,
    pub notifier: Arc<dyn NotificationSender>,
}

impl SchedulingState {
    pub fn new(store: Arc<dyn SchedulingStore>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { store, notifier }
    }

    /// Supabase when configured, otherwise a process-local store; webhook
    /// notifications when configured, otherwise log-only.
    pub fn from_config(config: &AppConfig) -> Self {
        let store: Arc<dyn SchedulingStore> = if config.is_configured() {
            info!("Using Supabase store at {}", config.supabase_url);
            Arc::new(SupabaseStore::new(config))
        } else {
            Arc::new(InMemoryStore::new())
        };

        let notifier: Arc<dyn NotificationSender> = match HttpNotificationSender::from_config(config) {
            Some(sender) => Arc::new(sender),
            None => Arc::new(LogNotificationSender),
        };

        Self { store, notifier }
    }

    pub fn availability(&self) -> AvailabilityService {
        AvailabilityService::new(self.store.clone())
    }

    pub fn schedule_changes(&self) -> ScheduleChangeService {
        ScheduleChangeService::new(self.store.clone(), self.notifier.clone())
    }
}
