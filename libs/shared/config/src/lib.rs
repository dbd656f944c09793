use std::env;
use tracing::warn;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_SERVICE_DURATION_MINUTES: u32 = 45;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub notification_webhook_url: String,
    pub bind_address: String,
    /// Used for stored appointment rows that carry no duration of their own.
    pub default_service_duration_minutes: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            notification_webhook_url: String::new(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            default_service_duration_minutes: DEFAULT_SERVICE_DURATION_MINUTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL")
                .unwrap_or_else(|_| {
                    warn!("NOTIFICATION_WEBHOOK_URL not set, notifications will only be logged");
                    String::new()
                }),
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            default_service_duration_minutes: env::var("DEFAULT_SERVICE_DURATION_MINUTES")
                .ok()
                .and_then(|value| match value.parse::<u32>() {
                    Ok(minutes) if minutes > 0 => Some(minutes),
                    _ => {
                        warn!("Ignoring invalid DEFAULT_SERVICE_DURATION_MINUTES: {}", value);
                        None
                    }
                })
                .unwrap_or(DEFAULT_SERVICE_DURATION_MINUTES),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - falling back to the in-memory store");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_notification_configured(&self) -> bool {
        !self.notification_webhook_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_not_configured() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert!(!config.is_notification_configured());
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.default_service_duration_minutes, 45);
    }

    #[test]
    fn configured_requires_url_and_key() {
        let config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            ..AppConfig::default()
        };
        assert!(!config.is_configured());

        let config = AppConfig {
            supabase_service_key: "service-key".to_string(),
            ..config
        };
        assert!(config.is_configured());
    }
}
