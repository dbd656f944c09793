use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::DbError;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION_CODE: &str = "23505";

#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, DbError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|e| DbError::Config(format!("invalid service key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))
                .map_err(|e| DbError::Config(format!("invalid service key: {}", e)))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(Self::classify_error(status, error_text));
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    fn classify_error(status: StatusCode, error_text: String) -> DbError {
        let parsed: Option<PostgrestError> = serde_json::from_str(&error_text).ok();

        match &parsed {
            Some(PostgrestError { code: Some(code), message }) if code == UNIQUE_VIOLATION_CODE => {
                warn!("Unique constraint violation reported by storage");
                return DbError::UniqueViolation(message.clone().unwrap_or(error_text));
            }
            // a bare 409 carries no code to tell it apart from a duplicate key
            Some(PostgrestError { code: None, .. }) | None if status == StatusCode::CONFLICT => {
                warn!("Conflict reported by storage without an error code");
                return DbError::UniqueViolation(error_text);
            }
            _ => {}
        }

        error!("API error ({}): {}", status, error_text);
        match status.as_u16() {
            401 | 403 => DbError::Auth(error_text),
            404 => DbError::NotFound(error_text),
            code => DbError::Api { status: code, message: error_text },
        }
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
