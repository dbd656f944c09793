use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Machine-readable rejection kind carried by every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidTimeFormat,
    InvalidRequest,
    EntityNotFound,
    EntityInactive,
    ClosureConflict,
    SlotUnavailable,
    UniqueConstraintViolation,
    ScheduleConflict,
    Database,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidTimeFormat => "invalid_time_format",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::EntityNotFound => "entity_not_found",
            ErrorKind::EntityInactive => "entity_inactive",
            ErrorKind::ClosureConflict => "closure_conflict",
            ErrorKind::SlotUnavailable => "slot_unavailable",
            ErrorKind::UniqueConstraintViolation => "unique_constraint_violation",
            ErrorKind::ScheduleConflict => "schedule_conflict",
            ErrorKind::Database => "database",
            ErrorKind::Internal => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidTimeFormat | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::EntityNotFound => StatusCode::NOT_FOUND,
            ErrorKind::EntityInactive => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ClosureConflict
            | ErrorKind::SlotUnavailable
            | ErrorKind::UniqueConstraintViolation
            | ErrorKind::ScheduleConflict => StatusCode::CONFLICT,
            ErrorKind::Database | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A domain rejection; the kind decides the status code.
    #[error("{message}")]
    Rejected {
        kind: ErrorKind,
        message: String,
        details: Option<serde_json::Value>,
    },
}

impl AppError {
    pub fn rejected(kind: ErrorKind, message: impl Into<String>) -> Self {
        AppError::Rejected {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::EntityNotFound,
            AppError::BadRequest(_) => ErrorKind::InvalidRequest,
            AppError::Internal(_) => ErrorKind::Internal,
            AppError::Database(_) => ErrorKind::Database,
            AppError::Rejected { kind, .. } => *kind,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status();
        let (message, details) = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg)
            | AppError::Database(msg) => (msg, None),
            AppError::Rejected { message, details, .. } => (message, details),
        };

        if status.is_server_error() {
            tracing::error!("Error: {} ({}): {}", status, kind, message);
        } else {
            tracing::warn!("Rejected: {} ({}): {}", status, kind, message);
        }

        let mut body = json!({
            "error": message,
            "kind": kind,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_snake_case() {
        let value = serde_json::to_value(ErrorKind::SlotUnavailable).unwrap();
        assert_eq!(value, "slot_unavailable");
        assert_eq!(ErrorKind::ClosureConflict.to_string(), "closure_conflict");
    }

    #[test]
    fn rejected_status_follows_kind() {
        let response = AppError::rejected(ErrorKind::SlotUnavailable, "taken").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::rejected(ErrorKind::EntityInactive, "inactive").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = AppError::BadRequest("missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
