use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockwatch_alerts::AlertError;
use stockwatch_core::DomainError;
use stockwatch_infra::{ProvisionError, StoreError};

pub fn provision_error_to_response(err: ProvisionError) -> axum::response::Response {
    match err {
        ProvisionError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ProvisionError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ProvisionError::Persistence(ref source) => {
            tracing::error!(error = %source, "provisioning failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", err.to_string())
        }
    }
}

pub fn alert_error_to_response(err: AlertError) -> axum::response::Response {
    let detail = match &err {
        AlertError::Source { source, .. } => format!("{err}: {source}"),
        AlertError::DanglingReference { .. } => err.to_string(),
    };
    tracing::error!(error = %detail, "low-stock evaluation failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "alert_evaluation_failed",
        "low-stock evaluation failed",
    )
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
    }
}

/// Seeding endpoints only; provisioning goes through [`provision_error_to_response`].
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::UniqueViolation(_) => json_error(StatusCode::CONFLICT, "conflict", "already exists"),
        StoreError::ForeignKey(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        other => {
            tracing::error!(error = %other, "store operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal storage error")
        }
    }
}

/// Malformed JSON is a client error (400), not axum's default 422.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
