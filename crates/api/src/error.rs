//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use spendflow_core::auth::AuthError;
use spendflow_core::currency::CurrencyError;
use spendflow_core::expense::ExpenseError;
use spendflow_shared::AppError;
use tracing::error;

/// An error rendered as `{ "error": code, "message": text }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Creates an error response.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            // Storage and crypto details stay in the logs.
            error!(code, %message, "Request failed");
            return Self::new(status, code, "An internal error occurred");
        }
        Self::new(status, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.code, "message": self.message })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<CurrencyError> for ApiError {
    fn from(err: CurrencyError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendflow_core::auth::Role;
    use spendflow_core::workflow::{ExpenseStatus, WorkflowError};
    use spendflow_shared::types::ExpenseId;

    #[test]
    fn test_workflow_errors_keep_their_status() {
        let err: ApiError = ExpenseError::Workflow(WorkflowError::AlreadyFinalized(
            ExpenseStatus::Approved,
        ))
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "ALREADY_FINALIZED");

        let err: ApiError = ExpenseError::Workflow(WorkflowError::PermissionDenied {
            acting: Role::Finance,
            required: Role::Manager,
        })
        .into();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, "PERMISSION_DENIED");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err: ApiError = ExpenseError::Repository("connection reset by peer".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("connection reset"));
    }

    #[test]
    fn test_gateway_errors_keep_message() {
        let err: ApiError = CurrencyError::Fetch("timed out".into()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.message.contains("timed out"));
    }

    #[test]
    fn test_app_errors_map_directly() {
        let err: ApiError = AppError::Forbidden("admins only".into()).into();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, "FORBIDDEN");
        assert_eq!(err.message, "Access denied: admins only");

        let err: ApiError = AppError::Config("bad expiry".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "CONFIG_ERROR");
        assert!(!err.message.contains("bad expiry"));
    }

    #[test]
    fn test_not_found_message() {
        let id = ExpenseId::new();
        let err: ApiError = ExpenseError::NotFound(id).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, format!("Expense {id} not found"));
    }
}
