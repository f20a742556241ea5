//! Expense error types.

use spendflow_shared::types::ExpenseId;
use thiserror::Error;

use super::repository::RepositoryError;
use super::validation::ValidationError;
use crate::currency::CurrencyError;
use crate::workflow::WorkflowError;

/// Errors surfaced by [`ExpenseService`](super::ExpenseService).
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Input rejected before any state change.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Conversion failed and no fallback applied.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Approval transition refused.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// No such expense.
    #[error("Expense {0} not found")]
    NotFound(ExpenseId),

    /// The caller may not see or list this.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Lost a race with another approver.
    #[error("Expense {0} was modified concurrently; reload and retry")]
    Conflict(ExpenseId),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Repository(String),
}

impl ExpenseError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Currency(e) => e.status_code(),
            Self::Workflow(e) => e.status_code(),
            Self::NotFound(_) => 404,
            Self::Forbidden(_) => 403,
            Self::Conflict(_) => 409,
            Self::Repository(_) => 500,
        }
    }

    /// Stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Currency(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Repository(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<RepositoryError> for ExpenseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::NotFound(id),
            RepositoryError::VersionConflict { id, .. } | RepositoryError::Duplicate(id) => {
                Self::Conflict(id)
            }
            RepositoryError::Database(msg) => Self::Repository(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::workflow::ExpenseStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_codes() {
        let id = ExpenseId::new();
        assert_eq!(
            ExpenseError::from(ValidationError::NonPositiveAmount(dec!(0))).status_code(),
            400
        );
        assert_eq!(
            ExpenseError::from(WorkflowError::AlreadyFinalized(ExpenseStatus::Approved))
                .status_code(),
            409
        );
        assert_eq!(
            ExpenseError::from(WorkflowError::PermissionDenied {
                acting: Role::Finance,
                required: Role::Manager
            })
            .error_code(),
            "PERMISSION_DENIED"
        );
        assert_eq!(ExpenseError::NotFound(id).status_code(), 404);
        assert_eq!(
            ExpenseError::from(RepositoryError::VersionConflict { id, expected: 3 }).status_code(),
            409
        );
    }
}
