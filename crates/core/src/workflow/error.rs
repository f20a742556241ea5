//! Workflow error types for expense approval.

use thiserror::Error;

use crate::auth::Role;
use crate::workflow::types::ExpenseStatus;

/// Errors that can occur while advancing an approval flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The acting role is not the one the expense is waiting for.
    #[error("Role {acting} cannot act now; waiting for {required}")]
    PermissionDenied {
        /// Role of the caller.
        acting: Role,
        /// Role the expense is waiting for.
        required: Role,
    },

    /// The role may never act on approvals.
    #[error("Role {0} cannot approve expenses")]
    NotAnApprover(Role),

    /// The expense already reached a terminal status.
    #[error("Expense is already {0}")]
    AlreadyFinalized(ExpenseStatus),

    /// A role name in a flow definition was not recognized.
    #[error("Unknown role '{0}' in approval flow")]
    UnknownRole(String),

    /// Stored state does not describe a reachable position in the flow.
    #[error("Inconsistent approval state: {0}")]
    CorruptState(String),
}

impl WorkflowError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::PermissionDenied { .. } | Self::NotAnApprover(_) => 403,
            Self::AlreadyFinalized(_) => 409,
            Self::UnknownRole(_) => 400,
            Self::CorruptState(_) => 500,
        }
    }

    /// Stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } | Self::NotAnApprover(_) => "PERMISSION_DENIED",
            Self::AlreadyFinalized(_) => "ALREADY_FINALIZED",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
            Self::CorruptState(_) => "CORRUPT_STATE",
        }
    }
}
