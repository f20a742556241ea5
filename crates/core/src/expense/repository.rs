//! Expense persistence seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spendflow_shared::types::{ExpenseId, UserId};
use thiserror::Error;

use super::model::Expense;
use crate::auth::Role;
use crate::workflow::{ApprovalAction, ApprovalState};

/// A status change to apply atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// New approval position.
    pub approval: ApprovalState,
    /// Audit entry appended to the history.
    pub action: ApprovalAction,
    /// Time of the change.
    pub updated_at: DateTime<Utc>,
}

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No such expense.
    #[error("Expense {0} not found")]
    NotFound(ExpenseId),

    /// The stored version moved since it was read.
    #[error("Expense {id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        /// Expense ID.
        id: ExpenseId,
        /// Version the caller read.
        expected: i64,
    },

    /// An expense with this ID already exists.
    #[error("Expense {0} already exists")]
    Duplicate(ExpenseId),

    /// Backend failure.
    #[error("Database error: {0}")]
    Database(String),
}

/// Persistence for expenses.
///
/// Lists are ordered newest first.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Inserts a new expense.
    async fn create(&self, expense: Expense) -> Result<Expense, RepositoryError>;

    /// Loads an expense.
    async fn find_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, RepositoryError>;

    /// Pending expenses currently waiting for `role`.
    async fn list_by_approver(&self, role: Role) -> Result<Vec<Expense>, RepositoryError>;

    /// Expenses submitted by `user`.
    async fn list_by_submitter(&self, user: UserId) -> Result<Vec<Expense>, RepositoryError>;

    /// Every expense.
    async fn list_all(&self) -> Result<Vec<Expense>, RepositoryError>;

    /// Applies `update` only if the stored version is still `expected_version`.
    ///
    /// On success the history gains `update.action` and the version is
    /// incremented. Otherwise nothing changes and `VersionConflict` is
    /// returned.
    async fn update_status(
        &self,
        id: ExpenseId,
        expected_version: i64,
        update: StatusUpdate,
    ) -> Result<Expense, RepositoryError>;
}
