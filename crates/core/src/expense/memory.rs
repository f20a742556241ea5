//! In-memory expense repository for development and testing.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use spendflow_shared::types::{ExpenseId, UserId};

use super::model::Expense;
use super::repository::{ExpenseRepository, RepositoryError, StatusUpdate};
use crate::auth::Role;
use crate::workflow::ExpenseStatus;

/// In-memory [`ExpenseRepository`].
///
/// `update_status` holds the entry's shard lock across the version check
/// and the write, so concurrent updates of one expense are serialized.
#[derive(Debug, Default)]
pub struct InMemoryExpenseRepository {
    expenses: DashMap<ExpenseId, Expense>,
}

impl InMemoryExpenseRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored expenses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    fn collect(&self, keep: impl Fn(&Expense) -> bool) -> Vec<Expense> {
        let mut found: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        // Newest first
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
        found
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn create(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        match self.expenses.entry(expense.id) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(expense.id)),
            Entry::Vacant(slot) => {
                slot.insert(expense.clone());
                Ok(expense)
            }
        }
    }

    async fn find_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, RepositoryError> {
        Ok(self.expenses.get(&id).map(|e| e.clone()))
    }

    async fn list_by_approver(&self, role: Role) -> Result<Vec<Expense>, RepositoryError> {
        Ok(self.collect(|e| e.approval.status == ExpenseStatus::Pending(role)))
    }

    async fn list_by_submitter(&self, user: UserId) -> Result<Vec<Expense>, RepositoryError> {
        Ok(self.collect(|e| e.submitter_id == user))
    }

    async fn list_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        Ok(self.collect(|_| true))
    }

    async fn update_status(
        &self,
        id: ExpenseId,
        expected_version: i64,
        update: StatusUpdate,
    ) -> Result<Expense, RepositoryError> {
        let mut entry = self
            .expenses
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;

        if entry.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                id,
                expected: expected_version,
            });
        }

        entry.approval = update.approval;
        entry.history.push(update.action);
        entry.version += 1;
        entry.updated_at = update.updated_at;
        Ok(entry.clone())
    }
}
