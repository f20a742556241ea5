//! Expense submission, approval and listing.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use spendflow_shared::types::{ExpenseId, UserId, round_money};
use tracing::{info, warn};

use super::error::ExpenseError;
use super::model::{Expense, NewExpense};
use super::repository::{ExpenseRepository, RepositoryError, StatusUpdate};
use super::validation::validate;
use crate::auth::{Identity, Role};
use crate::currency::CurrencyConverter;
use crate::workflow::{ApprovalFlow, ApprovalWorkflow, Decision, WorkflowError};

/// Which expenses a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Expenses the viewer submitted.
    Mine,
    /// Expenses waiting for the viewer's role.
    Queue,
    /// Everything. Admin only.
    All,
}

impl Scope {
    /// Listing used when the caller does not ask for one.
    #[must_use]
    pub const fn default_for(role: Role) -> Self {
        match role {
            Role::Employee => Self::Mine,
            Role::Manager | Role::Finance | Role::Director => Self::Queue,
            Role::Admin => Self::All,
        }
    }
}

/// Wires validation, conversion, the approval workflow and persistence.
pub struct ExpenseService {
    repository: Arc<dyn ExpenseRepository>,
    converter: Arc<CurrencyConverter>,
    flow: ApprovalFlow,
}

impl ExpenseService {
    /// Creates the service. `flow` is copied onto every new expense.
    pub fn new(
        repository: Arc<dyn ExpenseRepository>,
        converter: Arc<CurrencyConverter>,
        flow: ApprovalFlow,
    ) -> Self {
        Self {
            repository,
            converter,
            flow,
        }
    }

    /// Flow applied to new submissions.
    pub const fn flow(&self) -> &ApprovalFlow {
        &self.flow
    }

    /// Validates, normalizes and stores a new expense.
    pub async fn submit(
        &self,
        submitter: &Identity,
        input: NewExpense,
    ) -> Result<Expense, ExpenseError> {
        let now = Utc::now();
        let valid = validate(&input, now.date_naive())?;

        let conversion = self.converter.to_base(valid.amount, &valid.currency).await?;
        if conversion.degraded {
            warn!(
                submitter = %submitter.user_id,
                currency = %valid.currency,
                "Expense stored with identity rate"
            );
        }

        let expense = Expense {
            id: ExpenseId::new(),
            submitter_id: submitter.user_id,
            submitter_name: submitter.username.clone(),
            category: valid.category,
            description: valid.description,
            amount: round_money(valid.amount),
            currency: valid.currency,
            base_amount: conversion.converted.amount,
            base_currency: conversion.converted.currency,
            conversion_rate: conversion.rate,
            rate_degraded: conversion.degraded,
            expense_date: valid.expense_date,
            approval: ApprovalWorkflow::start(self.flow.clone()),
            history: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.create(expense).await?;
        info!(
            expense_id = %stored.id,
            submitter = %stored.submitter_id,
            amount = %stored.original(),
            normalized = %stored.normalized(),
            status = %stored.status(),
            "Expense submitted"
        );
        Ok(stored)
    }

    /// Applies an approver's decision.
    ///
    /// # Errors
    ///
    /// * `Workflow(NotAnApprover | PermissionDenied)` if the actor may not act now
    /// * `Workflow(AlreadyFinalized)` if the expense is terminal, including
    ///   when another approver finalized it first
    /// * `Conflict` if another approver moved it to a different level first
    pub async fn decide(
        &self,
        id: ExpenseId,
        actor: &Identity,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<Expense, ExpenseError> {
        if !actor.role.can_approve() {
            return Err(WorkflowError::NotAnApprover(actor.role).into());
        }

        let expense = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        let transition = ApprovalWorkflow::advance(&expense.approval, actor, decision, comment)?;
        let update = StatusUpdate {
            approval: transition.state,
            action: transition.action,
            updated_at: Utc::now(),
        };

        match self.repository.update_status(id, expense.version, update).await {
            Ok(updated) => {
                info!(
                    expense_id = %id,
                    actor = %actor.user_id,
                    role = %actor.role,
                    %decision,
                    status = %updated.status(),
                    "Approval decision recorded"
                );
                Ok(updated)
            }
            Err(RepositoryError::VersionConflict { .. }) => {
                warn!(expense_id = %id, actor = %actor.user_id, "Lost approval race");
                let current = self
                    .repository
                    .find_by_id(id)
                    .await?
                    .ok_or(ExpenseError::NotFound(id))?;
                if current.approval.is_terminal() {
                    Err(WorkflowError::AlreadyFinalized(current.status()).into())
                } else {
                    Err(ExpenseError::Conflict(id))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Loads one expense. Employees only see their own.
    pub async fn get(&self, id: ExpenseId, viewer: &Identity) -> Result<Expense, ExpenseError> {
        let expense = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        if viewer.role == Role::Employee && expense.submitter_id != viewer.user_id {
            return Err(ExpenseError::Forbidden(
                "employees can only view their own expenses".to_string(),
            ));
        }
        Ok(expense)
    }

    /// Lists expenses visible to `viewer`.
    ///
    /// Without an explicit scope: employees get their own, approvers get
    /// their queue, admins get everything.
    pub async fn list_for(
        &self,
        viewer: &Identity,
        scope: Option<Scope>,
    ) -> Result<Vec<Expense>, ExpenseError> {
        match scope.unwrap_or(Scope::default_for(viewer.role)) {
            Scope::Mine => self.list_by_submitter(viewer.user_id).await,
            Scope::Queue if viewer.role.can_approve() => {
                self.list_pending_for_role(viewer.role).await
            }
            Scope::Queue => Err(ExpenseError::Forbidden(
                "only approvers have a queue".to_string(),
            )),
            Scope::All if viewer.role.is_admin() => Ok(self.repository.list_all().await?),
            Scope::All => Err(ExpenseError::Forbidden(
                "only admins can list all expenses".to_string(),
            )),
        }
    }

    /// Pending expenses waiting for `role`.
    pub async fn list_pending_for_role(&self, role: Role) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.repository.list_by_approver(role).await?)
    }

    /// Expenses submitted by `user`.
    pub async fn list_by_submitter(&self, user: UserId) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.repository.list_by_submitter(user).await?)
    }
}
