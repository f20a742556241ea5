//! Approval state machine.
//!
//! Stateless: every function takes the current [`ApprovalState`] by
//! reference and returns a new one, so a caller that fails to persist the
//! result leaves nothing half-applied.

use chrono::Utc;

use crate::auth::{Identity, Role};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{
    ApprovalAction, ApprovalFlow, ApprovalState, Decision, ExpenseStatus, Transition,
};

/// Multi-level approval state machine.
pub struct ApprovalWorkflow;

impl ApprovalWorkflow {
    /// Initial state for a newly submitted expense.
    ///
    /// An empty flow is approved immediately.
    #[must_use]
    pub fn start(flow: ApprovalFlow) -> ApprovalState {
        match flow.get(0) {
            Some(first) => ApprovalState {
                flow,
                current_index: Some(0),
                status: ExpenseStatus::Pending(first),
            },
            None => ApprovalState {
                flow,
                current_index: None,
                status: ExpenseStatus::Approved,
            },
        }
    }

    /// Checks that `acting_role` may act on `state` right now.
    ///
    /// Returns the current level and the role it requires.
    ///
    /// # Errors
    ///
    /// * `AlreadyFinalized` if the state is terminal (checked first)
    /// * `PermissionDenied` if the role is not the one required
    /// * `CorruptState` if the index and status disagree
    pub fn authorize(
        state: &ApprovalState,
        acting_role: Role,
    ) -> Result<(usize, Role), WorkflowError> {
        if state.status.is_terminal() {
            return Err(WorkflowError::AlreadyFinalized(state.status));
        }

        let (level, required) = Self::current_level(state)?;
        if acting_role != required {
            return Err(WorkflowError::PermissionDenied {
                acting: acting_role,
                required,
            });
        }
        Ok((level, required))
    }

    /// Applies `decision` by `actor` to `state`.
    ///
    /// Approve moves to the next level or to `Approved` after the last one.
    /// Reject ends the flow immediately at whatever level it is. The comment
    /// is recorded on the audit entry only.
    pub fn advance(
        state: &ApprovalState,
        actor: &Identity,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<Transition, WorkflowError> {
        let (level, role) = Self::authorize(state, actor.role)?;

        let (current_index, status) = match decision {
            Decision::Reject => (None, ExpenseStatus::Rejected(role)),
            Decision::Approve => match state.flow.get(level + 1) {
                Some(next) => (Some(level + 1), ExpenseStatus::Pending(next)),
                None => (None, ExpenseStatus::Approved),
            },
        };

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Transition {
            state: ApprovalState {
                flow: state.flow.clone(),
                current_index,
                status,
            },
            action: ApprovalAction {
                level,
                role,
                actor_id: actor.user_id,
                actor_name: actor.username.clone(),
                decision,
                comment,
                acted_at: Utc::now(),
            },
        })
    }

    fn current_level(state: &ApprovalState) -> Result<(usize, Role), WorkflowError> {
        let level = state
            .current_index
            .ok_or_else(|| WorkflowError::CorruptState("pending without a level".to_string()))?;
        let role = state.flow.get(level).ok_or_else(|| {
            WorkflowError::CorruptState(format!(
                "level {level} outside a flow of {}",
                state.flow.len()
            ))
        })?;
        if state.status != ExpenseStatus::Pending(role) {
            return Err(WorkflowError::CorruptState(format!(
                "status {} does not match level {level} ({role})",
                state.status
            )));
        }
        Ok((level, role))
    }
}
