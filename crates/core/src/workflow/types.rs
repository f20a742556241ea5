//! Workflow domain types for expense approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spendflow_shared::types::UserId;
use std::fmt;

use crate::auth::Role;
use crate::workflow::error::WorkflowError;

/// Ordered roles that must approve an expense, one after another.
///
/// A copy is taken when the expense is submitted; later configuration
/// changes never reach existing expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalFlow(Vec<Role>);

impl ApprovalFlow {
    /// Creates a flow.
    ///
    /// # Errors
    ///
    /// Returns `NotAnApprover` if a role that cannot approve is listed.
    pub fn new(roles: Vec<Role>) -> Result<Self, WorkflowError> {
        if let Some(role) = roles.iter().find(|r| !r.can_approve()) {
            return Err(WorkflowError::NotAnApprover(*role));
        }
        Ok(Self(roles))
    }

    /// Parses a flow from role names, e.g. from configuration.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, WorkflowError> {
        let roles = names
            .iter()
            .map(|name| {
                Role::parse(name.as_ref())
                    .map_err(|_| WorkflowError::UnknownRole(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(roles)
    }

    /// Roles in approval order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.0
    }

    /// Role at `level`, if any.
    #[must_use]
    pub fn get(&self, level: usize) -> Option<Role> {
        self.0.get(level).copied()
    }

    /// Number of approval levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a flow with no approvers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Disposition of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "role", rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Waiting for the given role.
    Pending(Role),
    /// Every level approved.
    Approved,
    /// Rejected by the given role.
    Rejected(Role),
}

impl ExpenseStatus {
    /// Status name without the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending(_) => "pending",
            Self::Approved => "approved",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Role attached to the status, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Pending(role) | Self::Rejected(role) => Some(*role),
            Self::Approved => None,
        }
    }

    /// Returns true once no further action is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected(_))
    }

    /// Rebuilds a status from its stored name and role.
    pub fn from_parts(status: &str, role: Option<&str>) -> Result<Self, WorkflowError> {
        let role = role
            .map(|r| Role::parse(r).map_err(|_| WorkflowError::UnknownRole(r.to_string())))
            .transpose()?;
        match (status, role) {
            ("pending", Some(role)) => Ok(Self::Pending(role)),
            ("approved", None) => Ok(Self::Approved),
            ("rejected", Some(role)) => Ok(Self::Rejected(role)),
            _ => Err(WorkflowError::CorruptState(format!(
                "status '{status}' with role {role:?}"
            ))),
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(role) => write!(f, "pending ({role})"),
            Self::Approved => f.write_str("approved"),
            Self::Rejected(role) => write!(f, "rejected ({role})"),
        }
    }
}

/// An approver's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Move to the next level, or finish.
    Approve,
    /// Stop the flow.
    Reject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("approve"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Position of an expense in its approval flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalState {
    /// Flow snapshot.
    #[serde(rename = "approval_flow")]
    pub flow: ApprovalFlow,
    /// Level waiting for action; `None` once terminal.
    #[serde(rename = "current_approver_index")]
    pub current_index: Option<usize>,
    /// Disposition.
    pub status: ExpenseStatus,
}

impl ApprovalState {
    /// Role currently expected to act.
    #[must_use]
    pub fn current_approver(&self) -> Option<Role> {
        match self.status {
            ExpenseStatus::Pending(role) => Some(role),
            _ => None,
        }
    }

    /// Returns true once no further action is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One entry of an expense's approval history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalAction {
    /// Flow level the action was taken at.
    pub level: usize,
    /// Role that acted.
    pub role: Role,
    /// User that acted.
    pub actor_id: UserId,
    /// Username that acted.
    pub actor_name: String,
    /// Decision taken.
    pub decision: Decision,
    /// Free-text note; never affects the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// When it happened.
    pub acted_at: DateTime<Utc>,
}

/// Result of a successful [`advance`](crate::workflow::ApprovalWorkflow::advance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// New state.
    pub state: ApprovalState,
    /// Audit record to append.
    pub action: ApprovalAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_from_names() {
        let flow = ApprovalFlow::from_names(&["manager", "Finance", "director"]).unwrap();
        assert_eq!(
            flow.roles(),
            &[Role::Manager, Role::Finance, Role::Director]
        );
        assert_eq!(flow.get(1), Some(Role::Finance));
        assert_eq!(flow.get(3), None);
    }

    #[test]
    fn test_flow_rejects_unknown_and_employee() {
        assert!(matches!(
            ApprovalFlow::from_names(&["manager", "ceo"]),
            Err(WorkflowError::UnknownRole(name)) if name == "ceo"
        ));
        assert!(matches!(
            ApprovalFlow::from_names(&["employee"]),
            Err(WorkflowError::NotAnApprover(Role::Employee))
        ));
    }

    #[test]
    fn test_status_serde_shape() {
        let json = serde_json::to_value(ExpenseStatus::Pending(Role::Finance)).unwrap();
        assert_eq!(json, serde_json::json!({"state": "pending", "role": "finance"}));

        let json = serde_json::to_value(ExpenseStatus::Approved).unwrap();
        assert_eq!(json, serde_json::json!({"state": "approved"}));
    }

    #[test]
    fn test_status_from_parts() {
        assert_eq!(
            ExpenseStatus::from_parts("pending", Some("manager")).unwrap(),
            ExpenseStatus::Pending(Role::Manager)
        );
        assert_eq!(
            ExpenseStatus::from_parts("approved", None).unwrap(),
            ExpenseStatus::Approved
        );
        assert_eq!(
            ExpenseStatus::from_parts("rejected", Some("finance")).unwrap(),
            ExpenseStatus::Rejected(Role::Finance)
        );
        assert!(ExpenseStatus::from_parts("pending", None).is_err());
        assert!(ExpenseStatus::from_parts("posted", None).is_err());
    }

    #[test]
    fn test_status_display_and_terminal() {
        assert_eq!(
            ExpenseStatus::Rejected(Role::Finance).to_string(),
            "rejected (finance)"
        );
        assert!(!ExpenseStatus::Pending(Role::Manager).is_terminal());
        assert!(ExpenseStatus::Approved.is_terminal());
        assert!(ExpenseStatus::Rejected(Role::Director).is_terminal());
    }
}
