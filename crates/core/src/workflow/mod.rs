//! Expense approval workflow.
//!
//! Each expense carries its own copy of the configured approval flow. The
//! state machine walks it one level at a time: the role at the current
//! level approves (move on) or rejects (stop). Reaching the end approves.
//!
//! # Modules
//!
//! - `types` - Flow, status, decisions and audit entries
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::ApprovalWorkflow;
pub use types::{
    ApprovalAction, ApprovalFlow, ApprovalState, Decision, ExpenseStatus, Transition,
};
