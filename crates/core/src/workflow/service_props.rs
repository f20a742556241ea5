//! Property-based tests for the approval state machine.

use proptest::prelude::*;
use spendflow_shared::types::UserId;

use crate::auth::{Identity, Role};
use crate::workflow::error::WorkflowError;
use crate::workflow::service::ApprovalWorkflow;
use crate::workflow::types::{ApprovalFlow, Decision, ExpenseStatus};

fn arb_approver() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Manager),
        Just(Role::Finance),
        Just(Role::Director),
        Just(Role::Admin),
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Employee), arb_approver()]
}

fn arb_flow() -> impl Strategy<Value = ApprovalFlow> {
    prop::collection::vec(arb_approver(), 1..6).prop_map(|roles| ApprovalFlow::new(roles).unwrap())
}

fn arb_comment() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[a-z ]{0,40}".prop_map(Some)]
}

fn actor(role: Role) -> Identity {
    Identity::new(UserId::new(), "tester", role)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// n approvals by the right roles in order end in Approved.
    #[test]
    fn prop_full_approval_reaches_approved(flow in arb_flow()) {
        let mut state = ApprovalWorkflow::start(flow.clone());
        for (level, role) in flow.roles().iter().enumerate() {
            prop_assert_eq!(state.current_index, Some(level));
            state = ApprovalWorkflow::advance(&state, &actor(*role), Decision::Approve, None)
                .unwrap()
                .state;
        }
        prop_assert_eq!(state.status, ExpenseStatus::Approved);
        prop_assert_eq!(state.current_index, None);
    }

    /// A rejection at any level is terminal and blocks every later action.
    #[test]
    fn prop_rejection_is_terminal(
        flow in arb_flow(),
        reject_at in 0usize..6,
        later_role in arb_role(),
    ) {
        let reject_at = reject_at % flow.len();
        let mut state = ApprovalWorkflow::start(flow.clone());
        for role in &flow.roles()[..reject_at] {
            state = ApprovalWorkflow::advance(&state, &actor(*role), Decision::Approve, None)
                .unwrap()
                .state;
        }

        let rejecter = flow.roles()[reject_at];
        let rejected = ApprovalWorkflow::advance(&state, &actor(rejecter), Decision::Reject, None)
            .unwrap()
            .state;
        prop_assert_eq!(rejected.status, ExpenseStatus::Rejected(rejecter));

        for decision in [Decision::Approve, Decision::Reject] {
            let err = ApprovalWorkflow::advance(&rejected, &actor(later_role), decision, None)
                .unwrap_err();
            prop_assert_eq!(err, WorkflowError::AlreadyFinalized(rejected.status));
        }
    }

    /// Any role other than the current approver is denied.
    #[test]
    fn prop_wrong_role_denied(flow in arb_flow(), role in arb_role(), decision in prop_oneof![Just(Decision::Approve), Just(Decision::Reject)]) {
        let state = ApprovalWorkflow::start(flow.clone());
        let required = flow.roles()[0];
        prop_assume!(role != required);

        let err = ApprovalWorkflow::advance(&state, &actor(role), decision, None).unwrap_err();
        prop_assert_eq!(err, WorkflowError::PermissionDenied { acting: role, required });
    }

    /// Comments are recorded but never change the resulting state.
    #[test]
    fn prop_comment_does_not_affect_transition(flow in arb_flow(), comment in arb_comment()) {
        let state = ApprovalWorkflow::start(flow.clone());
        let who = actor(flow.roles()[0]);

        let with = ApprovalWorkflow::advance(&state, &who, Decision::Approve, comment).unwrap();
        let without = ApprovalWorkflow::advance(&state, &who, Decision::Approve, None).unwrap();
        prop_assert_eq!(with.state, without.state);
    }

    /// The index only moves forward while pending.
    #[test]
    fn prop_index_monotonic(flow in arb_flow()) {
        let mut state = ApprovalWorkflow::start(flow.clone());
        let mut last = 0usize;
        while let Some(role) = state.current_approver() {
            let next = ApprovalWorkflow::advance(&state, &actor(role), Decision::Approve, None)
                .unwrap()
                .state;
            if let Some(index) = next.current_index {
                prop_assert!(index > last);
                last = index;
            }
            state = next;
        }
        prop_assert!(state.is_terminal());
    }
}
