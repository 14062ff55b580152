//! Property-based tests for the voucher state machine.

use proptest::prelude::*;

use ledgerline_shared::types::UserId;
use uuid::Uuid;

use crate::voucher::types::VoucherStatus;
use crate::voucher::workflow::{VoucherAction, VoucherWorkflow};

fn arb_status() -> impl Strategy<Value = VoucherStatus> {
    prop_oneof![
        Just(VoucherStatus::Draft),
        Just(VoucherStatus::Pending),
        Just(VoucherStatus::Approved),
        Just(VoucherStatus::Posted),
        Just(VoucherStatus::Rejected),
        Just(VoucherStatus::Cancelled),
    ]
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Submit,
    Approve,
    Reject,
    Post,
    Cancel,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Submit),
        Just(Op::Approve),
        Just(Op::Reject),
        Just(Op::Post),
        Just(Op::Cancel),
    ]
}

fn run(op: Op, status: VoucherStatus, user: UserId) -> Option<VoucherAction> {
    match op {
        Op::Submit => VoucherWorkflow::submit(status, user),
        Op::Approve => VoucherWorkflow::approve(status, user),
        Op::Reject => VoucherWorkflow::reject(status, user, "needs rework"),
        Op::Post => VoucherWorkflow::post(status, user),
        Op::Cancel => VoucherWorkflow::cancel(status, user),
    }
    .ok()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every successful operation is a valid transition and stamps the actor.
    #[test]
    fn test_prop_successful_ops_are_valid_transitions(
        status in arb_status(),
        op in arb_op(),
        user in arb_user(),
    ) {
        if let Some(action) = run(op, status, user) {
            prop_assert!(VoucherWorkflow::is_valid_transition(status, action.new_status()));
            let stamp = match &action {
                VoucherAction::Submit { stamp }
                | VoucherAction::Approve { stamp }
                | VoucherAction::Reject { stamp, .. }
                | VoucherAction::Post { stamp }
                | VoucherAction::Cancel { stamp } => *stamp,
            };
            prop_assert_eq!(stamp.by, user);
        }
    }

    /// Posted and cancelled vouchers accept no operation at all.
    #[test]
    fn test_prop_posted_and_cancelled_are_final(op in arb_op(), user in arb_user()) {
        prop_assert!(run(op, VoucherStatus::Posted, user).is_none());
        prop_assert!(run(op, VoucherStatus::Cancelled, user).is_none());
    }

    /// Any walk through the machine only reaches Posted via Approved.
    #[test]
    fn test_prop_posted_only_after_approved(
        ops in prop::collection::vec(arb_op(), 1..12),
        user in arb_user(),
    ) {
        let mut status = VoucherStatus::Draft;
        for op in ops {
            if let Some(action) = run(op, status, user) {
                if action.new_status() == VoucherStatus::Posted {
                    prop_assert_eq!(status, VoucherStatus::Approved);
                }
                status = action.new_status();
            }
        }
    }
}
