// The balance invariant: payments with status PENDING or SUCCESSFUL never
// sum past the invoice total. These tests cover the pure decision function;
// the service runs it under a FOR UPDATE lock on the invoice row.

use proptest::prelude::*;

use rentloop_billing::modules::payments::services::payment_service::{
    validate_amount, validate_remaining_balance,
};
use rentloop_billing::AppError;

fn remaining_balance_details(err: AppError) -> i64 {
    match err {
        AppError::BadRequest {
            details: Some(details),
            ..
        } => details["remaining_balance"].as_i64().unwrap(),
        other => panic!("expected BadRequest with details, got {:?}", other),
    }
}

#[test]
fn partial_payment_sequence_respects_the_total() {
    let total = 100_000;

    // First payment of 60000 against a fresh invoice
    assert!(validate_remaining_balance(total, 0, 60_000).is_ok());

    // With 60000 committed, 50000 no longer fits
    let err = validate_remaining_balance(total, 60_000, 50_000).unwrap_err();
    assert_eq!(remaining_balance_details(err), 40_000);

    // 40000 exactly settles the invoice
    assert!(validate_remaining_balance(total, 60_000, 40_000).is_ok());

    // Fully committed: even one minor unit is rejected
    let err = validate_remaining_balance(total, 100_000, 1).unwrap_err();
    assert_eq!(remaining_balance_details(err), 0);
}

#[test]
fn pending_amounts_reserve_balance() {
    // A still-unverified 100000 deposit blocks further submissions entirely.
    assert!(validate_remaining_balance(100_000, 100_000, 1).is_err());

    // And a partial pending amount shrinks what is left.
    assert!(validate_remaining_balance(100_000, 99_999, 1).is_ok());
    assert!(validate_remaining_balance(100_000, 99_999, 2).is_err());
}

#[test]
fn non_positive_amounts_never_reach_the_balance_check() {
    assert!(validate_amount(0).is_err());
    assert!(validate_amount(-100_000).is_err());
    assert!(validate_amount(1).is_ok());
}

proptest! {
    #[test]
    fn accepted_amounts_never_exceed_remaining(
        total in 0i64..1_000_000_000,
        committed_frac in 0.0f64..=1.0,
        amount in 1i64..1_000_000_000,
    ) {
        let committed = (total as f64 * committed_frac) as i64;
        let remaining = total - committed;

        match validate_remaining_balance(total, committed, amount) {
            Ok(()) => prop_assert!(amount <= remaining),
            Err(_) => prop_assert!(amount > remaining),
        }
    }

    #[test]
    fn rejection_reports_the_exact_remaining_balance(
        total in 0i64..1_000_000_000,
        committed in 0i64..1_000_000_000,
    ) {
        let remaining = total - committed;
        // One past the remaining balance always fails, and the error
        // carries the remaining amount the caller could still submit.
        let amount = remaining.max(0) + 1;
        let err = validate_remaining_balance(total, committed, amount).unwrap_err();
        match err {
            AppError::BadRequest { details: Some(details), .. } => {
                prop_assert_eq!(details["remaining_balance"].as_i64().unwrap(), remaining);
            }
            other => return Err(TestCaseError::fail(format!("unexpected error: {:?}", other))),
        }
    }
}
