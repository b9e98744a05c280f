// Offline payment gating: which account states and invoice states may
// record a payment. Exercises the pure validation chain the service runs
// before touching the balance.

use chrono::Utc;

use rentloop_billing::core::{Currency, PaymentRail};
use rentloop_billing::modules::invoices::models::{BillingContext, Invoice, Payee, Payer};
use rentloop_billing::modules::invoices::InvoiceStatus;
use rentloop_billing::modules::payment_accounts::models::{
    AccountOwner, AccountStatus, PaymentAccount,
};
use rentloop_billing::modules::payments::services::payment_service::{
    validate_invoice_accepts_offline, validate_offline_account,
};
use rentloop_billing::AppError;

fn account(status: AccountStatus, rail: PaymentRail) -> PaymentAccount {
    let now = Utc::now();
    PaymentAccount {
        id: "acct-1".to_string(),
        owner: AccountOwner::System,
        rail,
        provider: None,
        identifier: None,
        metadata: None,
        is_default: false,
        status,
        created_at: now,
        updated_at: now,
    }
}

fn invoice(status: InvoiceStatus, rails: Vec<PaymentRail>) -> Invoice {
    let now = Utc::now();
    Invoice {
        id: "inv-1".to_string(),
        code: "INV-2601-ABC123".to_string(),
        payer: Payer::Tenant {
            tenant_id: "ten-1".to_string(),
        },
        payee: Payee::PropertyOwner {
            client_id: "cli-1".to_string(),
        },
        context: BillingContext::LeaseRent {
            lease_id: "lease-1".to_string(),
        },
        total_amount: 100_000,
        taxes: 0,
        sub_total: 100_000,
        currency: Currency::GHS,
        status,
        allowed_payment_rails: rails,
        due_date: None,
        issued_at: None,
        paid_at: None,
        voided_at: None,
        created_at: now,
        updated_at: now,
        line_items: vec![],
    }
}

#[test]
fn only_active_offline_accounts_pass() {
    assert!(validate_offline_account(&account(AccountStatus::Active, PaymentRail::Offline)).is_ok());

    for rail in [
        PaymentRail::Momo,
        PaymentRail::BankTransfer,
        PaymentRail::Card,
    ] {
        assert!(
            validate_offline_account(&account(AccountStatus::Active, rail)).is_err(),
            "{} account must be rejected",
            rail
        );
    }

    assert!(
        validate_offline_account(&account(AccountStatus::Disabled, PaymentRail::Offline)).is_err()
    );
}

#[test]
fn disabled_account_error_names_the_status() {
    let err =
        validate_offline_account(&account(AccountStatus::Disabled, PaymentRail::Offline))
            .unwrap_err();
    match err {
        AppError::BadRequest {
            details: Some(details),
            ..
        } => assert_eq!(details["status"], "DISABLED"),
        other => panic!("expected BadRequest with details, got {:?}", other),
    }
}

#[test]
fn wrong_rail_error_names_the_rail() {
    let err = validate_offline_account(&account(AccountStatus::Active, PaymentRail::Momo))
        .unwrap_err();
    match err {
        AppError::BadRequest {
            details: Some(details),
            ..
        } => assert_eq!(details["rail"], "MOMO"),
        other => panic!("expected BadRequest with details, got {:?}", other),
    }
}

#[test]
fn only_issued_and_partially_paid_invoices_accept_payments() {
    let rails = vec![PaymentRail::Offline];

    for status in [InvoiceStatus::Issued, InvoiceStatus::PartiallyPaid] {
        assert!(
            validate_invoice_accepts_offline(&invoice(status, rails.clone())).is_ok(),
            "{} must accept payments",
            status
        );
    }

    for status in [InvoiceStatus::Draft, InvoiceStatus::Paid, InvoiceStatus::Void] {
        assert!(
            validate_invoice_accepts_offline(&invoice(status, rails.clone())).is_err(),
            "{} must reject payments",
            status
        );
    }
}

#[test]
fn invoice_must_allow_the_offline_rail() {
    let only_momo = invoice(InvoiceStatus::Issued, vec![PaymentRail::Momo]);
    let err = validate_invoice_accepts_offline(&only_momo).unwrap_err();
    match err {
        AppError::BadRequest {
            details: Some(details),
            ..
        } => assert_eq!(details["allowed_payment_rails"][0], "MOMO"),
        other => panic!("expected BadRequest with details, got {:?}", other),
    }

    let no_rails = invoice(InvoiceStatus::Issued, vec![]);
    assert!(validate_invoice_accepts_offline(&no_rails).is_err());
}

#[test]
fn state_check_precedes_rail_check() {
    // A draft invoice that also lacks the rail fails on state first.
    let err = validate_invoice_accepts_offline(&invoice(
        InvoiceStatus::Draft,
        vec![PaymentRail::Momo],
    ))
    .unwrap_err();
    match err {
        AppError::BadRequest { message, .. } => {
            assert!(message.contains("not in a valid state"));
        }
        other => panic!("expected BadRequest, got {:?}", other),
    }
}
