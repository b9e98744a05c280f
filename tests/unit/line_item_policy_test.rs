// Line-item attachment policy: the invoice must exist and must still be
// open. The gate runs before any insert, so a rejected attachment writes
// nothing.

use chrono::Utc;

use rentloop_billing::core::{Currency, PaymentRail};
use rentloop_billing::modules::invoices::models::{BillingContext, Invoice, Payee, Payer};
use rentloop_billing::modules::invoices::services::invoice_service::ensure_line_item_allowed;
use rentloop_billing::modules::invoices::InvoiceStatus;
use rentloop_billing::AppError;

fn invoice(status: InvoiceStatus) -> Invoice {
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
        allowed_payment_rails: vec![PaymentRail::Momo],
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
fn missing_invoice_is_not_found() {
    let err = ensure_line_item_allowed(None, "inv-404").unwrap_err();
    match err {
        AppError::NotFound(message) => assert!(message.contains("inv-404")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn terminal_invoices_reject_line_items() {
    for status in [InvoiceStatus::Paid, InvoiceStatus::Void] {
        let invoice = invoice(status);
        let err = ensure_line_item_allowed(Some(&invoice), &invoice.id).unwrap_err();
        match err {
            AppError::BadRequest {
                details: Some(details),
                ..
            } => assert_eq!(details["status"], status.to_string()),
            other => panic!("expected BadRequest for {}, got {:?}", status, other),
        }
    }
}

#[test]
fn open_invoices_accept_line_items() {
    for status in [
        InvoiceStatus::Draft,
        InvoiceStatus::Issued,
        InvoiceStatus::PartiallyPaid,
    ] {
        let invoice = invoice(status);
        let allowed = ensure_line_item_allowed(Some(&invoice), &invoice.id).unwrap();
        assert_eq!(allowed.id, "inv-1");
    }
}
