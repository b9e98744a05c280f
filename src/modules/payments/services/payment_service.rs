// Offline payment intake.
//
// The balance check and the insert run in one transaction with the invoice
// row locked (SELECT ... FOR UPDATE), so two concurrent submissions against
// the same invoice serialize and the second one sees the first one's PENDING
// amount. PENDING payments count against the balance: an unverified cash
// deposit already reserves its part of the invoice.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::metadata::ensure_object;
use crate::core::{AppError, PaymentRail, Result};
use crate::modules::invoices::models::Invoice;
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::payment_accounts::models::PaymentAccount;
use crate::modules::payment_accounts::repositories::PaymentAccountRepository;
use crate::modules::payments::models::{CreateOfflinePaymentRequest, Payment, PaymentStatus};
use crate::modules::payments::repositories::PaymentRepository;

/// Service for payment business logic
pub struct PaymentService {
    payment_repo: Arc<PaymentRepository>,
    account_repo: Arc<PaymentAccountRepository>,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<PaymentRepository>,
        account_repo: Arc<PaymentAccountRepository>,
    ) -> Self {
        Self {
            payment_repo,
            account_repo,
        }
    }

    /// Record an offline payment against an invoice.
    ///
    /// Validation order (each failure short-circuits):
    /// amount, account (exists / active / offline rail), invoice
    /// (exists / payable / rail allowed), remaining balance.
    pub async fn create_offline_payment(
        &self,
        request: CreateOfflinePaymentRequest,
    ) -> Result<Payment> {
        validate_amount(request.amount)?;

        let account = self
            .account_repo
            .find_by_id(&request.payment_account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Payment account with id '{}' not found",
                    request.payment_account_id
                ))
            })?;
        validate_offline_account(&account)?;

        ensure_object("metadata", request.metadata.as_ref())?;

        let mut tx = self.payment_repo.pool().begin().await?;

        let invoice = InvoiceRepository::find_by_id_for_update(&mut tx, &request.invoice_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Invoice with id '{}' not found",
                    request.invoice_id
                ))
            })?;

        validate_invoice_accepts_offline(&invoice)?;

        let committed = PaymentRepository::sum_amount_by_invoice(
            &mut tx,
            &invoice.id,
            &PaymentStatus::COUNTED_AGAINST_BALANCE,
        )
        .await?;
        validate_remaining_balance(invoice.total_amount, committed, request.amount)?;

        let mut metadata = request
            .metadata
            .unwrap_or_else(|| serde_json::json!({}));
        metadata["payment_account"] = account.snapshot();

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice.id.clone(),
            payment_account_id: account.id.clone(),
            rail: PaymentRail::Offline,
            provider: account.provider.clone(),
            amount: request.amount,
            currency: invoice.currency,
            reference: request.reference,
            status: PaymentStatus::Pending,
            successful_at: None,
            failed_at: None,
            metadata: Some(metadata),
            created_at: now,
            updated_at: now,
        };

        self.payment_repo.create_with_tx(&mut tx, &payment).await?;
        tx.commit().await?;

        tracing::info!(
            payment_id = %payment.id,
            invoice_id = %payment.invoice_id,
            amount = payment.amount,
            "offline payment recorded"
        );

        Ok(payment)
    }

    /// Fetch a single payment
    pub async fn get_payment(&self, id: &str) -> Result<Payment> {
        self.payment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment with id '{}' not found", id)))
    }

    /// All payments recorded against an invoice
    pub async fn list_payments_for_invoice(&self, invoice_id: &str) -> Result<Vec<Payment>> {
        self.payment_repo.find_by_invoice(invoice_id).await
    }
}

/// Amount must be strictly positive
pub fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(AppError::bad_request("payment amount must be positive"));
    }
    Ok(())
}

/// The settlement account must be active and on the OFFLINE rail
pub fn validate_offline_account(account: &PaymentAccount) -> Result<()> {
    if !account.is_active() {
        return Err(AppError::bad_request_with(
            "payment account is not active",
            serde_json::json!({ "status": account.status }),
        ));
    }
    if account.rail != PaymentRail::Offline {
        return Err(AppError::bad_request_with(
            "payment account is not an offline account",
            serde_json::json!({ "rail": account.rail }),
        ));
    }
    Ok(())
}

/// The invoice must be payable and must accept the OFFLINE rail
pub fn validate_invoice_accepts_offline(invoice: &Invoice) -> Result<()> {
    if !invoice.status.accepts_payments() {
        return Err(AppError::bad_request_with(
            "invoice is not in a valid state to accept payments",
            serde_json::json!({ "status": invoice.status }),
        ));
    }
    if !invoice.allows_rail(PaymentRail::Offline) {
        return Err(AppError::bad_request_with(
            "invoice does not accept offline payments",
            serde_json::json!({ "allowed_payment_rails": invoice.allowed_payment_rails }),
        ));
    }
    Ok(())
}

/// The amount may not exceed what is left after PENDING + SUCCESSFUL payments
pub fn validate_remaining_balance(total_amount: i64, committed: i64, amount: i64) -> Result<()> {
    let remaining = total_amount - committed;
    if amount > remaining {
        return Err(AppError::bad_request_with(
            "payment amount exceeds the invoice's remaining balance",
            serde_json::json!({ "remaining_balance": remaining }),
        ));
    }
    Ok(())
}
