use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::code::{generate_unique, invoice_code};
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{
    CreateInvoiceRequest, Invoice, InvoiceFilter, InvoiceLineItem, InvoiceStatus, LineItemInput,
    UpdateInvoiceRequest,
};
use crate::modules::invoices::repositories::InvoiceRepository;

/// Owns the invoice lifecycle: creation with a generated human code,
/// guarded status transitions, line-item attachment, filtered reads.
pub struct InvoiceService {
    invoice_repo: Arc<InvoiceRepository>,
    code_max_attempts: u32,
}

impl InvoiceService {
    pub fn new(invoice_repo: Arc<InvoiceRepository>, code_max_attempts: u32) -> Self {
        Self {
            invoice_repo,
            code_max_attempts,
        }
    }

    /// Create a new invoice with line items.
    ///
    /// Totals are caller-supplied; only the `sub_total = total_amount - taxes`
    /// identity is derived here. Line-item sums are intentionally not folded
    /// into the invoice total.
    pub async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<Invoice> {
        if request.total_amount < 0 {
            return Err(AppError::bad_request_with(
                "invoice total cannot be negative",
                serde_json::json!({ "total_amount": request.total_amount }),
            ));
        }
        if request.taxes < 0 || request.taxes > request.total_amount {
            return Err(AppError::bad_request_with(
                "taxes must be between zero and the invoice total",
                serde_json::json!({
                    "taxes": request.taxes,
                    "total_amount": request.total_amount,
                }),
            ));
        }

        let code = generate_unique(
            || invoice_code(Utc::now()),
            |candidate| async move { self.invoice_repo.exists_by_code(&candidate).await },
            self.code_max_attempts,
        )
        .await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let line_items = request
            .line_items
            .into_iter()
            .map(|item| {
                InvoiceLineItem::new(
                    id.clone(),
                    item.label,
                    item.category,
                    item.quantity,
                    item.unit_amount,
                    item.metadata,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let invoice = Invoice {
            id,
            code,
            payer: request.payer,
            payee: request.payee,
            context: request.context,
            total_amount: request.total_amount,
            taxes: request.taxes,
            sub_total: request.total_amount - request.taxes,
            currency: request.currency,
            status: InvoiceStatus::Draft,
            allowed_payment_rails: request.allowed_payment_rails,
            due_date: request.due_date,
            issued_at: None,
            paid_at: None,
            voided_at: None,
            created_at: now,
            updated_at: now,
            line_items,
        };

        self.invoice_repo.create(&invoice).await?;

        tracing::info!(
            invoice_id = %invoice.id,
            code = %invoice.code,
            total_amount = invoice.total_amount,
            "invoice created"
        );

        Ok(invoice)
    }

    /// Apply a partial update; only the fields present in the request change.
    /// Status changes are checked against the lifecycle transition table.
    pub async fn update_invoice(
        &self,
        invoice_id: &str,
        request: UpdateInvoiceRequest,
    ) -> Result<Invoice> {
        let mut invoice = self
            .invoice_repo
            .find_by_id(invoice_id, false)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        if let Some(total_amount) = request.total_amount {
            if total_amount < 0 {
                return Err(AppError::bad_request_with(
                    "invoice total cannot be negative",
                    serde_json::json!({ "total_amount": total_amount }),
                ));
            }
            invoice.total_amount = total_amount;
        }
        if let Some(taxes) = request.taxes {
            invoice.taxes = taxes;
        }
        if invoice.taxes < 0 || invoice.taxes > invoice.total_amount {
            return Err(AppError::bad_request_with(
                "taxes must be between zero and the invoice total",
                serde_json::json!({
                    "taxes": invoice.taxes,
                    "total_amount": invoice.total_amount,
                }),
            ));
        }
        // Keep the identity intact whenever either amount moved
        invoice.sub_total = invoice.total_amount - invoice.taxes;

        if let Some(due_date) = request.due_date {
            invoice.due_date = Some(due_date);
        }
        if let Some(rails) = request.allowed_payment_rails {
            invoice.allowed_payment_rails = rails;
        }
        if let Some(status) = request.status {
            if status != invoice.status {
                invoice.transition_to(status)?;
            }
        }

        invoice.updated_at = Utc::now();
        self.invoice_repo.update(&invoice).await?;

        Ok(invoice)
    }

    /// Get invoice by ID, optionally with its line items
    pub async fn get_invoice(&self, invoice_id: &str, with_line_items: bool) -> Result<Invoice> {
        self.invoice_repo
            .find_by_id(invoice_id, with_line_items)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))
    }

    pub async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        self.invoice_repo.list(filter).await
    }

    pub async fn count_invoices(&self, filter: &InvoiceFilter) -> Result<i64> {
        self.invoice_repo.count(filter).await
    }

    /// Attach a line item to an existing invoice.
    ///
    /// Terminal invoices (PAID, VOID) no longer accept line items.
    pub async fn add_line_item(
        &self,
        invoice_id: &str,
        input: LineItemInput,
    ) -> Result<InvoiceLineItem> {
        let invoice = self.invoice_repo.find_by_id(invoice_id, false).await?;
        let invoice = ensure_line_item_allowed(invoice.as_ref(), invoice_id)?;

        let line_item = InvoiceLineItem::new(
            invoice.id.clone(),
            input.label,
            input.category,
            input.quantity,
            input.unit_amount,
            input.metadata,
        )?;

        self.invoice_repo.insert_line_item(&line_item).await?;

        Ok(line_item)
    }

    pub async fn get_line_items(&self, invoice_id: &str) -> Result<Vec<InvoiceLineItem>> {
        // 404 first so a missing invoice is distinguishable from one with no items
        self.invoice_repo
            .find_by_id(invoice_id, false)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        self.invoice_repo.find_line_items(invoice_id).await
    }
}

/// Gate for line-item attachment: the invoice must exist and must not have
/// reached a terminal status. Runs before anything is written, so a missing
/// or closed invoice leaves no row behind.
pub fn ensure_line_item_allowed<'a>(
    invoice: Option<&'a Invoice>,
    invoice_id: &str,
) -> Result<&'a Invoice> {
    let invoice = invoice
        .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

    if invoice.status.is_terminal() {
        return Err(AppError::bad_request_with(
            format!("cannot add line items to a {} invoice", invoice.status),
            serde_json::json!({ "status": invoice.status }),
        ));
    }

    Ok(invoice)
}
