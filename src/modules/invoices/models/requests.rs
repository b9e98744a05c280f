use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::invoice::{BillingContext, InvoiceStatus, Payee, Payer};
use super::line_item::LineItemInput;
use crate::core::{Currency, PaymentRail};

/// Input for invoice creation.
///
/// Totals arrive pre-computed by the billing context (lease activation,
/// tenant-application step, admin action); the service checks the
/// `sub_total = total_amount - taxes` identity but does not re-derive the
/// total from line items.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub payer: Payer,
    pub payee: Payee,
    pub context: BillingContext,
    /// Integer minor units
    pub total_amount: i64,
    /// Integer minor units
    pub taxes: i64,
    pub currency: Currency,
    pub due_date: Option<DateTime<Utc>>,
    pub allowed_payment_rails: Vec<PaymentRail>,
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub status: Option<InvoiceStatus>,
    pub total_amount: Option<i64>,
    pub taxes: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub allowed_payment_rails: Option<Vec<PaymentRail>>,
}
