use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{metadata, AppError, Result};

/// One itemized charge within an invoice (e.g. "January Rent")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    /// Unique identifier (UUID)
    pub id: String,

    pub invoice_id: String,

    /// Human-readable label
    pub label: String,

    /// Free-form grouping (rent, utilities, fees, ...)
    pub category: Option<String>,

    pub quantity: i32,

    /// Price per unit, integer minor units
    pub unit_amount: i64,

    /// Computed: quantity x unit_amount
    pub total_amount: i64,

    /// Free-form JSON object
    pub metadata: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceLineItem {
    /// Build a validated line item for an invoice.
    ///
    /// The total is always derived here from quantity x unit amount; callers
    /// never supply it.
    pub fn new(
        invoice_id: String,
        label: String,
        category: Option<String>,
        quantity: i32,
        unit_amount: i64,
        item_metadata: Option<serde_json::Value>,
    ) -> Result<Self> {
        if label.trim().is_empty() {
            return Err(AppError::bad_request("line item label cannot be empty"));
        }
        if quantity <= 0 {
            return Err(AppError::bad_request_with(
                "line item quantity must be positive",
                serde_json::json!({ "quantity": quantity }),
            ));
        }
        if unit_amount < 0 {
            return Err(AppError::bad_request_with(
                "line item unit amount cannot be negative",
                serde_json::json!({ "unit_amount": unit_amount }),
            ));
        }
        metadata::ensure_object("line_item.metadata", item_metadata.as_ref())?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            label,
            category,
            quantity,
            unit_amount,
            total_amount: i64::from(quantity) * unit_amount,
            metadata: item_metadata,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Line-item payload inside `CreateInvoiceRequest` and `AddLineItem`
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub label: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub unit_amount: i64,
    pub metadata: Option<serde_json::Value>,
}
