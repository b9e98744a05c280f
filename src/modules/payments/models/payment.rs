// A payment is money offered against an invoice. Offline payments enter as
// PENDING and stay immutable in amount; verification is an external
// collaborator's job, so this service only records and reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Currency, PaymentRail};

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded, not yet verified. Counts against the invoice balance.
    Pending,
    Successful,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Successful => write!(f, "SUCCESSFUL"),
            PaymentStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "SUCCESSFUL" => Ok(PaymentStatus::Successful),
            "FAILED" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl PaymentStatus {
    /// Statuses that reserve part of the invoice balance
    pub const COUNTED_AGAINST_BALANCE: [PaymentStatus; 2] =
        [PaymentStatus::Pending, PaymentStatus::Successful];
}

/// Money offered against an invoice
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    /// Unique payment ID (UUID)
    pub id: String,

    pub invoice_id: String,
    pub payment_account_id: String,

    pub rail: PaymentRail,

    /// Settlement provider, copied from the account at creation
    pub provider: Option<String>,

    /// Amount in minor units; immutable after creation
    pub amount: i64,
    pub currency: Currency,

    /// Caller-supplied external reference (receipt number, teller slip)
    pub reference: Option<String>,

    pub status: PaymentStatus,

    /// Stamped by the verification collaborator on the matching outcome
    pub successful_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,

    /// Account snapshot at creation time plus caller-supplied offline data
    pub metadata: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording an offline payment against an invoice
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOfflinePaymentRequest {
    pub invoice_id: String,
    pub payment_account_id: String,
    /// Amount in minor units
    pub amount: i64,
    pub reference: Option<String>,
    pub metadata: Option<serde_json::Value>,
}
