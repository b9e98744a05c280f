// An invoice is a bill for a fixed total amount with a lifecycle status and
// the set of settlement rails it accepts. Amounts are integer minor units in
// a single currency; the creator supplies totals pre-computed and the
// service enforces `sub_total = total_amount - taxes`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::line_item::InvoiceLineItem;
use crate::core::query::{DateRange, Pagination, SortOrder};
use crate::core::{AppError, Currency, PaymentRail, Result};

/// Invoice status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Created but not yet payable
    Draft,

    /// Issued to the payer; accepts payments
    Issued,

    /// Some balance settled, some outstanding
    PartiallyPaid,

    /// Fully settled (terminal)
    Paid,

    /// Cancelled (terminal)
    Void,
}

impl InvoiceStatus {
    /// Legal lifecycle transitions:
    /// DRAFT -> {ISSUED, VOID}; ISSUED -> {PARTIALLY_PAID, PAID, VOID};
    /// PARTIALLY_PAID -> {PAID, VOID}; PAID and VOID are terminal.
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Issued)
                | (Draft, Void)
                | (Issued, PartiallyPaid)
                | (Issued, Paid)
                | (Issued, Void)
                | (PartiallyPaid, Paid)
                | (PartiallyPaid, Void)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Void)
    }

    /// Whether an invoice in this status may accept payments
    pub fn accepts_payments(&self) -> bool {
        matches!(self, InvoiceStatus::Issued | InvoiceStatus::PartiallyPaid)
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "DRAFT"),
            InvoiceStatus::Issued => write!(f, "ISSUED"),
            InvoiceStatus::PartiallyPaid => write!(f, "PARTIALLY_PAID"),
            InvoiceStatus::Paid => write!(f, "PAID"),
            InvoiceStatus::Void => write!(f, "VOID"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "ISSUED" => Ok(InvoiceStatus::Issued),
            "PARTIALLY_PAID" => Ok(InvoiceStatus::PartiallyPaid),
            "PAID" => Ok(InvoiceStatus::Paid),
            "VOID" => Ok(InvoiceStatus::Void),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// The party that owes the invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payer {
    TenantApplication {
        tenant_application_id: String,
    },
    Tenant {
        tenant_id: String,
    },
    PropertyOwner {
        client_id: String,
        property_id: Option<String>,
    },
}

/// Discriminant-only view of `Payer`, used by filters and row mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(30)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayerKind {
    TenantApplication,
    Tenant,
    PropertyOwner,
}

impl std::fmt::Display for PayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayerKind::TenantApplication => write!(f, "TENANT_APPLICATION"),
            PayerKind::Tenant => write!(f, "TENANT"),
            PayerKind::PropertyOwner => write!(f, "PROPERTY_OWNER"),
        }
    }
}

impl std::str::FromStr for PayerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "TENANT_APPLICATION" => Ok(PayerKind::TenantApplication),
            "TENANT" => Ok(PayerKind::Tenant),
            "PROPERTY_OWNER" => Ok(PayerKind::PropertyOwner),
            _ => Err(format!("Invalid payer type: {}", s)),
        }
    }
}

impl Payer {
    pub fn kind(&self) -> PayerKind {
        match self {
            Payer::TenantApplication { .. } => PayerKind::TenantApplication,
            Payer::Tenant { .. } => PayerKind::Tenant,
            Payer::PropertyOwner { .. } => PayerKind::PropertyOwner,
        }
    }

    /// Rebuild the payer from its persisted columns.
    ///
    /// A row whose reference columns contradict its type tag is corrupt and
    /// surfaces as Internal, never as a silently defaulted variant.
    pub fn from_parts(
        kind: PayerKind,
        client_id: Option<String>,
        property_id: Option<String>,
        tenant_id: Option<String>,
        tenant_application_id: Option<String>,
    ) -> Result<Self> {
        match kind {
            PayerKind::TenantApplication => {
                let tenant_application_id = tenant_application_id.ok_or_else(|| {
                    AppError::internal("invoice row: TENANT_APPLICATION payer without reference")
                })?;
                Ok(Payer::TenantApplication {
                    tenant_application_id,
                })
            }
            PayerKind::Tenant => {
                let tenant_id = tenant_id.ok_or_else(|| {
                    AppError::internal("invoice row: TENANT payer without reference")
                })?;
                Ok(Payer::Tenant { tenant_id })
            }
            PayerKind::PropertyOwner => {
                let client_id = client_id.ok_or_else(|| {
                    AppError::internal("invoice row: PROPERTY_OWNER payer without client")
                })?;
                Ok(Payer::PropertyOwner {
                    client_id,
                    property_id,
                })
            }
        }
    }

    /// Flatten to `(client_id, property_id, tenant_id, tenant_application_id)`
    pub fn parts(
        &self,
    ) -> (
        Option<&str>,
        Option<&str>,
        Option<&str>,
        Option<&str>,
    ) {
        match self {
            Payer::TenantApplication {
                tenant_application_id,
            } => (None, None, None, Some(tenant_application_id.as_str())),
            Payer::Tenant { tenant_id } => (None, None, Some(tenant_id.as_str()), None),
            Payer::PropertyOwner {
                client_id,
                property_id,
            } => (
                Some(client_id.as_str()),
                property_id.as_deref(),
                None,
                None,
            ),
        }
    }
}

/// The party the invoice is owed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payee {
    PropertyOwner { client_id: String },
    Rentloop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(30)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayeeKind {
    PropertyOwner,
    Rentloop,
}

impl std::fmt::Display for PayeeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayeeKind::PropertyOwner => write!(f, "PROPERTY_OWNER"),
            PayeeKind::Rentloop => write!(f, "RENTLOOP"),
        }
    }
}

impl std::str::FromStr for PayeeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PROPERTY_OWNER" => Ok(PayeeKind::PropertyOwner),
            "RENTLOOP" => Ok(PayeeKind::Rentloop),
            _ => Err(format!("Invalid payee type: {}", s)),
        }
    }
}

impl Payee {
    pub fn kind(&self) -> PayeeKind {
        match self {
            Payee::PropertyOwner { .. } => PayeeKind::PropertyOwner,
            Payee::Rentloop => PayeeKind::Rentloop,
        }
    }

    pub fn from_parts(kind: PayeeKind, client_id: Option<String>) -> Result<Self> {
        match kind {
            PayeeKind::PropertyOwner => {
                let client_id = client_id.ok_or_else(|| {
                    AppError::internal("invoice row: PROPERTY_OWNER payee without client")
                })?;
                Ok(Payee::PropertyOwner { client_id })
            }
            PayeeKind::Rentloop => Ok(Payee::Rentloop),
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            Payee::PropertyOwner { client_id } => Some(client_id.as_str()),
            Payee::Rentloop => None,
        }
    }
}

/// What generated the invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingContext {
    LeaseRent {
        lease_id: String,
    },
    Maintenance {
        maintenance_request_id: String,
    },
    SaasFee,
    TenantApplication {
        tenant_application_id: String,
    },
    GeneralExpense {
        reference: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(30)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextKind {
    LeaseRent,
    Maintenance,
    SaasFee,
    TenantApplication,
    GeneralExpense,
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextKind::LeaseRent => write!(f, "LEASE_RENT"),
            ContextKind::Maintenance => write!(f, "MAINTENANCE"),
            ContextKind::SaasFee => write!(f, "SAAS_FEE"),
            ContextKind::TenantApplication => write!(f, "TENANT_APPLICATION"),
            ContextKind::GeneralExpense => write!(f, "GENERAL_EXPENSE"),
        }
    }
}

impl std::str::FromStr for ContextKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "LEASE_RENT" => Ok(ContextKind::LeaseRent),
            "MAINTENANCE" => Ok(ContextKind::Maintenance),
            "SAAS_FEE" => Ok(ContextKind::SaasFee),
            "TENANT_APPLICATION" => Ok(ContextKind::TenantApplication),
            "GENERAL_EXPENSE" => Ok(ContextKind::GeneralExpense),
            _ => Err(format!("Invalid context type: {}", s)),
        }
    }
}

impl BillingContext {
    pub fn kind(&self) -> ContextKind {
        match self {
            BillingContext::LeaseRent { .. } => ContextKind::LeaseRent,
            BillingContext::Maintenance { .. } => ContextKind::Maintenance,
            BillingContext::SaasFee => ContextKind::SaasFee,
            BillingContext::TenantApplication { .. } => ContextKind::TenantApplication,
            BillingContext::GeneralExpense { .. } => ContextKind::GeneralExpense,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            BillingContext::LeaseRent { lease_id } => Some(lease_id.as_str()),
            BillingContext::Maintenance {
                maintenance_request_id,
            } => Some(maintenance_request_id.as_str()),
            BillingContext::SaasFee => None,
            BillingContext::TenantApplication {
                tenant_application_id,
            } => Some(tenant_application_id.as_str()),
            BillingContext::GeneralExpense { reference } => reference.as_deref(),
        }
    }

    pub fn from_parts(kind: ContextKind, reference: Option<String>) -> Result<Self> {
        match kind {
            ContextKind::LeaseRent => {
                let lease_id = reference.ok_or_else(|| {
                    AppError::internal("invoice row: LEASE_RENT context without reference")
                })?;
                Ok(BillingContext::LeaseRent { lease_id })
            }
            ContextKind::Maintenance => {
                let maintenance_request_id = reference.ok_or_else(|| {
                    AppError::internal("invoice row: MAINTENANCE context without reference")
                })?;
                Ok(BillingContext::Maintenance {
                    maintenance_request_id,
                })
            }
            ContextKind::SaasFee => Ok(BillingContext::SaasFee),
            ContextKind::TenantApplication => {
                let tenant_application_id = reference.ok_or_else(|| {
                    AppError::internal("invoice row: TENANT_APPLICATION context without reference")
                })?;
                Ok(BillingContext::TenantApplication {
                    tenant_application_id,
                })
            }
            ContextKind::GeneralExpense => Ok(BillingContext::GeneralExpense { reference }),
        }
    }
}

/// A bill owed by a payer to a payee
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    /// Unique invoice ID (UUID)
    pub id: String,

    /// Unique human-readable code, `INV-{YY}{MM}-{6 alnum}`
    pub code: String,

    pub payer: Payer,
    pub payee: Payee,
    pub context: BillingContext,

    /// Total owed, integer minor units
    pub total_amount: i64,

    /// Tax portion of the total, integer minor units
    pub taxes: i64,

    /// `total_amount - taxes`; enforced at creation, not by the database
    pub sub_total: i64,

    pub currency: Currency,
    pub status: InvoiceStatus,

    /// Rails this specific invoice accepts; persisted as an array but an
    /// unordered set to consumers
    pub allowed_payment_rails: Vec<PaymentRail>,

    pub due_date: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Populated on request; not stored on the invoice row
    pub line_items: Vec<InvoiceLineItem>,
}

impl Invoice {
    pub fn is_active(&self) -> bool {
        self.status != InvoiceStatus::Void
    }

    pub fn allows_rail(&self, rail: PaymentRail) -> bool {
        self.allowed_payment_rails.contains(&rail)
    }

    /// Apply a status transition, stamping the matching lifecycle timestamp
    pub fn transition_to(&mut self, next: InvoiceStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::bad_request_with(
                format!("invalid status transition from {} to {}", self.status, next),
                serde_json::json!({ "from": self.status, "to": next }),
            ));
        }

        let now = Utc::now();
        match next {
            InvoiceStatus::Issued => self.issued_at = Some(now),
            InvoiceStatus::Paid => self.paid_at = Some(now),
            InvoiceStatus::Void => self.voided_at = Some(now),
            InvoiceStatus::Draft | InvoiceStatus::PartiallyPaid => {}
        }

        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

/// Filter set for invoice list/count queries
///
/// Built by callers (controllers, sibling services); list and count share
/// the same filter so result sets and totals always agree.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub payer_type: Option<PayerKind>,
    pub payee_type: Option<PayeeKind>,
    pub context_type: Option<ContextKind>,
    pub client_id: Option<String>,
    pub property_id: Option<String>,
    pub tenant_id: Option<String>,
    pub tenant_application_id: Option<String>,
    pub status: Option<InvoiceStatus>,
    /// Derived predicate: `true` => status != VOID, `false` => status = VOID
    pub active: Option<bool>,
    /// Free-text search over the invoice code
    pub search: Option<String>,
    /// Explicit ID allow-list; empty means no restriction
    pub ids: Vec<String>,
    pub created: DateRange,
    pub pagination: Pagination,
    pub order: SortOrder,
}
