// A payment account is a named settlement destination: a client's
// mobile-money number or bank account, the platform's own account, or the
// owner-less SYSTEM placeholder that offline/cash settlements run through.
//
// Invariant: for a given client, at most one account has `is_default = true`.
// The service maintains it transactionally (unset-all-then-set-one); it is
// not a database constraint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::query::{Pagination, SortOrder};
use crate::core::{AppError, PaymentRail, Result};

/// Who the account belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountOwner {
    /// A landlord/property-owner client
    Client { client_id: String },
    /// The platform itself
    Rentloop,
    /// Owner-less; holds the shared offline/cash account
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerKind {
    Client,
    Rentloop,
    System,
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerKind::Client => write!(f, "CLIENT"),
            OwnerKind::Rentloop => write!(f, "RENTLOOP"),
            OwnerKind::System => write!(f, "SYSTEM"),
        }
    }
}

impl std::str::FromStr for OwnerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CLIENT" => Ok(OwnerKind::Client),
            "RENTLOOP" => Ok(OwnerKind::Rentloop),
            "SYSTEM" => Ok(OwnerKind::System),
            _ => Err(format!("Invalid account owner type: {}", s)),
        }
    }
}

impl AccountOwner {
    pub fn kind(&self) -> OwnerKind {
        match self {
            AccountOwner::Client { .. } => OwnerKind::Client,
            AccountOwner::Rentloop => OwnerKind::Rentloop,
            AccountOwner::System => OwnerKind::System,
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            AccountOwner::Client { client_id } => Some(client_id.as_str()),
            AccountOwner::Rentloop | AccountOwner::System => None,
        }
    }

    pub fn from_parts(kind: OwnerKind, client_id: Option<String>) -> Result<Self> {
        match kind {
            OwnerKind::Client => {
                let client_id = client_id.ok_or_else(|| {
                    AppError::internal("payment account row: CLIENT owner without client_id")
                })?;
                Ok(AccountOwner::Client { client_id })
            }
            OwnerKind::Rentloop => Ok(AccountOwner::Rentloop),
            OwnerKind::System => Ok(AccountOwner::System),
        }
    }
}

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Disabled,
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Active
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "ACTIVE"),
            AccountStatus::Disabled => write!(f, "DISABLED"),
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            "DISABLED" => Ok(AccountStatus::Disabled),
            _ => Err(format!("Invalid account status: {}", s)),
        }
    }
}

/// A settlement destination
#[derive(Debug, Clone, Serialize)]
pub struct PaymentAccount {
    /// Unique account ID (UUID)
    pub id: String,

    pub owner: AccountOwner,
    pub rail: PaymentRail,

    /// Settlement provider (MTN, Vodafone, a bank, a card processor)
    pub provider: Option<String>,

    /// Phone number, account number or processor reference
    pub identifier: Option<String>,

    /// Free-form JSON object
    pub metadata: Option<serde_json::Value>,

    /// Preferred account for the owning client; at most one per client
    pub is_default: bool,

    pub status: AccountStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Point-in-time snapshot embedded in each payment's metadata, so later
    /// account edits never retroactively alter historical payment records.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "payment_account_id": self.id,
            "owner_type": self.owner.kind(),
            "rail": self.rail,
            "provider": self.provider,
            "identifier": self.identifier,
        })
    }
}

/// Input for account creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentAccountRequest {
    pub owner: AccountOwner,
    pub rail: PaymentRail,
    pub provider: Option<String>,
    pub identifier: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial update; absent fields are left unchanged. Owner and rail are
/// immutable after creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePaymentAccountRequest {
    pub provider: Option<String>,
    pub identifier: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub is_default: Option<bool>,
    pub status: Option<AccountStatus>,
}

/// Filter set for account list/count queries
#[derive(Debug, Clone, Default)]
pub struct PaymentAccountFilter {
    pub owner_type: Option<OwnerKind>,
    pub client_id: Option<String>,
    pub rail: Option<PaymentRail>,
    pub provider: Option<String>,
    pub is_default: Option<bool>,
    pub status: Option<AccountStatus>,
    /// When filtering by client, also include the owner-less SYSTEM
    /// offline account alongside the client's own accounts
    pub include_system: bool,
    pub pagination: Pagination,
    pub order: SortOrder,
}
