// Payment account management.
//
// The default-exclusivity invariant lives here: whenever an account is
// created or updated with `is_default = true`, every other default for the
// same client is cleared in the same transaction.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::metadata::ensure_object;
use crate::core::{AppError, Result};
use crate::modules::payment_accounts::models::{
    AccountOwner, AccountStatus, CreatePaymentAccountRequest, PaymentAccount,
    PaymentAccountFilter, UpdatePaymentAccountRequest,
};
use crate::modules::payment_accounts::repositories::PaymentAccountRepository;

/// Service for payment account business logic
pub struct PaymentAccountService {
    account_repo: Arc<PaymentAccountRepository>,
}

impl PaymentAccountService {
    pub fn new(account_repo: Arc<PaymentAccountRepository>) -> Self {
        Self { account_repo }
    }

    /// Create a payment account.
    ///
    /// Only client-owned accounts can be defaults; RENTLOOP and SYSTEM
    /// accounts have no client to be the default for.
    pub async fn create_account(
        &self,
        request: CreatePaymentAccountRequest,
    ) -> Result<PaymentAccount> {
        ensure_object("metadata", request.metadata.as_ref())?;

        // A fresh account holds no flag yet
        let handover = default_handover(&request.owner, false, request.is_default)?;

        let now = Utc::now();
        let account = PaymentAccount {
            id: Uuid::new_v4().to_string(),
            owner: request.owner,
            rail: request.rail,
            provider: request.provider,
            identifier: request.identifier,
            metadata: request.metadata,
            is_default: request.is_default,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.account_repo.pool().begin().await?;

        if let Some(client_id) = &handover {
            let cleared = self
                .account_repo
                .unset_defaults_for_client(&mut tx, client_id, None)
                .await?;
            if cleared > 0 {
                tracing::debug!(client_id = %client_id, cleared, "cleared previous default accounts");
            }
        }

        self.account_repo.create_with_tx(&mut tx, &account).await?;
        tx.commit().await?;

        tracing::info!(
            account_id = %account.id,
            rail = %account.rail,
            is_default = account.is_default,
            "payment account created"
        );

        Ok(account)
    }

    /// Apply a partial update. Owner and rail are immutable.
    pub async fn update_account(
        &self,
        id: &str,
        request: UpdatePaymentAccountRequest,
    ) -> Result<PaymentAccount> {
        ensure_object("metadata", request.metadata.as_ref())?;

        let mut tx = self.account_repo.pool().begin().await?;

        let mut account = PaymentAccountRepository::find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Payment account with id '{}' not found", id))
            })?;

        if let Some(provider) = request.provider {
            account.provider = Some(provider);
        }
        if let Some(identifier) = request.identifier {
            account.identifier = Some(identifier);
        }
        if let Some(metadata) = request.metadata {
            account.metadata = Some(metadata);
        }
        if let Some(status) = request.status {
            account.status = status;
        }

        if let Some(is_default) = request.is_default {
            if let Some(client_id) =
                default_handover(&account.owner, account.is_default, is_default)?
            {
                self.account_repo
                    .unset_defaults_for_client(&mut tx, &client_id, Some(&account.id))
                    .await?;
            }
            account.is_default = is_default;
        }

        account.updated_at = Utc::now();
        self.account_repo.save_with_tx(&mut tx, &account).await?;
        tx.commit().await?;

        tracing::info!(account_id = %account.id, "payment account updated");

        Ok(account)
    }

    /// Fetch a single account
    pub async fn get_account(&self, id: &str) -> Result<PaymentAccount> {
        self.account_repo.find_by_id(id).await?.ok_or_else(|| {
            AppError::not_found(format!("Payment account with id '{}' not found", id))
        })
    }

    /// List accounts matching the filter
    pub async fn list_accounts(
        &self,
        filter: &PaymentAccountFilter,
    ) -> Result<Vec<PaymentAccount>> {
        self.account_repo.list(filter).await
    }

    /// Count accounts matching the filter
    pub async fn count_accounts(&self, filter: &PaymentAccountFilter) -> Result<i64> {
        self.account_repo.count(filter).await
    }

    /// Delete an account
    pub async fn delete_account(&self, id: &str) -> Result<()> {
        self.account_repo.delete(id).await?;
        tracing::info!(account_id = %id, "payment account deleted");
        Ok(())
    }
}

/// Decide what a default-flag change means for the rest of the client's
/// accounts.
///
/// Returns the client whose other accounts must lose their flag before the
/// target account is saved, or `None` when no bulk unset is needed (flag not
/// requested, or the account already holds it). Non-client owners can never
/// take the flag.
pub fn default_handover(
    owner: &AccountOwner,
    currently_default: bool,
    requested_default: bool,
) -> Result<Option<String>> {
    if !requested_default {
        return Ok(None);
    }

    let Some(client_id) = owner.client_id() else {
        return Err(AppError::bad_request(
            "only client-owned accounts can be marked as default",
        ));
    };

    if currently_default {
        return Ok(None);
    }

    Ok(Some(client_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PaymentRail;

    #[test]
    fn test_default_requires_client_owner() {
        for owner in [AccountOwner::Rentloop, AccountOwner::System] {
            let result = default_handover(&owner, false, true);
            assert!(matches!(result, Err(AppError::BadRequest { .. })));
        }
    }

    #[test]
    fn test_handover_names_the_client() {
        let owner = AccountOwner::Client {
            client_id: "cli-1".to_string(),
        };
        let handover = default_handover(&owner, false, true).unwrap();
        assert_eq!(handover.as_deref(), Some("cli-1"));
    }

    #[test]
    fn test_no_handover_when_flag_unchanged_or_cleared() {
        let owner = AccountOwner::Client {
            client_id: "cli-1".to_string(),
        };
        // Already the default: nothing to unset
        assert_eq!(default_handover(&owner, true, true).unwrap(), None);
        // Clearing the flag never touches siblings, for any owner
        assert_eq!(default_handover(&owner, true, false).unwrap(), None);
        assert_eq!(
            default_handover(&AccountOwner::System, false, false).unwrap(),
            None
        );
    }

    #[test]
    fn test_create_request_defaults() {
        let json = serde_json::json!({
            "owner": {"type": "SYSTEM"},
            "rail": "OFFLINE",
        });
        let request: CreatePaymentAccountRequest = serde_json::from_value(json).unwrap();
        assert!(!request.is_default);
        assert_eq!(request.rail, PaymentRail::Offline);
        assert_eq!(request.owner, AccountOwner::System);
    }
}
