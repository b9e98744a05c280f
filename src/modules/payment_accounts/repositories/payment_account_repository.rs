// MySQL persistence for payment accounts, including the bulk
// "unset default for all accounts of a client except one" update that backs
// the default-exclusivity invariant.

use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};

use crate::core::{AppError, Result};
use crate::modules::payment_accounts::models::{
    AccountOwner, PaymentAccount, PaymentAccountFilter,
};

const ACCOUNT_COLUMNS: &str = "id, owner_type, client_id, rail, provider, identifier, \
     metadata, is_default, status, created_at, updated_at";

/// Repository for payment account database operations
pub struct PaymentAccountRepository {
    pool: MySqlPool,
}

impl PaymentAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Insert an account within the caller's transaction
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        account: &PaymentAccount,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_accounts (
                id, owner_type, client_id, rail, provider, identifier,
                metadata, is_default, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(account.owner.kind().to_string())
        .bind(account.owner.client_id())
        .bind(account.rail.to_string())
        .bind(&account.provider)
        .bind(&account.identifier)
        .bind(&account.metadata)
        .bind(account.is_default)
        .bind(account.status.to_string())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create payment account: {}", e)))?;

        Ok(())
    }

    /// Persist the mutable fields of an account within the caller's transaction
    pub async fn save_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        account: &PaymentAccount,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE payment_accounts
            SET provider = ?, identifier = ?, metadata = ?, is_default = ?,
                status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&account.provider)
        .bind(&account.identifier)
        .bind(&account.metadata)
        .bind(account.is_default)
        .bind(account.status.to_string())
        .bind(account.updated_at)
        .bind(&account.id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::internal(format!("Failed to update payment account: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Payment account with id '{}' not found",
                account.id
            )));
        }

        Ok(())
    }

    /// Clear the default flag on every account of a client, optionally
    /// sparing one account ID.
    ///
    /// Runs inside the caller's transaction; the bulk UPDATE takes row locks
    /// on all of the client's accounts, so concurrent default-toggles for
    /// the same client serialize on each other.
    pub async fn unset_defaults_for_client(
        &self,
        tx: &mut Transaction<'_, MySql>,
        client_id: &str,
        except_id: Option<&str>,
    ) -> Result<u64> {
        let result = match except_id {
            Some(except_id) => sqlx::query(
                "UPDATE payment_accounts SET is_default = FALSE, updated_at = ? \
                 WHERE client_id = ? AND id != ?",
            )
            .bind(Utc::now())
            .bind(client_id)
            .bind(except_id)
            .execute(&mut **tx)
            .await,
            None => sqlx::query(
                "UPDATE payment_accounts SET is_default = FALSE, updated_at = ? \
                 WHERE client_id = ?",
            )
            .bind(Utc::now())
            .bind(client_id)
            .execute(&mut **tx)
            .await,
        }
        .map_err(|e| AppError::internal(format!("Failed to unset default accounts: {}", e)))?;

        Ok(result.rows_affected())
    }

    /// Find account by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<PaymentAccount>> {
        let row = sqlx::query_as::<_, PaymentAccountRow>(&format!(
            "SELECT {} FROM payment_accounts WHERE id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to fetch payment account: {}", e)))?;

        row.map(PaymentAccountRow::into_account).transpose()
    }

    /// Find account by ID with a row lock, inside the caller's transaction
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, MySql>,
        id: &str,
    ) -> Result<Option<PaymentAccount>> {
        let row = sqlx::query_as::<_, PaymentAccountRow>(&format!(
            "SELECT {} FROM payment_accounts WHERE id = ? FOR UPDATE",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::internal(format!("Failed to lock payment account: {}", e)))?;

        row.map(PaymentAccountRow::into_account).transpose()
    }

    /// List accounts matching the filter
    pub async fn list(&self, filter: &PaymentAccountFilter) -> Result<Vec<PaymentAccount>> {
        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM payment_accounts WHERE 1 = 1",
            ACCOUNT_COLUMNS
        ));
        apply_filter(&mut qb, filter);

        qb.push(" ORDER BY created_at ");
        qb.push(filter.order.as_sql());
        filter.pagination.apply(&mut qb);

        let rows = qb
            .build_query_as::<PaymentAccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to list payment accounts: {}", e)))?;

        rows.into_iter()
            .map(PaymentAccountRow::into_account)
            .collect()
    }

    /// Count accounts matching the filter (pagination ignored)
    pub async fn count(&self, filter: &PaymentAccountFilter) -> Result<i64> {
        let mut qb: QueryBuilder<'_, MySql> =
            QueryBuilder::new("SELECT COUNT(*) FROM payment_accounts WHERE 1 = 1");
        apply_filter(&mut qb, filter);

        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to count payment accounts: {}", e)))?;

        Ok(count)
    }

    /// Delete an account by ID
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM payment_accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to delete payment account: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Payment account with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}

/// Shared predicate builder for list/count
fn apply_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &PaymentAccountFilter) {
    if let Some(owner_type) = filter.owner_type {
        qb.push(" AND owner_type = ");
        qb.push_bind(owner_type.to_string());
    }
    if let Some(client_id) = &filter.client_id {
        // The SYSTEM-owned offline account may appear alongside a client's
        // own accounts when the caller asks for it.
        if filter.include_system {
            qb.push(" AND (client_id = ");
            qb.push_bind(client_id.clone());
            qb.push(" OR owner_type = 'SYSTEM')");
        } else {
            qb.push(" AND client_id = ");
            qb.push_bind(client_id.clone());
        }
    }
    if let Some(rail) = filter.rail {
        qb.push(" AND rail = ");
        qb.push_bind(rail.to_string());
    }
    if let Some(provider) = &filter.provider {
        qb.push(" AND provider = ");
        qb.push_bind(provider.clone());
    }
    if let Some(is_default) = filter.is_default {
        qb.push(" AND is_default = ");
        qb.push_bind(is_default);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status.to_string());
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct PaymentAccountRow {
    id: String,
    owner_type: String,
    client_id: Option<String>,
    rail: String,
    provider: Option<String>,
    identifier: Option<String>,
    metadata: Option<serde_json::Value>,
    is_default: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentAccountRow {
    fn into_account(self) -> Result<PaymentAccount> {
        let owner_kind = self
            .owner_type
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid owner type in database: {}", e)))?;
        let owner = AccountOwner::from_parts(owner_kind, self.client_id)?;

        let rail = self
            .rail
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid payment rail in database: {}", e)))?;
        let status = self
            .status
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid account status in database: {}", e)))?;

        Ok(PaymentAccount {
            id: self.id,
            owner,
            rail,
            provider: self.provider,
            identifier: self.identifier,
            metadata: self.metadata,
            is_default: self.is_default,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PaymentRail;
    use crate::modules::payment_accounts::models::OwnerKind;

    fn sql_for(filter: &PaymentAccountFilter) -> String {
        let mut qb: QueryBuilder<'_, MySql> =
            QueryBuilder::new("SELECT COUNT(*) FROM payment_accounts WHERE 1 = 1");
        apply_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_client_filter_without_system() {
        let sql = sql_for(&PaymentAccountFilter {
            client_id: Some("cli-1".to_string()),
            ..Default::default()
        });
        assert!(sql.contains("client_id = ?"));
        assert!(!sql.contains("SYSTEM"));
    }

    #[test]
    fn test_client_filter_with_system_allowance() {
        let sql = sql_for(&PaymentAccountFilter {
            client_id: Some("cli-1".to_string()),
            include_system: true,
            ..Default::default()
        });
        assert!(sql.contains("(client_id = ? OR owner_type = 'SYSTEM')"));
    }

    #[test]
    fn test_full_filter() {
        let sql = sql_for(&PaymentAccountFilter {
            owner_type: Some(OwnerKind::Client),
            rail: Some(PaymentRail::Momo),
            provider: Some("MTN".to_string()),
            is_default: Some(true),
            ..Default::default()
        });
        assert!(sql.contains("owner_type = ?"));
        assert!(sql.contains("rail = ?"));
        assert!(sql.contains("provider = ?"));
        assert!(sql.contains("is_default = ?"));
    }
}
