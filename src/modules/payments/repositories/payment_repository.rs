// MySQL persistence for payments. The balance aggregate runs on the caller's
// transaction so it observes the same snapshot as the locked invoice row.

use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};

use crate::core::{AppError, Result};
use crate::modules::payments::models::{Payment, PaymentStatus};

const PAYMENT_COLUMNS: &str = "id, invoice_id, payment_account_id, rail, provider, amount, \
     currency, reference, status, successful_at, failed_at, metadata, created_at, updated_at";

/// Repository for payment database operations
pub struct PaymentRepository {
    pool: MySqlPool,
}

impl PaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Insert a payment within the caller's transaction
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        payment: &Payment,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, invoice_id, payment_account_id, rail, provider, amount, currency,
                reference, status, successful_at, failed_at, metadata, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.invoice_id)
        .bind(&payment.payment_account_id)
        .bind(payment.rail.to_string())
        .bind(&payment.provider)
        .bind(payment.amount)
        .bind(payment.currency.to_string())
        .bind(&payment.reference)
        .bind(payment.status.to_string())
        .bind(payment.successful_at)
        .bind(payment.failed_at)
        .bind(&payment.metadata)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create payment: {}", e)))?;

        Ok(())
    }

    /// Find payment by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to fetch payment: {}", e)))?;

        row.map(PaymentRow::into_payment).transpose()
    }

    /// All payments recorded against an invoice, oldest first
    pub async fn find_by_invoice(&self, invoice_id: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE invoice_id = ? ORDER BY created_at ASC",
            PAYMENT_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to list payments: {}", e)))?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }

    /// Sum of payment amounts for an invoice across the given statuses,
    /// inside the caller's transaction.
    pub async fn sum_amount_by_invoice(
        tx: &mut Transaction<'_, MySql>,
        invoice_id: &str,
        statuses: &[PaymentStatus],
    ) -> Result<i64> {
        if statuses.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(
            "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE invoice_id = ",
        );
        qb.push_bind(invoice_id);
        qb.push(" AND status IN (");
        let mut separated = qb.separated(", ");
        for status in statuses {
            separated.push_bind(status.to_string());
        }
        qb.push(")");

        let (total,): (i64,) = qb
            .build_query_as()
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| AppError::internal(format!("Failed to sum payments: {}", e)))?;

        Ok(total)
    }
}

// Helper struct for database mapping

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: String,
    invoice_id: String,
    payment_account_id: String,
    rail: String,
    provider: Option<String>,
    amount: i64,
    currency: String,
    reference: Option<String>,
    status: String,
    successful_at: Option<DateTime<Utc>>,
    failed_at: Option<DateTime<Utc>>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment> {
        let rail = self
            .rail
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid payment rail in database: {}", e)))?;
        let currency = self
            .currency
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid currency in database: {}", e)))?;
        let status = self
            .status
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid payment status in database: {}", e)))?;

        Ok(Payment {
            id: self.id,
            invoice_id: self.invoice_id,
            payment_account_id: self.payment_account_id,
            rail,
            provider: self.provider,
            amount: self.amount,
            currency,
            reference: self.reference,
            status,
            successful_at: self.successful_at,
            failed_at: self.failed_at,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
