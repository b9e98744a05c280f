// MySQL persistence for invoices and their line items.
//
// - Create invoice with line items (transactional)
// - Read by ID, optionally with line items, optionally FOR UPDATE
// - Filtered list/count sharing one predicate builder
// - Atomic full-row update
// - Code uniqueness probe for the generator's retry loop

use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};

use crate::core::query::{push_id_allow_list, push_search};
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{
    BillingContext, Invoice, InvoiceFilter, InvoiceLineItem, InvoiceStatus, Payee, Payer,
};

const INVOICE_COLUMNS: &str = "id, code, payer_type, payer_client_id, payer_property_id, \
     payer_tenant_id, payer_tenant_application_id, payee_type, payee_client_id, \
     context_type, context_ref, total_amount, taxes, sub_total, currency, status, \
     allowed_payment_rails, due_date, issued_at, paid_at, voided_at, created_at, updated_at";

const LINE_ITEM_COLUMNS: &str =
    "id, invoice_id, label, category, quantity, unit_amount, total_amount, metadata, \
     created_at, updated_at";

/// Repository for invoice database operations
pub struct InvoiceRepository {
    pool: MySqlPool,
}

impl InvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Create an invoice with its line items in one transaction
    pub async fn create(&self, invoice: &Invoice) -> Result<Invoice> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start transaction: {}", e)))?;

        self.create_with_tx(&mut tx, invoice).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::internal(format!("Failed to commit transaction: {}", e)))?;

        Ok(invoice.clone())
    }

    /// Create invoice within an existing transaction
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        invoice: &Invoice,
    ) -> Result<()> {
        let (client_id, property_id, tenant_id, tenant_application_id) = invoice.payer.parts();
        let rails = serde_json::to_value(&invoice.allowed_payment_rails)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, code, payer_type, payer_client_id, payer_property_id,
                payer_tenant_id, payer_tenant_application_id, payee_type, payee_client_id,
                context_type, context_ref, total_amount, taxes, sub_total, currency, status,
                allowed_payment_rails, due_date, issued_at, paid_at, voided_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.code)
        .bind(invoice.payer.kind().to_string())
        .bind(client_id)
        .bind(property_id)
        .bind(tenant_id)
        .bind(tenant_application_id)
        .bind(invoice.payee.kind().to_string())
        .bind(invoice.payee.client_id())
        .bind(invoice.context.kind().to_string())
        .bind(invoice.context.reference())
        .bind(invoice.total_amount)
        .bind(invoice.taxes)
        .bind(invoice.sub_total)
        .bind(invoice.currency.to_string())
        .bind(invoice.status.to_string())
        .bind(rails)
        .bind(invoice.due_date)
        .bind(invoice.issued_at)
        .bind(invoice.paid_at)
        .bind(invoice.voided_at)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::conflict(format!(
                        "Invoice with code '{}' already exists",
                        invoice.code
                    ));
                }
            }
            AppError::internal(format!("Failed to create invoice: {}", e))
        })?;

        for line_item in &invoice.line_items {
            self.insert_line_item_with_tx(tx, line_item).await?;
        }

        Ok(())
    }

    /// Insert one line item row
    pub async fn insert_line_item(&self, line_item: &InvoiceLineItem) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start transaction: {}", e)))?;

        self.insert_line_item_with_tx(&mut tx, line_item).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::internal(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    pub async fn insert_line_item_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        line_item: &InvoiceLineItem,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invoice_line_items (
                id, invoice_id, label, category, quantity, unit_amount, total_amount,
                metadata, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&line_item.id)
        .bind(&line_item.invoice_id)
        .bind(&line_item.label)
        .bind(&line_item.category)
        .bind(line_item.quantity)
        .bind(line_item.unit_amount)
        .bind(line_item.total_amount)
        .bind(&line_item.metadata)
        .bind(line_item.created_at)
        .bind(line_item.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create line item: {}", e)))?;

        Ok(())
    }

    /// Find invoice by ID, optionally populating line items
    pub async fn find_by_id(&self, id: &str, with_line_items: bool) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices WHERE id = ?",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to fetch invoice: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_items = if with_line_items {
            self.find_line_items(id).await?
        } else {
            vec![]
        };

        Ok(Some(row.into_invoice(line_items)?))
    }

    /// Find invoice by ID with a row lock, inside the caller's transaction.
    ///
    /// Serializes concurrent payment submissions against the same invoice;
    /// the lock is held until the transaction commits or rolls back.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, MySql>,
        id: &str,
    ) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices WHERE id = ? FOR UPDATE",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::internal(format!("Failed to lock invoice: {}", e)))?;

        row.map(|r| r.into_invoice(vec![])).transpose()
    }

    /// Fetch all line items for an invoice
    pub async fn find_line_items(&self, invoice_id: &str) -> Result<Vec<InvoiceLineItem>> {
        let rows = sqlx::query_as::<_, LineItemRow>(&format!(
            "SELECT {} FROM invoice_line_items WHERE invoice_id = ? ORDER BY created_at, id",
            LINE_ITEM_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to fetch line items: {}", e)))?;

        rows.into_iter().map(LineItemRow::into_line_item).collect()
    }

    /// List invoices matching the filter (line items omitted for list views)
    pub async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM invoices WHERE 1 = 1",
            INVOICE_COLUMNS
        ));
        apply_filter(&mut qb, filter);

        qb.push(" ORDER BY created_at ");
        qb.push(filter.order.as_sql());
        filter.pagination.apply(&mut qb);

        let rows = qb
            .build_query_as::<InvoiceRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to list invoices: {}", e)))?;

        rows.into_iter().map(|r| r.into_invoice(vec![])).collect()
    }

    /// Count invoices matching the filter (pagination ignored)
    pub async fn count(&self, filter: &InvoiceFilter) -> Result<i64> {
        let mut qb: QueryBuilder<'_, MySql> =
            QueryBuilder::new("SELECT COUNT(*) FROM invoices WHERE 1 = 1");
        apply_filter(&mut qb, filter);

        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to count invoices: {}", e)))?;

        Ok(count)
    }

    /// Persist the mutable fields of an invoice
    pub async fn update(&self, invoice: &Invoice) -> Result<()> {
        let rails = serde_json::to_value(&invoice.allowed_payment_rails)?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET total_amount = ?, taxes = ?, sub_total = ?, status = ?,
                allowed_payment_rails = ?, due_date = ?, issued_at = ?, paid_at = ?,
                voided_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(invoice.total_amount)
        .bind(invoice.taxes)
        .bind(invoice.sub_total)
        .bind(invoice.status.to_string())
        .bind(rails)
        .bind(invoice.due_date)
        .bind(invoice.issued_at)
        .bind(invoice.paid_at)
        .bind(invoice.voided_at)
        .bind(invoice.updated_at)
        .bind(&invoice.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to update invoice: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                invoice.id
            )));
        }

        Ok(())
    }

    /// Check if an invoice code is already taken
    pub async fn exists_by_code(&self, code: &str) -> Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM invoices WHERE code = ?")
                .bind(code)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::internal(format!("Failed to check invoice code: {}", e)))?;

        Ok(count > 0)
    }
}

/// Shared predicate builder for list/count
fn apply_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &InvoiceFilter) {
    if let Some(payer_type) = filter.payer_type {
        qb.push(" AND payer_type = ");
        qb.push_bind(payer_type.to_string());
    }
    if let Some(payee_type) = filter.payee_type {
        qb.push(" AND payee_type = ");
        qb.push_bind(payee_type.to_string());
    }
    if let Some(context_type) = filter.context_type {
        qb.push(" AND context_type = ");
        qb.push_bind(context_type.to_string());
    }
    if let Some(client_id) = &filter.client_id {
        qb.push(" AND (payer_client_id = ");
        qb.push_bind(client_id.clone());
        qb.push(" OR payee_client_id = ");
        qb.push_bind(client_id.clone());
        qb.push(")");
    }
    if let Some(property_id) = &filter.property_id {
        qb.push(" AND payer_property_id = ");
        qb.push_bind(property_id.clone());
    }
    if let Some(tenant_id) = &filter.tenant_id {
        qb.push(" AND payer_tenant_id = ");
        qb.push_bind(tenant_id.clone());
    }
    if let Some(tenant_application_id) = &filter.tenant_application_id {
        qb.push(" AND payer_tenant_application_id = ");
        qb.push_bind(tenant_application_id.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status.to_string());
    }
    // `active` is derived from status, not a column of its own
    match filter.active {
        Some(true) => {
            qb.push(" AND status != ");
            qb.push_bind(InvoiceStatus::Void.to_string());
        }
        Some(false) => {
            qb.push(" AND status = ");
            qb.push_bind(InvoiceStatus::Void.to_string());
        }
        None => {}
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        push_search(qb, &["code"], search);
    }
    if !filter.ids.is_empty() {
        push_id_allow_list(qb, "id", &filter.ids);
    }
    filter.created.apply(qb, "created_at");
}

// Helper structs for database mapping

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    code: String,
    payer_type: String,
    payer_client_id: Option<String>,
    payer_property_id: Option<String>,
    payer_tenant_id: Option<String>,
    payer_tenant_application_id: Option<String>,
    payee_type: String,
    payee_client_id: Option<String>,
    context_type: String,
    context_ref: Option<String>,
    total_amount: i64,
    taxes: i64,
    sub_total: i64,
    currency: String,
    status: String,
    allowed_payment_rails: serde_json::Value,
    due_date: Option<DateTime<Utc>>,
    issued_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    voided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self, line_items: Vec<InvoiceLineItem>) -> Result<Invoice> {
        let payer_kind = self
            .payer_type
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid payer type in database: {}", e)))?;
        let payer = Payer::from_parts(
            payer_kind,
            self.payer_client_id,
            self.payer_property_id,
            self.payer_tenant_id,
            self.payer_tenant_application_id,
        )?;

        let payee_kind = self
            .payee_type
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid payee type in database: {}", e)))?;
        let payee = Payee::from_parts(payee_kind, self.payee_client_id)?;

        let context_kind = self
            .context_type
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid context type in database: {}", e)))?;
        let context = BillingContext::from_parts(context_kind, self.context_ref)?;

        let currency = self
            .currency
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid currency in database: {}", e)))?;
        let status = self
            .status
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid invoice status in database: {}", e)))?;
        let allowed_payment_rails = serde_json::from_value(self.allowed_payment_rails)
            .map_err(|e| AppError::internal(format!("Invalid payment rails in database: {}", e)))?;

        Ok(Invoice {
            id: self.id,
            code: self.code,
            payer,
            payee,
            context,
            total_amount: self.total_amount,
            taxes: self.taxes,
            sub_total: self.sub_total,
            currency,
            status,
            allowed_payment_rails,
            due_date: self.due_date,
            issued_at: self.issued_at,
            paid_at: self.paid_at,
            voided_at: self.voided_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            line_items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    invoice_id: String,
    label: String,
    category: Option<String>,
    quantity: i32,
    unit_amount: i64,
    total_amount: i64,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LineItemRow {
    fn into_line_item(self) -> Result<InvoiceLineItem> {
        Ok(InvoiceLineItem {
            id: self.id,
            invoice_id: self.invoice_id,
            label: self.label,
            category: self.category,
            quantity: self.quantity,
            unit_amount: self.unit_amount,
            total_amount: self.total_amount,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::invoices::models::PayerKind;

    // Integration tests with an actual database live outside this crate's
    // unit suites; these cover the predicate builder.

    fn sql_for(filter: &InvoiceFilter) -> String {
        let mut qb: QueryBuilder<'_, MySql> =
            QueryBuilder::new("SELECT COUNT(*) FROM invoices WHERE 1 = 1");
        apply_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_adds_no_predicates() {
        let sql = sql_for(&InvoiceFilter::default());
        assert_eq!(sql, "SELECT COUNT(*) FROM invoices WHERE 1 = 1");
    }

    #[test]
    fn test_active_filter_is_derived_from_status() {
        let active = sql_for(&InvoiceFilter {
            active: Some(true),
            ..Default::default()
        });
        assert!(active.contains("status != ?"));

        let voided = sql_for(&InvoiceFilter {
            active: Some(false),
            ..Default::default()
        });
        assert!(voided.contains("status = ?"));
    }

    #[test]
    fn test_client_filter_covers_both_sides() {
        let sql = sql_for(&InvoiceFilter {
            client_id: Some("cli-1".to_string()),
            ..Default::default()
        });
        assert!(sql.contains("payer_client_id = ?"));
        assert!(sql.contains("payee_client_id = ?"));
    }

    #[test]
    fn test_combined_filter() {
        let sql = sql_for(&InvoiceFilter {
            payer_type: Some(PayerKind::Tenant),
            status: Some(InvoiceStatus::Issued),
            search: Some("INV-2601".to_string()),
            ids: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        });
        assert!(sql.contains("payer_type = ?"));
        assert!(sql.contains("status = ?"));
        assert!(sql.contains("code LIKE ?"));
        assert!(sql.contains("id IN (?, ?)"));
    }
}
