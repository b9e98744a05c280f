use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::core::query::{DateRange, Pagination, SortOrder};
use crate::modules::invoices::models::{
    ContextKind, CreateInvoiceRequest, InvoiceFilter, InvoiceStatus, LineItemInput, PayeeKind,
    PayerKind, UpdateInvoiceRequest,
};
use crate::modules::invoices::services::InvoiceService;

/// Query parameters for listing/counting invoices
#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub payer_type: Option<PayerKind>,
    pub payee_type: Option<PayeeKind>,
    pub context_type: Option<ContextKind>,
    pub client_id: Option<String>,
    pub property_id: Option<String>,
    pub tenant_id: Option<String>,
    pub tenant_application_id: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub active: Option<bool>,
    pub search: Option<String>,
    /// Comma-separated ID allow-list
    pub ids: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<SortOrder>,
}

impl ListInvoicesQuery {
    fn into_filter(self) -> InvoiceFilter {
        InvoiceFilter {
            payer_type: self.payer_type,
            payee_type: self.payee_type,
            context_type: self.context_type,
            client_id: self.client_id,
            property_id: self.property_id,
            tenant_id: self.tenant_id,
            tenant_application_id: self.tenant_application_id,
            status: self.status,
            active: self.active,
            search: self.search,
            ids: self
                .ids
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            created: DateRange {
                from: self.created_from,
                to: self.created_to,
            },
            pagination: Pagination {
                limit: self.limit,
                offset: self.offset,
            },
            order: self.order.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GetInvoiceQuery {
    #[serde(default)]
    pub include_line_items: bool,
}

/// Create a new invoice
/// POST /invoices
pub async fn create_invoice(
    service: web::Data<Arc<InvoiceService>>,
    request: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service.create_invoice(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(invoice))
}

/// Get invoice by ID
/// GET /invoices/{id}
pub async fn get_invoice(
    service: web::Data<Arc<InvoiceService>>,
    path: web::Path<String>,
    query: web::Query<GetInvoiceQuery>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .get_invoice(&path.into_inner(), query.include_line_items)
        .await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// List invoices matching the filter
/// GET /invoices
pub async fn list_invoices(
    service: web::Data<Arc<InvoiceService>>,
    query: web::Query<ListInvoicesQuery>,
) -> Result<HttpResponse, AppError> {
    let invoices = service
        .list_invoices(&query.into_inner().into_filter())
        .await?;

    Ok(HttpResponse::Ok().json(invoices))
}

/// Count invoices matching the filter
/// GET /invoices/count
pub async fn count_invoices(
    service: web::Data<Arc<InvoiceService>>,
    query: web::Query<ListInvoicesQuery>,
) -> Result<HttpResponse, AppError> {
    let count = service
        .count_invoices(&query.into_inner().into_filter())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "count": count })))
}

/// Partially update an invoice
/// PATCH /invoices/{id}
pub async fn update_invoice(
    service: web::Data<Arc<InvoiceService>>,
    path: web::Path<String>,
    request: web::Json<UpdateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let invoice = service
        .update_invoice(&path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(invoice))
}

/// Attach a line item to an invoice
/// POST /invoices/{id}/line-items
pub async fn add_line_item(
    service: web::Data<Arc<InvoiceService>>,
    path: web::Path<String>,
    request: web::Json<LineItemInput>,
) -> Result<HttpResponse, AppError> {
    let line_item = service
        .add_line_item(&path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(line_item))
}

/// List an invoice's line items
/// GET /invoices/{id}/line-items
pub async fn get_line_items(
    service: web::Data<Arc<InvoiceService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let line_items = service.get_line_items(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(line_items))
}

/// Configure invoice routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invoices")
            .route("", web::post().to(create_invoice))
            .route("", web::get().to(list_invoices))
            .route("/count", web::get().to(count_invoices))
            .route("/{id}", web::get().to(get_invoice))
            .route("/{id}", web::patch().to(update_invoice))
            .route("/{id}/line-items", web::post().to(add_line_item))
            .route("/{id}/line-items", web::get().to(get_line_items)),
    );
}
