use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::core::query::{Pagination, SortOrder};
use crate::core::PaymentRail;
use crate::modules::payment_accounts::models::{
    AccountStatus, CreatePaymentAccountRequest, OwnerKind, PaymentAccountFilter,
    UpdatePaymentAccountRequest,
};
use crate::modules::payment_accounts::services::PaymentAccountService;

/// Query parameters for listing/counting payment accounts
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    pub owner_type: Option<OwnerKind>,
    pub client_id: Option<String>,
    pub rail: Option<PaymentRail>,
    pub provider: Option<String>,
    pub is_default: Option<bool>,
    pub status: Option<AccountStatus>,
    #[serde(default)]
    pub include_system: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<SortOrder>,
}

impl ListAccountsQuery {
    fn into_filter(self) -> PaymentAccountFilter {
        PaymentAccountFilter {
            owner_type: self.owner_type,
            client_id: self.client_id,
            rail: self.rail,
            provider: self.provider,
            is_default: self.is_default,
            status: self.status,
            include_system: self.include_system,
            pagination: Pagination {
                limit: self.limit,
                offset: self.offset,
            },
            order: self.order.unwrap_or_default(),
        }
    }
}

/// Create a payment account
/// POST /payment-accounts
pub async fn create_account(
    service: web::Data<Arc<PaymentAccountService>>,
    request: web::Json<CreatePaymentAccountRequest>,
) -> Result<HttpResponse, AppError> {
    let account = service.create_account(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(account))
}

/// Get payment account by ID
/// GET /payment-accounts/{id}
pub async fn get_account(
    service: web::Data<Arc<PaymentAccountService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let account = service.get_account(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account))
}

/// List payment accounts matching the filter
/// GET /payment-accounts
pub async fn list_accounts(
    service: web::Data<Arc<PaymentAccountService>>,
    query: web::Query<ListAccountsQuery>,
) -> Result<HttpResponse, AppError> {
    let accounts = service
        .list_accounts(&query.into_inner().into_filter())
        .await?;

    Ok(HttpResponse::Ok().json(accounts))
}

/// Count payment accounts matching the filter
/// GET /payment-accounts/count
pub async fn count_accounts(
    service: web::Data<Arc<PaymentAccountService>>,
    query: web::Query<ListAccountsQuery>,
) -> Result<HttpResponse, AppError> {
    let count = service
        .count_accounts(&query.into_inner().into_filter())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "count": count })))
}

/// Partially update a payment account
/// PATCH /payment-accounts/{id}
pub async fn update_account(
    service: web::Data<Arc<PaymentAccountService>>,
    path: web::Path<String>,
    request: web::Json<UpdatePaymentAccountRequest>,
) -> Result<HttpResponse, AppError> {
    let account = service
        .update_account(&path.into_inner(), request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(account))
}

/// Delete a payment account
/// DELETE /payment-accounts/{id}
pub async fn delete_account(
    service: web::Data<Arc<PaymentAccountService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete_account(&path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure payment account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payment-accounts")
            .route("", web::post().to(create_account))
            .route("", web::get().to(list_accounts))
            .route("/count", web::get().to(count_accounts))
            .route("/{id}", web::get().to(get_account))
            .route("/{id}", web::patch().to(update_account))
            .route("/{id}", web::delete().to(delete_account)),
    );
}
