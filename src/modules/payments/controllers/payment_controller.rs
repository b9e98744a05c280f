use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::payments::models::CreateOfflinePaymentRequest;
use crate::modules::payments::services::PaymentService;

/// Record an offline payment
/// POST /payments/offline
pub async fn create_offline_payment(
    service: web::Data<Arc<PaymentService>>,
    request: web::Json<CreateOfflinePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let payment = service.create_offline_payment(request.into_inner()).await?;

    Ok(HttpResponse::Created().json(payment))
}

/// Get payment by ID
/// GET /payments/{id}
pub async fn get_payment(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment = service.get_payment(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(payment))
}

/// List payments recorded against an invoice
/// GET /payments/invoice/{invoice_id}
pub async fn list_payments_for_invoice(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payments = service
        .list_payments_for_invoice(&path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(payments))
}

/// Configure payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/offline", web::post().to(create_offline_payment))
            .route("/invoice/{invoice_id}", web::get().to(list_payments_for_invoice))
            .route("/{id}", web::get().to(get_payment)),
    );
}
