use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentloop_billing::config::Config;
use rentloop_billing::middleware::RequestId;
use rentloop_billing::modules::invoices::{self, InvoiceRepository, InvoiceService};
use rentloop_billing::modules::payment_accounts::{
    self, PaymentAccountRepository, PaymentAccountService,
};
use rentloop_billing::modules::payments::{self, PaymentRepository, PaymentService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentloop_billing=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting Rentloop Billing");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Repositories
    let invoice_repo = Arc::new(InvoiceRepository::new(db_pool.clone()));
    let account_repo = Arc::new(PaymentAccountRepository::new(db_pool.clone()));
    let payment_repo = Arc::new(PaymentRepository::new(db_pool.clone()));

    // Services
    let invoice_service = Arc::new(InvoiceService::new(
        invoice_repo.clone(),
        config.app.code_max_attempts,
    ));
    let account_service = Arc::new(PaymentAccountService::new(account_repo.clone()));
    let payment_service = Arc::new(PaymentService::new(
        payment_repo.clone(),
        account_repo.clone(),
    ));

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let workers = config.server.workers;
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestId)
            .app_data(web::Data::new(invoice_service.clone()))
            .app_data(web::Data::new(account_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api/v1")
                    .configure(invoices::controllers::configure)
                    .configure(payment_accounts::controllers::configure)
                    .configure(payments::controllers::configure),
            )
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "rentloop-billing"
    }))
}
