pub mod payment_account_service;

pub use payment_account_service::PaymentAccountService;
