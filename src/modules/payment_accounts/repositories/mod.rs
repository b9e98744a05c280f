pub mod payment_account_repository;

pub use payment_account_repository::PaymentAccountRepository;
