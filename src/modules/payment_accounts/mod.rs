// Payment accounts module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{AccountOwner, AccountStatus, PaymentAccount};
pub use repositories::PaymentAccountRepository;
pub use services::PaymentAccountService;
