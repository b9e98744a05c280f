pub mod payment_account_controller;

pub use payment_account_controller::configure;
