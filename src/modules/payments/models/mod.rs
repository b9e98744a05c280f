pub mod payment;

pub use payment::{CreateOfflinePaymentRequest, Payment, PaymentStatus};
