pub mod code;
pub mod currency;
pub mod error;
pub mod metadata;
pub mod query;
pub mod rail;

pub use currency::Currency;
pub use error::{AppError, Result};
pub use rail::PaymentRail;
