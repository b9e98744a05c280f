//! Rentloop billing ledger.
//!
//! Invoices, line items, payment accounts and offline payment intake for the
//! Rentloop property-management platform. Amounts are integer minor units in
//! a single currency per invoice; verification and settlement of recorded
//! payments happen in external collaborators.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

pub use crate::core::error::{AppError, Result};
