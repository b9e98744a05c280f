pub mod invoices;
pub mod payment_accounts;
pub mod payments;
