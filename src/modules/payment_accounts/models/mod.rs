pub mod payment_account;

pub use payment_account::{
    AccountOwner, AccountStatus, CreatePaymentAccountRequest, OwnerKind, PaymentAccount,
    PaymentAccountFilter, UpdatePaymentAccountRequest,
};
