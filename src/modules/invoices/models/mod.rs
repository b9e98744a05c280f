mod invoice;
mod line_item;
mod requests;

pub use invoice::{
    BillingContext, ContextKind, Invoice, InvoiceFilter, InvoiceStatus, Payee, PayeeKind, Payer,
    PayerKind,
};
pub use line_item::{InvoiceLineItem, LineItemInput};
pub use requests::{CreateInvoiceRequest, UpdateInvoiceRequest};
