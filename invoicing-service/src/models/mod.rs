//! Domain models for invoicing-service.

mod catalog;
mod invoice;

pub use catalog::{Client, Product};
pub use invoice::{
    generate_invoice_no, invoice_total, line_total, CreateInvoice, CreateInvoiceItem, Invoice,
    InvoiceItem, InvoiceWithItems, PricedLine,
};
