pub mod catalog;
pub mod invoices;

pub use catalog::{ClientListResponse, ProductListResponse};
pub use invoices::{
    CreateInvoiceItemRequest, CreateInvoiceRequest, InvoiceItemResponse, InvoiceListResponse,
    InvoiceResponse, InvoiceSummary,
};
