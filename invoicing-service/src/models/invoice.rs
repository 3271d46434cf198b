//! Invoice model for invoicing-service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Invoice header as stored in `invoices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub invoice_no: String,
    pub issue_date: String,
    pub due_date: String,
    pub client_id: i64,
    pub address: Option<String>,
    pub tax: f64,
    pub total: f64,
}

/// Invoice line joined with the product's current name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Invoice header together with its lines.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceWithItems {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub invoice_no: Option<String>,
    pub issue_date: String,
    pub due_date: String,
    pub client_id: i64,
    pub address: Option<String>,
    pub tax: f64,
    pub items: Vec<CreateInvoiceItem>,
}

/// Requested line on a new invoice.
#[derive(Debug, Clone, Copy)]
pub struct CreateInvoiceItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// A requested line after its product has been resolved and priced.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

impl PricedLine {
    /// Price a line from a snapshot of the product's current unit price.
    pub fn new(product_id: i64, product_name: String, quantity: i64, unit_price: f64) -> Self {
        Self {
            product_id,
            product_name,
            quantity,
            unit_price,
            line_total: line_total(unit_price, quantity),
        }
    }
}

pub fn line_total(unit_price: f64, quantity: i64) -> f64 {
    unit_price * quantity as f64
}

/// Sum of line totals plus tax.
pub fn invoice_total(lines: &[PricedLine], tax: f64) -> f64 {
    let subtotal = lines.iter().fold(0.0, |acc, line| acc + line.line_total);
    subtotal + tax
}

/// Next invoice number given how many invoices exist, e.g. `INV-00005` after four.
pub fn generate_invoice_no(existing: i64) -> String {
    format!("INV-{:05}", existing + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_numbers_are_zero_padded() {
        assert_eq!(generate_invoice_no(0), "INV-00001");
        assert_eq!(generate_invoice_no(4), "INV-00005");
        assert_eq!(generate_invoice_no(99_999), "INV-100000");
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let line = PricedLine::new(2, "Widget B".into(), 3, 15.5);
        assert_eq!(line.line_total, 46.5);
    }

    #[test]
    fn invoice_total_adds_tax_to_line_sum() {
        let lines = vec![
            PricedLine::new(1, "Widget A".into(), 2, 10.0),
            PricedLine::new(3, "Service C".into(), 1, 50.0),
        ];
        assert_eq!(invoice_total(&lines, 5.0), 75.0);
    }

    #[test]
    fn invoice_total_of_no_lines_is_tax() {
        assert_eq!(invoice_total(&[], 7.25), 7.25);
    }
}
