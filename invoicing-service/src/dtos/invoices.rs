use crate::models::{CreateInvoice, CreateInvoiceItem, Invoice, InvoiceItem, InvoiceWithItems};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest quantity whose `f64` conversion is exact.
pub const MAX_QUANTITY: i64 = 1 << 53;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvoiceItemRequest {
    pub product_id: i64,
    // max is MAX_QUANTITY
    #[validate(range(
        min = 1i64,
        max = 9007199254740992i64,
        message = "Quantity must be between 1 and 2^53"
    ))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[serde(default)]
    pub invoice_no: Option<String>,
    pub issue_date: String,
    pub due_date: String,
    pub client_id: i64,
    #[serde(default)]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<CreateInvoiceItemRequest>,
    #[serde(default)]
    pub tax: f64,
}

impl From<CreateInvoiceRequest> for CreateInvoice {
    fn from(req: CreateInvoiceRequest) -> Self {
        Self {
            invoice_no: req.invoice_no,
            issue_date: req.issue_date,
            due_date: req.due_date,
            client_id: req.client_id,
            address: req.address,
            tax: req.tax,
            items: req
                .items
                .into_iter()
                .map(|item| CreateInvoiceItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

impl From<InvoiceItem> for InvoiceItemResponse {
    fn from(item: InvoiceItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

/// Invoice header without items, as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_no: String,
    pub issue_date: String,
    pub due_date: String,
    pub client_id: i64,
    pub address: Option<String>,
    pub tax: f64,
    pub total: f64,
}

impl From<Invoice> for InvoiceSummary {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            invoice_no: invoice.invoice_no,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            client_id: invoice.client_id,
            address: invoice.address,
            tax: invoice.tax,
            total: invoice.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub id: i64,
    pub invoice_no: String,
    pub issue_date: String,
    pub due_date: String,
    pub client_id: i64,
    pub address: Option<String>,
    pub tax: f64,
    pub total: f64,
    pub items: Vec<InvoiceItemResponse>,
}

impl From<InvoiceWithItems> for InvoiceResponse {
    fn from(InvoiceWithItems { invoice, items }: InvoiceWithItems) -> Self {
        Self {
            id: invoice.id,
            invoice_no: invoice.invoice_no,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            client_id: invoice.client_id,
            address: invoice.address,
            tax: invoice.tax,
            total: invoice.total,
            items: items.into_iter().map(InvoiceItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> CreateInvoiceRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn optional_fields_default() {
        let req = parse(json!({
            "issue_date": "2025-01-01",
            "due_date": "2025-01-31",
            "client_id": 1,
            "items": [{"product_id": 1, "quantity": 2}]
        }));

        assert!(req.invoice_no.is_none());
        assert!(req.address.is_none());
        assert_eq!(req.tax, 0.0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn non_positive_quantity_fails_validation() {
        for quantity in [0, -3] {
            let req = parse(json!({
                "issue_date": "2025-01-01",
                "due_date": "2025-01-31",
                "client_id": 1,
                "items": [{"product_id": 1, "quantity": quantity}]
            }));
            assert!(req.validate().is_err(), "quantity {} accepted", quantity);
        }
    }

    #[test]
    fn quantity_above_exact_float_range_fails_validation() {
        let at_limit = parse(json!({
            "issue_date": "2025-01-01",
            "due_date": "2025-01-31",
            "client_id": 1,
            "items": [{"product_id": 1, "quantity": MAX_QUANTITY}]
        }));
        assert!(at_limit.validate().is_ok());

        let past_limit = parse(json!({
            "issue_date": "2025-01-01",
            "due_date": "2025-01-31",
            "client_id": 1,
            "items": [{"product_id": 1, "quantity": MAX_QUANTITY + 1}]
        }));
        assert!(past_limit.validate().is_err());

        let too_large = parse(json!({
            "issue_date": "2025-01-01",
            "due_date": "2025-01-31",
            "client_id": 1,
            "items": [{"product_id": 1, "quantity": i64::MAX}]
        }));
        assert!(too_large.validate().is_err());
    }

    #[test]
    fn empty_items_fail_validation() {
        let req = parse(json!({
            "issue_date": "2025-01-01",
            "due_date": "2025-01-31",
            "client_id": 1,
            "items": []
        }));
        assert!(req.validate().is_err());
    }
}
