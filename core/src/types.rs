//! Data model and request payload shapes for the payment service.
//!
//! # Design
//! `Invoice` and `InvoiceDto` use the service's upper-case JSON keys
//! verbatim. `InvoiceDto` is defined on its own rather than derived from
//! `Invoice`; it is the subset of fields accepted when writing an invoice.
//! Value ranges and cross-field consistency are left to the service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Full invoice record as stored and returned by the service.
///
/// Only `ID` is required. `IS_PAID` defaults to `false`, every other field
/// to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Invoice {
    pub id: i64,
    #[serde(default)]
    pub invoice_number: Option<i64>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub invoice_type_code: Option<String>,
    #[serde(default)]
    pub net_amount: Option<f64>,
    /// VAT rate.
    #[serde(default)]
    pub invoice_tva: Option<f64>,
    /// VAT amount.
    #[serde(default)]
    pub amount_tva: Option<f64>,
    /// Total including VAT.
    #[serde(default)]
    pub amount_ttc: Option<f64>,
    #[serde(default)]
    pub invoice_state_code: Option<String>,
    #[serde(default)]
    pub order_name: Option<String>,
    #[serde(default)]
    pub client_code: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    /// Commercial registry number.
    #[serde(default)]
    pub client_nrc: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub client_mail: Option<String>,
    /// Tax identifier.
    #[serde(default)]
    pub client_idf: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
}

impl Invoice {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            invoice_number: None,
            order_id: None,
            invoice_date: None,
            invoice_type_code: None,
            net_amount: None,
            invoice_tva: None,
            amount_tva: None,
            amount_ttc: None,
            invoice_state_code: None,
            order_name: None,
            client_code: None,
            client_name: None,
            client_nrc: None,
            client_address: None,
            client_mail: None,
            client_idf: None,
            product_name: None,
            is_paid: false,
        }
    }

    /// Builds an invoice from a JSON object. Fails if `ID` is missing.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Invoice fields accepted on create and update.
///
/// `None` fields are left out of the serialized payload, so the same shape
/// doubles as a partial update body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct InvoiceDto {
    pub invoice_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_type_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_mail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl InvoiceDto {
    pub fn new(invoice_number: i64) -> Self {
        Self {
            invoice_number,
            order_id: None,
            invoice_date: None,
            invoice_type_code: None,
            net_amount: None,
            client_code: None,
            client_name: None,
            client_address: None,
            client_mail: None,
            product_name: None,
        }
    }

    /// Builds a DTO from a JSON object. Fails if `INVOICE_NUMBER` is missing.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Paging for the invoice listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self { page_number, page_size }
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("pageNumber".to_string(), self.page_number.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ]
    }
}

/// Optional filters for the payments listing.
///
/// Unset, zero and empty values are not sent at all. The parameter names
/// (`SatimOrderId`, `FromDate`, `toDate`, ...) are the service's, casing
/// included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub satim_order_id: Option<String>,
    pub invoice_id: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl PaymentFilter {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let numbers = [("pageNumber", self.page_number), ("pageSize", self.page_size)];
        let strings = [
            ("SatimOrderId", &self.satim_order_id),
            ("InvoiceId", &self.invoice_id),
            ("FromDate", &self.from_date),
            ("toDate", &self.to_date),
        ];

        let numbers = numbers
            .into_iter()
            .filter_map(|(name, v)| v.filter(|n| *n != 0).map(|n| (name.to_string(), n.to_string())));
        let strings = strings.into_iter().filter_map(|(name, v)| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| (name.to_string(), s.to_string()))
        });
        numbers.chain(strings).collect()
    }
}

/// Outcome of the receipt mail endpoint, decoded according to the declared
/// content type.
#[derive(Debug, Clone, PartialEq)]
pub enum MailReceipt {
    Json(Value),
    Text(String),
}
