//! Stateless HTTP request builder and response parser for the payment API.
//!
//! # Design
//! `EpayClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `TtkEpay` runs the round-trip with reqwest; other hosts can run it with
//! whatever transport they have.
//!
//! Query parameter names are copied verbatim from the service, including
//! their inconsistent casing (`pageNumber`, `SatimOrderId`, `SATIM_ORDER_ID`).

use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{MailReceipt, PageRequest, PaymentFilter};

/// Headers sent with every request.
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [("Accept", "*/*"), ("Content-Type", "application/json")];

const SATIM_ORDER_ID: &str = "SATIM_ORDER_ID";

/// Everything outside the RFC 3986 unreserved set is escaped in path segments.
const SEGMENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Synchronous, stateless client for the payment API.
///
/// JSON parsers are generic over the decoded type: `serde_json::Value`
/// returns the body as-is, typed structs such as `Invoice` work too.
#[derive(Debug, Clone)]
pub struct EpayClient {
    base_url: String,
}

impl EpayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_invoices(&self, page: PageRequest) -> HttpRequest {
        self.request(HttpMethod::Get, "/admin/invoices", page.query_pairs(), None)
    }

    pub fn build_create_invoice<B: Serialize + ?Sized>(&self, invoice: &B) -> Result<HttpRequest, ApiError> {
        let body = to_json(invoice)?;
        Ok(self.request(HttpMethod::Post, "/admin/invoices", Vec::new(), Some(body)))
    }

    pub fn build_get_invoice_by_order_id(&self, order_id: impl Display) -> HttpRequest {
        let path = format!("/admin/invoices/{}", utf8_percent_encode(&order_id.to_string(), &SEGMENT_ENCODE_SET));
        self.request(HttpMethod::Get, &path, Vec::new(), None)
    }

    pub fn build_update_invoice<B: Serialize + ?Sized>(
        &self,
        invoice_id: impl Display,
        invoice: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(invoice)?;
        let path = format!("/admin/invoices/{}", utf8_percent_encode(&invoice_id.to_string(), &SEGMENT_ENCODE_SET));
        Ok(self.request(HttpMethod::Patch, &path, Vec::new(), Some(body)))
    }

    pub fn build_get_payments(&self, filter: &PaymentFilter) -> HttpRequest {
        self.request(HttpMethod::Get, "/admin/payments", filter.query_pairs(), None)
    }

    pub fn build_get_pdf_recipt(&self, satim_order_id: &str) -> HttpRequest {
        let query = vec![(SATIM_ORDER_ID.to_string(), satim_order_id.to_string())];
        self.request(HttpMethod::Get, "/epayment/generate-pdf", query, None)
    }

    pub fn build_send_pdf_recipt_mail(&self, satim_order_id: &str, email: &str) -> HttpRequest {
        let query = vec![
            (SATIM_ORDER_ID.to_string(), satim_order_id.to_string()),
            ("EMAIL".to_string(), email.to_string()),
        ];
        self.request(HttpMethod::Get, "/epayment/send-mail", query, None)
    }

    pub fn build_post_payement<B: Serialize + ?Sized>(&self, payment: &B) -> Result<HttpRequest, ApiError> {
        let body = to_json(payment)?;
        Ok(self.request(HttpMethod::Post, "/epayment", Vec::new(), Some(body)))
    }

    pub fn build_get_payment_status(&self, satim_order_id: &str) -> HttpRequest {
        let query = vec![(SATIM_ORDER_ID.to_string(), satim_order_id.to_string())];
        self.request(HttpMethod::Get, "/epayment", query, None)
    }

    pub fn parse_get_invoices<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_invoice<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_invoice_by_order_id<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_invoice<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_payments<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }

    /// Receipt PDF bytes, exactly as received.
    pub fn parse_get_pdf_recipt(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        check_status(&response)?;
        Ok(response.body)
    }

    /// JSON when the response declares `application/json`, text otherwise.
    pub fn parse_send_pdf_recipt_mail(&self, response: HttpResponse) -> Result<MailReceipt, ApiError> {
        check_status(&response)?;
        if response.is_json() {
            let value = serde_json::from_slice(&response.body)
                .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
            Ok(MailReceipt::Json(value))
        } else {
            Ok(MailReceipt::Text(response.text()))
        }
    }

    pub fn parse_post_payement<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_payment_status<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        parse_json(response)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query,
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        }
    }
}

fn to_json<B: Serialize + ?Sized>(payload: &B) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map any non-2xx status to `ApiError::Http`, keeping the body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.text(),
    })
}
