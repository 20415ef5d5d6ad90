//! Async client for the TTK e-payment and invoicing API.
//!
//! # Overview
//! Covers invoice management (list, create, lookup by order, update),
//! payment listing, payment initiation and status, and receipt retrieval
//! or mailing. Each call is one HTTP round-trip; failures are returned as
//! `ApiError` with the HTTP status and body when the server answered.
//!
//! # Design
//! - `EpayClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `TtkEpay` executes those requests with a shared `reqwest::Client`.
//! - Timeouts and retries are explicit: `DEFAULT_TIMEOUT` is `None` and
//!   `MAX_ATTEMPTS` is 1.
//!
//! ```no_run
//! # async fn run() -> Result<(), ttk_epay::ApiError> {
//! use ttk_epay::{PageRequest, TtkEpay};
//!
//! let client = TtkEpay::new()?;
//! let invoices: serde_json::Value = client.get_invoices(PageRequest::default()).await?;
//! let pdf = client.get_pdf_recipt("12345").await?;
//! # let _ = (invoices, pdf);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::EpayClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MAX_ATTEMPTS};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::TtkEpay;
pub use types::{Invoice, InvoiceDto, MailReceipt, PageRequest, PaymentFilter};
