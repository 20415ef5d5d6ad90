//! Async executor for the payment API.
//!
//! `TtkEpay` pairs an `EpayClient` with one `reqwest::Client` built at
//! construction. The reqwest client pools connections and is configured once
//! with the timeout, so cloning `TtkEpay` and calling it from several tasks at
//! once needs no locking. Headers come from the built `HttpRequest`, which
//! already carries `Accept` and `Content-Type`.

use std::fmt::Display;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::EpayClient;
use crate::config::{ClientConfig, MAX_ATTEMPTS};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{MailReceipt, PageRequest, PaymentFilter};

#[derive(Debug, Clone)]
pub struct TtkEpay {
    api: EpayClient,
    http: reqwest::Client,
    config: ClientConfig,
}

impl TtkEpay {
    /// Client for the production endpoint with default settings.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::default().with_base_url(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Transport)?;

        Ok(Self {
            api: EpayClient::new(&config.base_url),
            http,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The request builder/parser this executor drives.
    pub fn api(&self) -> &EpayClient {
        &self.api
    }

    pub async fn get_invoices<T: DeserializeOwned>(&self, page: PageRequest) -> Result<T, ApiError> {
        let response = self.execute(self.api.build_get_invoices(page)).await?;
        self.api.parse_get_invoices(response)
    }

    pub async fn create_invoice<B, T>(&self, invoice: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.api.build_create_invoice(invoice)?).await?;
        self.api.parse_create_invoice(response)
    }

    pub async fn get_invoice_by_order_id<T: DeserializeOwned>(&self, order_id: impl Display) -> Result<T, ApiError> {
        let response = self.execute(self.api.build_get_invoice_by_order_id(order_id)).await?;
        self.api.parse_get_invoice_by_order_id(response)
    }

    pub async fn update_invoice<B, T>(&self, invoice_id: impl Display, invoice: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.api.build_update_invoice(invoice_id, invoice)?).await?;
        self.api.parse_update_invoice(response)
    }

    pub async fn get_payments<T: DeserializeOwned>(&self, filter: &PaymentFilter) -> Result<T, ApiError> {
        let response = self.execute(self.api.build_get_payments(filter)).await?;
        self.api.parse_get_payments(response)
    }

    pub async fn get_pdf_recipt(&self, satim_order_id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.execute(self.api.build_get_pdf_recipt(satim_order_id)).await?;
        self.api.parse_get_pdf_recipt(response)
    }

    pub async fn send_pdf_recipt_mail(&self, satim_order_id: &str, email: &str) -> Result<MailReceipt, ApiError> {
        let response = self
            .execute(self.api.build_send_pdf_recipt_mail(satim_order_id, email))
            .await?;
        self.api.parse_send_pdf_recipt_mail(response)
    }

    pub async fn post_payement<B, T>(&self, payment: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.api.build_post_payement(payment)?).await?;
        self.api.parse_post_payement(response)
    }

    pub async fn get_payment_status<T: DeserializeOwned>(&self, satim_order_id: &str) -> Result<T, ApiError> {
        let response = self.execute(self.api.build_get_payment_status(satim_order_id)).await?;
        self.api.parse_get_payment_status(response)
    }

    /// Send one request and collect the response. Status codes are not
    /// interpreted here; that is the parsers' job.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url()?;
        debug!(
            method = request.method.as_str(),
            %url,
            max_attempts = MAX_ATTEMPTS,
            "sending request"
        );

        let mut builder = self.http.request(to_reqwest_method(request.method), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await?.to_vec();

        if (200..300).contains(&status) {
            debug!(status, %url, bytes = body.len(), "received response");
        } else {
            warn!(status, %url, "request failed");
        }

        Ok(HttpResponse { status, headers, body })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
    }
}
