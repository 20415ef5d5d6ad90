//! In-memory stand-in for the TTK e-payment service.
//!
//! Serves the same routes, parameter names and response shapes as the
//! real service so the client can be exercised end to end. State lives in
//! memory and is lost when the router is dropped.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicI64, AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const MAIL_SENT: &str = "PDF sent successfully";

const REQUESTS_PATH: &str = "/_mock/requests";

#[derive(Default)]
pub struct AppState {
    invoices: RwLock<BTreeMap<i64, Value>>,
    payments: RwLock<Vec<Value>>,
    last_invoice_id: AtomicI64,
    requests: AtomicU64,
    last_headers: RwLock<BTreeMap<String, String>>,
}

pub type Db = Arc<AppState>;

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(rename = "pageNumber")]
    pub page_number: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
}

#[derive(Deserialize)]
pub struct SatimQuery {
    #[serde(rename = "SATIM_ORDER_ID")]
    pub satim_order_id: String,
}

#[derive(Deserialize)]
pub struct MailQuery {
    #[serde(rename = "SATIM_ORDER_ID")]
    pub satim_order_id: String,
    #[serde(rename = "EMAIL")]
    pub email: String,
}

pub fn app() -> Router {
    let db: Db = Arc::new(AppState::default());
    Router::new()
        .route("/admin/invoices", get(list_invoices).post(create_invoice))
        .route("/admin/invoices/{id}", get(get_invoice_by_order_id).patch(update_invoice))
        .route("/admin/payments", get(list_payments))
        .route("/epayment", get(payment_status).post(create_payment))
        .route("/epayment/generate-pdf", get(generate_pdf))
        .route("/epayment/send-mail", get(send_mail))
        .route(REQUESTS_PATH, get(request_count))
        .layer(middleware::from_fn_with_state(db.clone(), count_requests))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Receipt document served for a payment. Contains non-UTF-8 bytes, as real
/// PDFs do.
pub fn receipt_pdf(satim_order_id: &str) -> Vec<u8> {
    let mut pdf = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    pdf.extend_from_slice(format!("1 0 obj << /Title (Receipt {satim_order_id}) >> endobj\n").as_bytes());
    pdf.extend_from_slice(b"%%EOF\n");
    pdf
}

/// Counts service requests and keeps the `Accept` / `Content-Type` headers
/// of the latest one.
async fn count_requests(State(db): State<Db>, request: Request, next: Next) -> Response {
    if request.uri().path() != REQUESTS_PATH {
        db.requests.fetch_add(1, Ordering::SeqCst);
        let seen: BTreeMap<String, String> = [header::ACCEPT, header::CONTENT_TYPE]
            .into_iter()
            .filter_map(|name| {
                let value = request.headers().get(&name)?.to_str().ok()?.to_string();
                Some((name.as_str().to_string(), value))
            })
            .collect();
        *db.last_headers.write().await = seen;
    }
    next.run(request).await
}

async fn request_count(State(db): State<Db>) -> Json<Value> {
    let last_headers = db.last_headers.read().await;
    Json(json!({
        "requests": db.requests.load(Ordering::SeqCst),
        "last_headers": *last_headers,
    }))
}

async fn list_invoices(
    State(db): State<Db>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, StatusCode> {
    if page.page_number == 0 || page.page_size == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let invoices = db.invoices.read().await;
    let items: Vec<Value> = invoices
        .values()
        .skip((page.page_number - 1).saturating_mul(page.page_size))
        .take(page.page_size)
        .cloned()
        .collect();
    Ok(Json(json!({
        "invoices": items,
        "pagination": {
            "pageNumber": page.page_number,
            "pageSize": page.page_size,
            "total": invoices.len(),
        }
    })))
}

async fn create_invoice(
    State(db): State<Db>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let Value::Object(mut fields) = input else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let id = db.last_invoice_id.fetch_add(1, Ordering::SeqCst) + 1;
    fields.insert("ID".to_string(), json!(id));
    fields.entry("IS_PAID").or_insert(json!(false));
    let invoice = Value::Object(fields);
    db.invoices.write().await.insert(id, invoice.clone());
    debug!(id, "invoice created");
    Ok(Json(invoice))
}

async fn get_invoice_by_order_id(
    State(db): State<Db>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let invoices = db.invoices.read().await;
    invoices
        .values()
        .find(|invoice| scalar_eq(&invoice["ORDER_ID"], &order_id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_invoice(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let id: i64 = id.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    let Value::Object(changes) = input else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let mut invoices = db.invoices.write().await;
    let invoice = invoices.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Value::Object(fields) = invoice {
        for (key, value) in changes {
            if key != "ID" {
                fields.insert(key, value);
            }
        }
    }
    Ok(Json(invoice.clone()))
}

async fn list_payments(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let page_number = optional_usize(&params, "pageNumber")?.unwrap_or(1).max(1);
    let page_size = optional_usize(&params, "pageSize")?.unwrap_or(10);

    let payments = db.payments.read().await;
    let items: Vec<Value> = payments
        .iter()
        .filter(|p| params.get("SatimOrderId").is_none_or(|id| scalar_eq(&p["SATIM_ORDER_ID"], id)))
        .filter(|p| params.get("InvoiceId").is_none_or(|id| scalar_eq(&p["INVOICE_ID"], id)))
        .skip((page_number - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    let filters: BTreeMap<&String, &String> = params.iter().collect();
    Ok(Json(json!({ "payments": items, "filters": filters })))
}

async fn create_payment(
    State(db): State<Db>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let Value::Object(mut fields) = input else {
        return Err(StatusCode::BAD_REQUEST);
    };
    match fields.get("amount").and_then(Value::as_f64) {
        Some(amount) if amount > 0.0 => {}
        _ => return Err(StatusCode::BAD_REQUEST),
    }

    let satim_order_id = Uuid::new_v4().simple().to_string();
    fields.insert("SATIM_ORDER_ID".to_string(), json!(satim_order_id));
    fields.insert("status".to_string(), json!("paid"));

    if let Some(invoice_id) = fields.get("INVOICE_ID") {
        mark_paid(&db, invoice_id).await;
    }

    let payment = Value::Object(fields);
    db.payments.write().await.push(payment.clone());
    debug!(%satim_order_id, "payment recorded");
    Ok(Json(payment))
}

async fn payment_status(
    State(db): State<Db>,
    Query(query): Query<SatimQuery>,
) -> Result<Json<Value>, StatusCode> {
    let payment = find_payment(&db, &query.satim_order_id).await?;
    Ok(Json(json!({
        "SATIM_ORDER_ID": payment["SATIM_ORDER_ID"],
        "status": payment["status"],
    })))
}

async fn generate_pdf(
    State(db): State<Db>,
    Query(query): Query<SatimQuery>,
) -> Result<Response, StatusCode> {
    find_payment(&db, &query.satim_order_id).await?;
    let pdf = receipt_pdf(&query.satim_order_id);
    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response())
}

async fn send_mail(
    State(db): State<Db>,
    Query(query): Query<MailQuery>,
) -> Result<&'static str, StatusCode> {
    if !query.email.contains('@') {
        return Err(StatusCode::BAD_REQUEST);
    }
    find_payment(&db, &query.satim_order_id).await?;
    debug!(satim_order_id = %query.satim_order_id, email = %query.email, "receipt mailed");
    Ok(MAIL_SENT)
}

async fn find_payment(db: &Db, satim_order_id: &str) -> Result<Value, StatusCode> {
    let payments = db.payments.read().await;
    payments
        .iter()
        .find(|p| scalar_eq(&p["SATIM_ORDER_ID"], satim_order_id))
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

async fn mark_paid(db: &Db, invoice_id: &Value) {
    let mut invoices = db.invoices.write().await;
    for invoice in invoices.values_mut() {
        if scalar_eq(&invoice["ID"], &scalar_string(invoice_id)) {
            if let Value::Object(fields) = invoice {
                fields.insert("IS_PAID".to_string(), json!(true));
            }
        }
    }
}

fn optional_usize(params: &HashMap<String, String>, name: &str) -> Result<Option<usize>, StatusCode> {
    params
        .get(name)
        .map(|v| v.parse().map_err(|_| StatusCode::BAD_REQUEST))
        .transpose()
}

/// Query and path values arrive as strings; stored values may be numbers.
fn scalar_eq(value: &Value, wanted: &str) -> bool {
    !value.is_null() && scalar_string(value) == wanted
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
