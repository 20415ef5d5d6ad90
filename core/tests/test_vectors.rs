//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use serde_json::Value;
use ttk_epay::{ApiError, EpayClient, HttpMethod, HttpRequest, HttpResponse, MailReceipt, PageRequest, PaymentFilter};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> EpayClient {
    EpayClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        other => panic!("unknown method: {other}"),
    }
}

/// What a successful parse produced, normalised for comparison.
#[derive(Debug)]
enum Outcome {
    Json(Value),
    Bytes(Vec<u8>),
    Text(String),
}

fn str_field<'a>(input: &'a Value, name: &str) -> &'a str {
    input[name].as_str().unwrap_or_else(|| panic!("missing string input {name}"))
}

fn opt_u32(input: &Value, name: &str) -> Option<u32> {
    input[name].as_u64().map(|n| n as u32)
}

fn opt_string(input: &Value, name: &str) -> Option<String> {
    input[name].as_str().map(str::to_string)
}

fn build(c: &EpayClient, operation: &str, input: &Value) -> HttpRequest {
    match operation {
        "get_invoices" => {
            let mut page = PageRequest::default();
            if let Some(n) = opt_u32(input, "page_number") {
                page.page_number = n;
            }
            if let Some(n) = opt_u32(input, "page_size") {
                page.page_size = n;
            }
            c.build_get_invoices(page)
        }
        "create_invoice" => c.build_create_invoice(&input["body"]).unwrap(),
        "get_invoice_by_order_id" => c.build_get_invoice_by_order_id(str_field(input, "id")),
        "update_invoice" => c.build_update_invoice(str_field(input, "id"), &input["body"]).unwrap(),
        "get_payments" => c.build_get_payments(&PaymentFilter {
            page_number: opt_u32(input, "page_number"),
            page_size: opt_u32(input, "page_size"),
            satim_order_id: opt_string(input, "satim_order_id"),
            invoice_id: opt_string(input, "invoice_id"),
            from_date: opt_string(input, "from_date"),
            to_date: opt_string(input, "to_date"),
        }),
        "get_pdf_recipt" => c.build_get_pdf_recipt(str_field(input, "id")),
        "send_pdf_recipt_mail" => c.build_send_pdf_recipt_mail(str_field(input, "id"), str_field(input, "email")),
        "post_payement" => c.build_post_payement(&input["body"]).unwrap(),
        "get_payment_status" => c.build_get_payment_status(str_field(input, "id")),
        other => panic!("unknown operation: {other}"),
    }
}

fn parse(c: &EpayClient, operation: &str, response: HttpResponse) -> Result<Outcome, ApiError> {
    match operation {
        "get_invoices" => c.parse_get_invoices(response).map(Outcome::Json),
        "create_invoice" => c.parse_create_invoice(response).map(Outcome::Json),
        "get_invoice_by_order_id" => c.parse_get_invoice_by_order_id(response).map(Outcome::Json),
        "update_invoice" => c.parse_update_invoice(response).map(Outcome::Json),
        "get_payments" => c.parse_get_payments(response).map(Outcome::Json),
        "get_pdf_recipt" => c.parse_get_pdf_recipt(response).map(Outcome::Bytes),
        "send_pdf_recipt_mail" => c.parse_send_pdf_recipt_mail(response).map(|receipt| match receipt {
            MailReceipt::Json(v) => Outcome::Json(v),
            MailReceipt::Text(s) => Outcome::Text(s),
        }),
        "post_payement" => c.parse_post_payement(response).map(Outcome::Json),
        "get_payment_status" => c.parse_get_payment_status(response).map(Outcome::Json),
        other => panic!("unknown operation: {other}"),
    }
}

fn simulated_response(sim: &Value) -> HttpResponse {
    let body = match sim.get("body_bytes") {
        Some(bytes) => bytes
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b.as_u64().unwrap() as u8)
            .collect(),
        None => sim["body"].as_str().unwrap().as_bytes().to_vec(),
    };
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: vec![(
            "content-type".to_string(),
            sim["content_type"].as_str().unwrap().to_string(),
        )],
        body,
    }
}

fn run_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = case["operation"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = build(&c, operation, &case["input"]);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: path");

        let expected_query: Vec<(String, String)> = expected_req["query"]
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| {
                let arr = pair.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.query, expected_query, "{name}: query");

        match expected_req.get("body") {
            Some(expected_body) => {
                let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&req_body, expected_body, "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }

        // Verify parse
        let result = parse(&c, operation, simulated_response(&case["simulated_response"]));

        if let Some(expected_status) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(
                err.status().map(u64::from),
                expected_status.as_u64(),
                "{name}: expected HTTP error"
            );
            continue;
        }

        match result.unwrap() {
            Outcome::Json(value) => assert_eq!(value, case["expected_result"], "{name}: parsed result"),
            Outcome::Bytes(bytes) => {
                let expected: Vec<u8> = serde_json::from_value(case["expected_bytes"].clone()).unwrap();
                assert_eq!(bytes, expected, "{name}: bytes");
            }
            Outcome::Text(text) => assert_eq!(text, case["expected_text"].as_str().unwrap(), "{name}: text"),
        }
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[test]
fn invoice_test_vectors() {
    run_vectors(include_str!("../../test-vectors/invoices.json"));
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[test]
fn payment_test_vectors() {
    run_vectors(include_str!("../../test-vectors/payments.json"));
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

#[test]
fn receipt_test_vectors() {
    run_vectors(include_str!("../../test-vectors/receipts.json"));
}
