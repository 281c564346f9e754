// End-to-end tests for the JSON API: request -> router -> analyzer/store ->
// response, using tower::ServiceExt::oneshot for in-process HTTP.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use verifyx::analyzer::Analyzer;
use verifyx::ruleset::RuleSet;
use verifyx::server::{build_router, AppState};
use verifyx::store::ReportStore;

fn test_app() -> axum::Router {
    let analyzer = Analyzer::new(RuleSet::default()).unwrap();
    let store = ReportStore::open_in_memory().unwrap();
    build_router(Arc::new(AppState { analyzer, store }))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_verify_returns_verdict() {
    let app = test_app();
    let req = json_request(
        "POST",
        "/api/verify",
        json!({
            "type": "text",
            "value": "Pay ₹500 registration fee to confirm your selection, \
                      contact hr@gmail.com, send to upi@ybl"
        }),
    );

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let verdict = body_json(resp).await;
    assert!(verdict["score"].as_u64().unwrap() >= 60);
    assert_eq!(verdict["category"], json!("high"));
    assert!(verdict["reasons"].as_array().unwrap().len() >= 3);
    assert!(verdict["features"]["emailCount"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_verify_missing_value_is_client_error() {
    let app = test_app();
    let req = json_request("POST", "/api/verify", json!({"type": "text"}));

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["error"], json!("missing value"));
}

#[tokio::test]
async fn test_verify_blank_value_is_client_error() {
    let app = test_app();
    let req = json_request("POST", "/api/verify", json!({"value": "   "}));

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_get_convenience_endpoint() {
    let app = test_app();
    let req = Request::builder()
        .method("GET")
        .uri("/api/verify?value=hello%20there")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let verdict = body_json(resp).await;
    assert_eq!(verdict["score"], json!(0));
    assert_eq!(verdict["category"], json!("low"));
    assert_eq!(
        verdict["reasons"],
        json!(["No immediate red flags found"])
    );
}

#[tokio::test]
async fn test_verify_get_without_value_is_client_error() {
    let app = test_app();
    let req = Request::builder()
        .method("GET")
        .uri("/api/verify")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_round_trip() {
    let analyzer = Analyzer::new(RuleSet::default()).unwrap();
    let store = ReportStore::open_in_memory().unwrap();
    let state = Arc::new(AppState { analyzer, store });

    let reasons = json!(["UPI/payment id detected (upi@ybl)"]);
    let submit = json_request(
        "POST",
        "/api/report",
        json!({
            "type": "text",
            "value": "send to upi@ybl",
            "reasons": reasons.clone(),
            "score": 45
        }),
    );
    let resp = build_router(state.clone()).oneshot(submit).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["id"], json!(1));

    let list = Request::builder()
        .method("GET")
        .uri("/api/reports")
        .body(Body::empty())
        .unwrap();
    let resp = build_router(state).oneshot(list).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let reports = body_json(resp).await;
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["value"], json!("send to upi@ybl"));
    assert_eq!(reports[0]["score"], json!(45));
    assert_eq!(reports[0]["reasons"], reasons);
}

#[tokio::test]
async fn test_report_missing_value_is_client_error() {
    let app = test_app();
    let req = json_request("POST", "/api/report", json!({"score": 10}));

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let req = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
