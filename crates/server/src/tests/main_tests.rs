use super::*;
use crate::generator::{ContentGenerator, GenerateError};
use async_trait::async_trait;
use axum::{body, body::Body, http::Request};
use tokio::sync::Mutex;
use tower::ServiceExt;

const PROFILE: &str = r#"{"company_name":"Acme","website":"acme.com","description":"d","industry":"tech","estimated_size":"50-100","products_services":["a","b"],"headquarters":"NYC","year_founded":"2010","key_features":["x"]}"#;

#[derive(Default)]
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ContentGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().await.push(prompt.to_string());
        Ok(format!("```json\n{PROFILE}\n```"))
    }
}

fn test_app() -> (Router, Arc<RecordingGenerator>) {
    let generator = Arc::new(RecordingGenerator::default());
    let state = AppState {
        generator: generator.clone(),
    };
    let app = build_router(Arc::new(state), &Settings::default()).expect("router");
    (app, generator)
}

fn enrich_request(body: impl Into<Body>) -> Request<Body> {
    Request::post(ENRICH_ROUTE)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _generator) = test_app();
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn enrich_returns_parsed_profile() {
    let (app, generator) = test_app();
    let response = app
        .oneshot(enrich_request(
            serde_json::json!({ "company_name": "Acme", "website": "acme.com" }).to_string(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, serde_json::from_str::<Value>(PROFILE).expect("json"));

    let prompts = generator.prompts.lock().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Acme"));
}

#[tokio::test]
async fn missing_fields_are_rejected_without_calling_model() {
    let (app, generator) = test_app();
    let response = app
        .oneshot(enrich_request(
            serde_json::json!({ "company_name": "Acme" }).to_string(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": api::REQUIRED_FIELDS_MESSAGE })
    );
    assert!(generator.prompts.lock().await.is_empty());
}

#[tokio::test]
async fn malformed_json_is_missing_input() {
    let (app, _generator) = test_app();
    let response = app
        .oneshot(enrich_request("{not json"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": api::MISSING_INPUT_MESSAGE })
    );
}

#[tokio::test]
async fn preflight_from_allowed_origin_gets_cors_headers() {
    let (app, _generator) = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri(ENRICH_ROUTE)
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|value| value.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn unknown_origin_gets_no_cors_grant() {
    let (app, _generator) = test_app();
    let request = Request::post(ENRICH_ROUTE)
        .header("origin", "https://evil.example")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "company_name": "Acme", "website": "acme.com" }).to_string(),
        ))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[test]
fn invalid_cors_origin_is_a_configuration_error() {
    assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
}

struct PanickingGenerator;

#[async_trait]
impl ContentGenerator for PanickingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        panic!("model client crashed");
    }
}

#[tokio::test]
async fn handler_panic_becomes_unexpected_error_body() {
    let state = AppState {
        generator: Arc::new(PanickingGenerator),
    };
    let app = build_router(Arc::new(state), &Settings::default()).expect("router");
    let response = app
        .oneshot(enrich_request(
            serde_json::json!({ "company_name": "Acme", "website": "acme.com" }).to_string(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(
        body,
        serde_json::json!({ "error": api::UNEXPECTED_ERROR_MESSAGE })
    );
}
