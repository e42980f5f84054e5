use std::{any::Any, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use shared::{
    error::ApiError,
    protocol::{EnrichedResult, ENRICH_ROUTE},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod api;
mod app_state;
mod config;
mod generator;

use app_state::AppState;
use config::{load_settings, Settings};
use generator::{GeminiConfig, GeminiGenerator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings()?;
    let generator = GeminiGenerator::new(GeminiConfig {
        base_url: settings.generator_base_url.clone(),
        model: settings.model.clone(),
        api_key: settings.api_key()?.to_string(),
    })
    .context("failed to configure model client")?;
    info!(model = %settings.model, endpoint = %generator.endpoint(), "model client configured");

    let state = AppState {
        generator: Arc::new(generator),
    };
    let app = build_router(Arc::new(state), &settings)?;

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, settings: &Settings) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route("/healthz", get(healthz))
        .route(ENRICH_ROUTE, post(http_enrich))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(cors_layer(&settings.allowed_origins)?)
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .with_context(|| format!("invalid CORS origin '{origin}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = panic
        .downcast_ref::<&str>()
        .map(|reason| reason.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    error!(%reason, "request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(api::UNEXPECTED_ERROR_MESSAGE)),
    )
        .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn http_enrich(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EnrichedResult>, (StatusCode, Json<ApiError>)> {
    let Json(body) = body.map_err(|rejection| {
        warn!(%rejection, "enrich: unreadable request body");
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(api::MISSING_INPUT_MESSAGE)),
        )
    })?;

    let request = api::validate_input(&body).map_err(|(status, error)| (status, Json(error)))?;
    info!(
        company_name = %request.company_name,
        website = %request.website,
        "enrich: request accepted"
    );

    api::enrich_company(state.generator.as_ref(), &request)
        .await
        .map(Json)
        .map_err(|(status, error)| (status, Json(error)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
