//! Routers for the analysis and page services

use crate::error::ApiError;
use crate::page::Page;
use analysis_core::AnalysisRequest;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRef, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use llm_bridge::ImageAnalyzer;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use uuid::Uuid;

/// Shared, read-only state of the analysis service
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<dyn ImageAnalyzer>,
    pub page: Page,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn ImageAnalyzer>, page: Page) -> Self {
        Self { analyzer, page }
    }
}

impl FromRef<AppState> for Page {
    fn from_ref(state: &AppState) -> Self {
        state.page.clone()
    }
}

/// Page, health check and `POST /api/analyze-image`
pub fn analysis_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(render_page))
        .route("/health", get(health_check))
        .route("/api/analyze-image", post(analyze_image))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Static page on `GET /` and `POST /`, no external calls
pub fn page_router(page: Page) -> Router {
    Router::new()
        .route("/", get(render_page).post(render_page))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(page)
}

fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

async fn health_check() -> &'static str {
    "OK"
}

async fn render_page(State(page): State<Page>) -> Html<Bytes> {
    page.html()
}

// application/json or application/*+json, parameters ignored
fn is_json(headers: &HeaderMap) -> bool {
    let Some(mime) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

async fn analyze_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    // A body that is not declared as JSON is never parsed
    let request = is_json(&headers)
        .then(|| AnalysisRequest::from_body(&body))
        .flatten()
        .ok_or(ApiError::MissingImage)?;

    let analysis = state.analyzer.analyze(&request).await.map_err(|e| {
        tracing::warn!(error = %e, details = e.details(), "Analysis relay failed");
        e
    })?;

    Ok(Json(analysis))
}
