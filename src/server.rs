//! Read-only HTTP API over a built schedule.
//!
//! The schedule is built once before the listener is bound and shared
//! across handlers behind an `Arc`; nothing mutates it afterwards.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Landing page listing the endpoints |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/cronograma` | Full schedule, keyed by week |
//! | `GET`  | `/api/buscar?q=` | Search results |
//! | `GET`  | `/static/swagger.json` | OpenAPI 3.0 descriptor |
//! | `GET`  | `/api/docs` | Swagger UI |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Parâmetro de busca 'q' é obrigatório" }
//! ```
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front-ends can
//! call the API directly.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::ingest;
use crate::models::Schedule;
use crate::openapi;
use crate::search::{self, SearchError, SearchMatch};

/// Message returned when `q` is missing or empty.
pub const MISSING_QUERY_MESSAGE: &str = "Parâmetro de busca 'q' é obrigatório";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    schedule: Arc<Schedule>,
}

impl AppState {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule: Arc::new(schedule),
        }
    }
}

/// Builds the schedule, then serves it on the configured address until the
/// process is terminated.
///
/// An empty schedule is served rather than refusing to start.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr()?;

    let (schedule, report) = ingest::build_schedule(config);
    if schedule.is_empty() {
        tracing::warn!(
            "serving an empty schedule ({} of {} files read)",
            report.files_read,
            report.files_found
        );
    }

    let app = router(AppState::new(schedule));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/cronograma", get(handle_schedule))
        .route("/api/buscar", get(handle_search))
        .route(openapi::DESCRIPTOR_PATH, get(handle_descriptor))
        .route(openapi::DOCS_PATH, get(handle_docs))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyTerm => bad_request(MISSING_QUERY_MESSAGE),
        }
    }
}

// ============ GET / and docs ============

async fn handle_index() -> Html<String> {
    Html(openapi::landing_page())
}

async fn handle_descriptor() -> Json<serde_json::Value> {
    Json(openapi::descriptor())
}

async fn handle_docs() -> Html<String> {
    Html(openapi::docs_page())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/cronograma ============

async fn handle_schedule(State(state): State<AppState>) -> Response {
    Json(&*state.schedule).into_response()
}

// ============ GET /api/buscar ============

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    resultados: Vec<SearchMatch<'a>>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let term = params.q.unwrap_or_default();
    let resultados = search::search(&state.schedule, &term)?;
    Ok(Json(SearchResponse { resultados }).into_response())
}
