//! HTTP API over a shared [`MetaScraper`]
//!
//! Routes:
//!
//! - `GET /` plain-text pointer to the API
//! - `GET /health` liveness probe
//! - `GET /api/meta?url=<url>` the scraped record as JSON
//!
//! Scraping is blocking, so each request runs it on tokio's blocking pool.

use crate::dispatcher::MetaScraper;
use crate::error::ScrapeError;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Shared state for the web server
pub type AppState = Arc<MetaScraper>;

const MISSING_URL: &str = "`url` parameter is empty or missing.";

/// Query string of `/api/meta`
#[derive(Debug, Deserialize)]
pub struct MetaParams {
    pub url: Option<String>,
}

/// Error body returned with a 400
fn bad_request(message: impl Into<String>, kind: &str) -> Response {
    let body = serde_json::json!({
        "error": message.into(),
        "kind": kind,
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn scrape_error(err: ScrapeError) -> Response {
    info!("Scrape failed: {}", err);
    bad_request(err.to_string(), err.kind())
}

async fn index() -> &'static str {
    "Please use the API end point."
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(scraper))]
async fn api_meta(
    State(scraper): State<AppState>,
    params: Result<Query<MetaParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return bad_request(rejection.body_text(), "invalid_input"),
    };
    let Some(url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return bad_request(MISSING_URL, "invalid_input");
    };

    let result = tokio::task::spawn_blocking(move || scraper.scrape(&url)).await;

    match result {
        Ok(Ok(metadata)) => Json(metadata).into_response(),
        Ok(Err(err)) => scrape_error(err),
        Err(join_err) => {
            error!("Scrape task failed: {}", join_err);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// Create the router with all routes
pub fn create_router(scraper: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/meta", get(api_meta))
        .layer(TraceLayer::new_for_http())
        .with_state(scraper)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(addr: SocketAddr, scraper: AppState) -> std::io::Result<()> {
    let app = create_router(scraper);

    info!("Starting server at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
