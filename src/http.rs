//! HTTP search endpoint.
//!
//! Exposes a loaded review collection as `POST /search` taking
//! `{"query": "...", "limit": 10}` and returning the ranked hits as a JSON
//! array. Responses carry permissive CORS headers and `OPTIONS` preflight
//! requests are answered directly, so the endpoint can be called from any
//! browser origin. Errors come back as `{"error": "..."}` with a 400 for bad
//! requests and a 500 for everything else.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{CrocusError, Result};
use crate::pipeline::ReviewSearcher;

/// Body of a `POST /search` request.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    /// Natural-language query text.
    pub query: String,
    /// Maximum number of hits (default: 10).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Clone)]
struct AppState {
    searcher: Arc<ReviewSearcher>,
}

/// Build the application router around a configured searcher.
pub fn router(searcher: Arc<ReviewSearcher>) -> Router {
    Router::new()
        .route("/search", post(search))
        .layer(middleware::from_fn(cors))
        .with_state(AppState { searcher })
}

/// Bind `addr` and serve the search API until the process is stopped.
pub async fn serve(addr: &str, searcher: Arc<ReviewSearcher>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("serving search API on http://{}", addr);
    axum::serve(listener, router(searcher)).await?;
    Ok(())
}

/// Answer preflight requests and stamp permissive CORS headers on every
/// response.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    response
}

async fn search(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchParams>, JsonRejection>,
) -> Response {
    let Json(params) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state.searcher.search(&params.query, params.limit).await {
        Ok(hits) => Json(hits).into_response(),
        Err(e) => {
            let status = match &e {
                CrocusError::Parse(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::error!("search request failed: {}", e);
            error_response(status, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
