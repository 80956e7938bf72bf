//! Local development server.
//!
//! Serves every registered route under `/api/`, feeding requests through the
//! adapter the same way the cloud entrypoints do.

pub mod response;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, RawPathParams};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodFilter, MethodRouter, on};
use colored::Colorize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::adapter::{Envelope, HttpMethod, dispatch};
use crate::core::config::AppConfig;
use crate::core::models::{ExpressRequest, Headers, Params};
use crate::errors::{Result, StarlessError};
use crate::routes::{Route, RouteTable};

/// Builds the router for `table`. Each route keeps its own handler; nothing
/// else is shared between requests.
pub fn router(table: &RouteTable, config: &AppConfig) -> Router {
    let base_url: Arc<str> = Arc::from(config.local_base_url());
    let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();

    for route in table.routes() {
        let route = Arc::new(route.clone());
        let base_url = Arc::clone(&base_url);
        let filter = method_filter(route.method);
        let path = route.full_path();
        let handler = move |params: RawPathParams,
                            Query(query): Query<Params>,
                            headers: HeaderMap,
                            body: Bytes| {
            serve_route(Arc::clone(&route), Arc::clone(&base_url), params, query, headers, body)
        };
        let entry = by_path.remove(&path);
        let method_router = match entry {
            Some(existing) => existing.on(filter, handler),
            None => on(filter, handler),
        };
        by_path.insert(path, method_router);
    }

    by_path
        .into_iter()
        .fold(Router::new(), |app, (path, method_router)| app.route(&path, method_router))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured port and serves `table` until interrupted.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve(config: AppConfig, table: RouteTable) -> Result<()> {
    let app = router(&table, &config);
    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| StarlessError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    info!("Development server listening on {}", bind_addr);
    for line in table.listing(&config.local_base_url()) {
        let (name, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        println!("\n{} {}", name.yellow(), rest.green());
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StarlessError::Server(format!("Server error: {e}")))
}

async fn serve_route(
    route: Arc<Route>,
    base_url: Arc<str>,
    params: RawPathParams,
    query: Params,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = match parse_body(&headers, &body) {
        Ok(v) => v,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": message })))
                .into_response();
        }
    };

    let req = ExpressRequest {
        path: route_path(&route, &params),
        method: route.method.as_str().to_string(),
        headers: collect_headers(&headers),
        query,
        params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body,
    };

    match dispatch(&route.handler, Envelope::Express(req), Some(&base_url)).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            error!(function = %route.name, "Handler error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Rebuilds the concrete request path from the pattern and its captures.
fn route_path(route: &Route, params: &RawPathParams) -> String {
    route
        .full_path()
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .iter()
                .find(|(k, _)| *k == name)
                .map_or_else(String::new, |(_, v)| v.to_string()),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn collect_headers(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Mirrors a JSON body parser: empty bodies are absent, JSON bodies are
/// parsed, other text is kept as a string.
fn parse_body(headers: &HeaderMap, body: &Bytes) -> std::result::Result<Value, String> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    let is_json = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Ok(value),
        Err(e) if is_json => Err(format!("Invalid JSON body: {e}")),
        Err(_) => Ok(Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down development server");
}
