//! Azure Functions custom handler.
//!
//! Every registered function is reachable at `POST /<FunctionName>`; the
//! handler always runs in context convention.

pub mod protocol;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use self::protocol::{HttpOutput, InvocationRequest, InvocationResponse};
use crate::adapter::{HttpMethod, InvocationContext};
use crate::errors::{Result, StarlessError};
use crate::routes::{Route, RouteTable};

const INVOCATION_ID_HEADER: &str = "x-azure-functions-invocationid";

pub fn router(table: Arc<RouteTable>) -> Router {
    Router::new()
        .route("/:function", post(invoke))
        .layer(TraceLayer::new_for_http())
        .with_state(table)
}

/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn serve(port: u16, table: RouteTable) -> Result<()> {
    let bind_addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| StarlessError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;
    info!("Azure custom handler listening on {}", bind_addr);

    axum::serve(listener, router(Arc::new(table)))
        .await
        .map_err(|e| StarlessError::Server(format!("Server error: {e}")))
}

async fn invoke(
    State(table): State<Arc<RouteTable>>,
    Path(function): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<InvocationRequest>,
) -> Response {
    let Some(trigger) = payload.http_trigger() else {
        warn!(%function, "Invocation without an HTTP trigger binding");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing req binding" })),
        )
            .into_response();
    };
    let req = trigger.into_azure_request();

    let Some(route) = resolve(&table, &function, payload.method_name(), &req.url, &req.method)
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Unknown function: {function}") })),
        )
            .into_response();
    };

    let invocation_id = headers
        .get(INVOCATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), ToString::to_string);
    let mut context = InvocationContext::new(invocation_id);
    let outcome = route
        .handler
        .clone()
        .into_context()
        .call(&mut context, req)
        .await;

    match outcome {
        Ok(()) => {
            let (res, logs) = context.into_parts();
            Json(InvocationResponse::http(HttpOutput::from(res), logs)).into_response()
        }
        Err(e) => {
            error!(function = %route.name, "Function failed: {}", e);
            let (_, mut logs) = context.into_parts();
            logs.push(format!("Function failed: {e}"));
            let output = HttpOutput {
                status_code: 500,
                body: json!({ "error": e.to_string() }).to_string(),
                headers: Default::default(),
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(InvocationResponse::http(output, logs)),
            )
                .into_response()
        }
    }
}

/// Resolves by deployed folder, then by function name, then by the request
/// path and method.
fn resolve<'a>(
    table: &'a RouteTable,
    function: &str,
    method_name: Option<&str>,
    url: &str,
    method: &str,
) -> Option<&'a Route> {
    let names = std::iter::once(function).chain(method_name);
    if let Some(route) = names
        .clone()
        .find_map(|name| table.find_by_folder(name))
        .or_else(|| names.clone().find_map(|name| table.find_by_name(name)))
    {
        return Some(route);
    }
    let method: HttpMethod = method.parse().ok()?;
    let path = url::Url::parse(url).map_or_else(|_| url.to_string(), |u| u.path().to_string());
    table.find(&path, method).map(|(route, _)| route)
}
