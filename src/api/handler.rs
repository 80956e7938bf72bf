//! Lambda handler - thin router that resolves the target function from the
//! proxy event and runs it in Lambda convention.
//!
//! This module handles:
//! - Event validation (shape, method)
//! - Route lookup against the registered route table
//! - Path parameter capture when API Gateway did not supply them

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use super::{helpers, parsing};
use crate::adapter::HttpMethod;
use crate::core::models;
use crate::routes::RouteTable;

pub use self::function_handler as handler;

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Malformed events and unknown routes produce error response payloads; a
/// failing function handler is returned as a runtime error.
#[tracing::instrument(level = "info", skip(routes, event))]
pub async fn function_handler(
    routes: &RouteTable,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let xray = parsing::get_header_value(&event.payload["headers"], "X-Amzn-Trace-Id").unwrap_or("");
    info!(request_id = %event.context.request_id, xray_trace_id = %xray, "API Lambda received request");

    // ========================================================================
    // Parse the proxy event
    // ========================================================================

    let mut proxy_event: models::LambdaEvent = match serde_json::from_value(event.payload.clone())
    {
        Ok(e) => e,
        Err(e) => {
            error!("Invalid proxy event: {}", e);
            return Ok(helpers::err_response(400, &format!("Invalid event: {e}")));
        }
    };

    // HTTP API (v2) payloads carry these under different keys
    if proxy_event.path.is_empty() {
        if let Some(raw_path) = parsing::v_str(&event.payload, &["rawPath"]) {
            proxy_event.path = raw_path.to_string();
        }
    }
    if proxy_event.http_method.is_empty() {
        if let Some(method) = parsing::v_str(&event.payload, &["requestContext", "http", "method"])
        {
            proxy_event.http_method = method.to_string();
        }
    }

    let method: HttpMethod = match proxy_event.http_method.parse() {
        Ok(m) => m,
        Err(e) => {
            error!("{}", e);
            return Ok(helpers::err_response(405, &e.to_string()));
        }
    };

    // ========================================================================
    // Route to the registered function
    // ========================================================================

    let Some((route, params)) = routes.find(&proxy_event.path, method) else {
        error!(path = %proxy_event.path, %method, "No route matched");
        return Ok(helpers::err_response(404, "Not found"));
    };

    if proxy_event.path_parameters.is_empty() {
        proxy_event.path_parameters = params;
    }

    info!(function = %route.name, "Dispatching to function");
    let result = route
        .handler
        .clone()
        .into_lambda()
        .call(proxy_event)
        .await
        .map_err(|e| {
            error!(function = %route.name, "Function failed: {}", e);
            Error::from(e.to_string())
        })?;

    Ok(serde_json::to_value(result)?)
}
