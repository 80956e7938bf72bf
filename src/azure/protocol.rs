//! Azure Functions custom handler payloads.
//!
//! The Functions host POSTs `{"Data": {...}, "Metadata": {...}}` to
//! `/<FunctionName>` and expects `{"Outputs": {...}, "Logs": [...],
//! "ReturnValue": ...}` back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adapter::response::{DEFAULT_STATUS, body_to_string};
use crate::core::models::{AzureRequest, ContextResult, Headers, Params};

/// Binding names used by the generated `function.json` files.
pub const REQUEST_BINDING: &str = "req";
pub const RESPONSE_BINDING: &str = "res";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationRequest {
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub metadata: Value,
}

/// The HTTP trigger binding inside `Data`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpTriggerData {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub query: Map<String, Value>,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationResponse {
    pub outputs: Map<String, Value>,
    pub logs: Vec<String>,
    pub return_value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpOutput {
    pub status_code: u16,
    pub body: String,
    #[serde(skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
}

impl InvocationRequest {
    /// The HTTP trigger payload, if this invocation carries one.
    #[must_use]
    pub fn http_trigger(&self) -> Option<HttpTriggerData> {
        self.data
            .get(REQUEST_BINDING)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Function name as reported by the host metadata.
    #[must_use]
    pub fn method_name(&self) -> Option<&str> {
        self.metadata
            .get("sys")
            .and_then(|sys| sys.get("MethodName"))
            .and_then(Value::as_str)
    }
}

impl HttpTriggerData {
    #[must_use]
    pub fn into_azure_request(self) -> AzureRequest {
        AzureRequest {
            url: self.url,
            method: self.method,
            headers: flatten_values(self.headers),
            query: flatten_values(self.query),
            params: flatten_values(self.params),
            body: parse_body(self.body),
        }
    }
}

impl From<ContextResult> for HttpOutput {
    fn from(res: ContextResult) -> Self {
        Self {
            status_code: res.status.unwrap_or(DEFAULT_STATUS),
            body: body_to_string(&res.body),
            headers: res.headers.unwrap_or_default(),
        }
    }
}

impl InvocationResponse {
    #[must_use]
    pub fn http(output: HttpOutput, logs: Vec<String>) -> Self {
        let mut outputs = Map::new();
        outputs.insert(
            RESPONSE_BINDING.to_string(),
            serde_json::to_value(output).unwrap_or(Value::Null),
        );
        Self {
            outputs,
            logs,
            return_value: Value::Null,
        }
    }
}

/// Header and query values may arrive as arrays; the first entry wins.
fn flatten_values(map: Map<String, Value>) -> Params {
    map.into_iter()
        .filter_map(|(k, v)| {
            let value = match v {
                Value::String(s) => Some(s),
                Value::Array(items) => items.into_iter().next().map(|first| body_to_string(&first)),
                Value::Null => None,
                other => Some(other.to_string()),
            };
            value.map(|v| (k, v))
        })
        .collect()
}

fn parse_body(body: Value) -> Value {
    match body {
        Value::String(raw) if raw.is_empty() => Value::Null,
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}
