use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub type Headers = BTreeMap<String, String>;
pub type Params = BTreeMap<String, String>;

/// API Gateway proxy event as delivered to a Lambda-style handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaEvent {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub http_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Headers,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_string_parameters: Params,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path_parameters: Params,
    /// JSON-encoded body; `None` when the request carried none.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Request object handed to an Azure Functions style handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureRequest {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub query: Params,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub body: Value,
}

/// Request as seen by the local development server after JSON body parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressRequest {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub query: Params,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub body: Value,
}

/// Lambda proxy integration result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaResult {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default)]
    pub body: String,
}

impl LambdaResult {
    /// Builds a result whose body is the JSON encoding of `body`.
    #[must_use]
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: None,
            body: body.to_string(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(key.to_string(), value.to_string());
        self
    }
}

/// The `context.res` slot a context-style handler writes into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default = "empty_body")]
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
}

impl Default for ContextResult {
    /// Fresh contexts start out as `{ status: 200, body: "" }`.
    fn default() -> Self {
        Self {
            status: Some(200),
            body: empty_body(),
            headers: None,
        }
    }
}

impl ContextResult {
    /// A result carrying only a body; the status falls back to 200 downstream.
    #[must_use]
    pub fn body(body: Value) -> Self {
        Self {
            status: None,
            body,
            headers: None,
        }
    }
}

fn empty_body() -> Value {
    Value::String(String::new())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
