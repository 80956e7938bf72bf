//! Inbound envelope normalization.
//!
//! Every supported caller shape (Lambda proxy event, Azure request, local
//! development request) collapses into a [`NormalizedEvent`], which can then be
//! re-expressed in whichever shape the target handler expects.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::core::models::{AzureRequest, ExpressRequest, Headers, LambdaEvent, Params};
use crate::errors::StarlessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = StarlessError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| StarlessError::UnsupportedMethod(raw.to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound invocation in one of the three supported shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Lambda(LambdaEvent),
    Azure(AzureRequest),
    Express(ExpressRequest),
}

/// Canonical request: the same logical fields regardless of origin, with the
/// body always held as a parsed value (`Null` when absent).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub path: String,
    pub method: HttpMethod,
    pub headers: Headers,
    pub query: Params,
    pub params: Params,
    pub body: Value,
}

impl Envelope {
    /// # Errors
    ///
    /// Returns `UnsupportedMethod` for verbs outside GET/POST/PUT/PATCH/DELETE
    /// and `InvalidBody` for undecodable base64 Lambda bodies.
    pub fn normalize(self) -> Result<NormalizedEvent, StarlessError> {
        let event = match self {
            Envelope::Lambda(event) => {
                let body = decode_lambda_body(event.body.as_deref(), event.is_base64_encoded)?;
                NormalizedEvent {
                    path: event.path,
                    method: event.http_method.parse()?,
                    headers: event.headers,
                    query: event.query_string_parameters,
                    params: event.path_parameters,
                    body,
                }
            }
            Envelope::Azure(req) => NormalizedEvent {
                path: path_from_url(&req.url),
                method: req.method.parse()?,
                headers: req.headers,
                query: req.query,
                params: req.params,
                body: req.body,
            },
            Envelope::Express(req) => NormalizedEvent {
                path: req.path,
                method: req.method.parse()?,
                headers: req.headers,
                query: req.query,
                params: req.params,
                body: req.body,
            },
        };
        debug!(path = %event.path, method = %event.method, "Normalized inbound envelope");
        Ok(event)
    }
}

impl NormalizedEvent {
    /// Re-expresses the event for a Lambda-style handler; a structured body is
    /// JSON-stringified even when the caller already parsed it, text is kept raw.
    #[must_use]
    pub fn into_lambda_event(self) -> LambdaEvent {
        LambdaEvent {
            path: self.path,
            http_method: self.method.as_str().to_string(),
            headers: self.headers,
            query_string_parameters: self.query,
            path_parameters: self.params,
            body: encode_body(&self.body),
            is_base64_encoded: false,
        }
    }

    /// Re-expresses the event for a context-style handler. With a `base_url`
    /// the request url is absolute, otherwise it is the bare path.
    #[must_use]
    pub fn into_azure_request(self, base_url: Option<&str>) -> AzureRequest {
        let url = match base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), self.path),
            None => self.path,
        };
        AzureRequest {
            url,
            method: self.method.as_str().to_string(),
            headers: self.headers,
            query: self.query,
            params: self.params,
            body: self.body,
        }
    }
}

/// Wire form of a parsed body: JSON for structured values, the text itself for
/// strings, `None` for an absent one.
#[must_use]
pub fn encode_body(body: &Value) -> Option<String> {
    match body {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses a Lambda body. Text that is not JSON is carried as a string value.
///
/// # Errors
///
/// Returns `InvalidBody` if a base64 flagged body cannot be decoded.
pub fn decode_lambda_body(body: Option<&str>, is_base64: bool) -> Result<Value, StarlessError> {
    let Some(raw) = body else {
        return Ok(Value::Null);
    };
    let text = if is_base64 {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(raw)
            .map_err(|e| StarlessError::InvalidBody(format!("base64: {e}")))?;
        String::from_utf8(bytes).map_err(|e| StarlessError::InvalidBody(e.to_string()))?
    } else {
        raw.to_string()
    };
    if text.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

fn path_from_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => raw.split('?').next().unwrap_or_default().to_string(),
    }
}
