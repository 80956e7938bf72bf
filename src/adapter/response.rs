//! Outbound result normalization.

use serde_json::Value;

use crate::core::models::{ContextResult, Headers, LambdaResult};

pub const DEFAULT_STATUS: u16 = 200;

/// What a handler produced, in its own convention.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    Lambda(LambdaResult),
    Context(ContextResult),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text,
        }
    }
}

/// Envelope-independent HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: ResponseBody,
}

impl HandlerOutput {
    /// Collapses the handler output into a plain HTTP response.
    ///
    /// Lambda bodies are JSON-parsed exactly once; a decoded string and
    /// anything that is not JSON are passed through as text. Context bodies that are already strings pass
    /// through, structured values stay structured.
    #[must_use]
    pub fn into_http_response(self) -> HttpResponse {
        match self {
            HandlerOutput::Lambda(result) => {
                let body = if result.body.is_empty() {
                    ResponseBody::Text(String::new())
                } else {
                    match serde_json::from_str::<Value>(&result.body) {
                        Ok(Value::String(text)) => ResponseBody::Text(text),
                        Ok(value) => ResponseBody::Json(value),
                        Err(_) => ResponseBody::Text(result.body),
                    }
                };
                HttpResponse {
                    status: result.status_code,
                    headers: result.headers.unwrap_or_default(),
                    body,
                }
            }
            HandlerOutput::Context(res) => {
                let body = match res.body {
                    Value::String(text) => ResponseBody::Text(text),
                    Value::Null => ResponseBody::Text(String::new()),
                    other => ResponseBody::Json(other),
                };
                HttpResponse {
                    status: res.status.unwrap_or(DEFAULT_STATUS),
                    headers: res.headers.unwrap_or_default(),
                    body,
                }
            }
        }
    }
}

/// Stringifies structured bodies; strings are returned untouched.
#[must_use]
pub fn body_to_string(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_status_defaults_to_200() {
        let response = HandlerOutput::Context(ContextResult::body(json!({"message": "Hello"})))
            .into_http_response();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, ResponseBody::Json(json!({"message": "Hello"})));
    }

    #[test]
    fn test_lambda_body_parsed_once() {
        let original = json!({"nested": {"list": [1, "two", null]}});
        let result = LambdaResult::json(202, &original);
        let response = HandlerOutput::Lambda(result).into_http_response();
        assert_eq!(response.status, 202);
        assert_eq!(response.body, ResponseBody::Json(original));
    }

    #[test]
    fn test_lambda_string_body_stays_a_string() {
        // A JSON-encoded string decodes to the string itself, not its quotes.
        let result = LambdaResult {
            status_code: 200,
            headers: None,
            body: "\"plain\"".to_string(),
        };
        let response = HandlerOutput::Lambda(result).into_http_response();
        assert_eq!(response.body, ResponseBody::Text("plain".to_string()));
        assert_eq!(response.body.into_string(), "plain");
    }

    #[test]
    fn test_lambda_non_json_body_passes_through() {
        let result = LambdaResult {
            status_code: 500,
            headers: None,
            body: "<html>oops</html>".to_string(),
        };
        let response = HandlerOutput::Lambda(result).into_http_response();
        assert_eq!(response.body, ResponseBody::Text("<html>oops</html>".to_string()));
    }

    #[test]
    fn test_headers_copied_verbatim() {
        let mut headers = Headers::new();
        headers.insert("X-Trace".to_string(), "abc".to_string());
        headers.insert("Cache-Control".to_string(), "no-store".to_string());
        let res = ContextResult {
            status: Some(204),
            body: json!(""),
            headers: Some(headers.clone()),
        };
        let response = HandlerOutput::Context(res).into_http_response();
        assert_eq!(response.status, 204);
        assert_eq!(response.headers, headers);
        assert_eq!(response.body, ResponseBody::Text(String::new()));
    }

    #[test]
    fn test_body_to_string() {
        assert_eq!(body_to_string(&json!("x")), "x");
        assert_eq!(body_to_string(&json!({"a": 1})), "{\"a\":1}");
        assert_eq!(body_to_string(&json!(5)), "5");
    }
}
