//! Wrappers that run a handler under the other calling convention.
//!
//! The Lambda entrypoint only speaks the Lambda convention and the Azure
//! entrypoint only speaks the context convention; these close the gap.

use async_trait::async_trait;
use std::sync::Arc;

use super::envelope::{Envelope, decode_lambda_body};
use super::handler::{ContextHandler, InvocationContext, LambdaHandler};
use super::response::{DEFAULT_STATUS, body_to_string};
use crate::core::models::{AzureRequest, ContextResult, LambdaEvent, LambdaResult};
use crate::errors::HandlerError;

/// Runs a Lambda-style handler where a context-style one is expected.
pub struct LambdaAsContext {
    inner: Arc<dyn LambdaHandler>,
}

impl LambdaAsContext {
    pub fn new(inner: Arc<dyn LambdaHandler>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ContextHandler for LambdaAsContext {
    async fn call(
        &self,
        context: &mut InvocationContext,
        req: AzureRequest,
    ) -> Result<(), HandlerError> {
        context.log("HTTP trigger function processed a request.");
        let event = Envelope::Azure(req).normalize()?.into_lambda_event();
        let result = self.inner.call(event).await?;
        let body = decode_lambda_body(Some(&result.body), false)?;
        context.res = ContextResult {
            status: Some(result.status_code),
            body,
            headers: result.headers,
        };
        Ok(())
    }
}

/// Runs a context-style handler where a Lambda-style one is expected.
pub struct ContextAsLambda {
    inner: Arc<dyn ContextHandler>,
}

impl ContextAsLambda {
    pub fn new(inner: Arc<dyn ContextHandler>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LambdaHandler for ContextAsLambda {
    async fn call(&self, event: LambdaEvent) -> Result<LambdaResult, HandlerError> {
        let req = Envelope::Lambda(event).normalize()?.into_azure_request(None);
        let mut context = InvocationContext::default();
        self.inner.call(&mut context, req).await?;
        let (res, _) = context.into_parts();
        Ok(LambdaResult {
            status_code: res.status.unwrap_or(DEFAULT_STATUS),
            headers: res.headers,
            body: body_to_string(&res.body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Handler;
    use crate::core::models::Headers;
    use serde_json::{Value, json};

    struct Echo;

    #[async_trait]
    impl ContextHandler for Echo {
        async fn call(
            &self,
            context: &mut InvocationContext,
            req: AzureRequest,
        ) -> Result<(), HandlerError> {
            context.res = ContextResult::body(json!({"echo": req.body, "url": req.url}));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_context_handler_as_lambda() {
        let handler = Handler::context(Echo).into_lambda();
        let event = LambdaEvent {
            path: "/api/echo".to_string(),
            http_method: "POST".to_string(),
            body: Some(r#"{"k":"v"}"#.to_string()),
            ..LambdaEvent::default()
        };
        let result = handler.call(event).await.unwrap();
        assert_eq!(result.status_code, 200);
        let body: Value = serde_json::from_str(&result.body).unwrap();
        assert_eq!(body, json!({"echo": {"k": "v"}, "url": "/api/echo"}));
    }

    #[tokio::test]
    async fn test_lambda_handler_as_context() {
        let handler = Handler::lambda_fn(|event: LambdaEvent| async move {
            let mut headers = Headers::new();
            headers.insert("X-Path".to_string(), event.path.clone());
            Ok::<_, HandlerError>(LambdaResult {
                status_code: 201,
                headers: Some(headers),
                body: event.body.unwrap_or_default(),
            })
        })
        .into_context();

        let mut ctx = InvocationContext::new("t".to_string());
        let req = AzureRequest {
            url: "http://localhost:7071/api/things".to_string(),
            method: "PUT".to_string(),
            body: json!([1, 2, 3]),
            ..AzureRequest::default()
        };
        handler.call(&mut ctx, req).await.unwrap();

        assert_eq!(ctx.res.status, Some(201));
        assert_eq!(ctx.res.body, json!([1, 2, 3]));
        assert_eq!(
            ctx.res.headers.as_ref().and_then(|h| h.get("X-Path")).map(String::as_str),
            Some("/api/things")
        );
        assert_eq!(ctx.logs().len(), 1);
    }

    #[tokio::test]
    async fn test_bridge_rejects_unsupported_method() {
        let handler = Handler::context(Echo).into_lambda();
        let event = LambdaEvent {
            http_method: "TRACE".to_string(),
            ..LambdaEvent::default()
        };
        let err = handler.call(event).await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported method: TRACE");
    }
}
