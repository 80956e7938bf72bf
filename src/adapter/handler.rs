//! The two handler calling conventions.
//!
//! A handler either returns its result (Lambda style) or writes it into the
//! invocation context (context style). The convention is fixed when the
//! handler is registered.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use super::bridge::{ContextAsLambda, LambdaAsContext};
use crate::core::models::{AzureRequest, ContextResult, LambdaEvent, LambdaResult};
use crate::errors::HandlerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerStyle {
    Lambda,
    Context,
}

/// `(event) -> result` handlers.
#[async_trait]
pub trait LambdaHandler: Send + Sync {
    async fn call(&self, event: LambdaEvent) -> Result<LambdaResult, HandlerError>;
}

/// `(context, request) -> ()` handlers; the result is read from `context.res`.
#[async_trait]
pub trait ContextHandler: Send + Sync {
    async fn call(
        &self,
        context: &mut InvocationContext,
        req: AzureRequest,
    ) -> Result<(), HandlerError>;
}

/// Mutable per-invocation state handed to context-style handlers.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub invocation_id: String,
    pub res: ContextResult,
    logs: Vec<String>,
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

impl InvocationContext {
    #[must_use]
    pub fn new(invocation_id: String) -> Self {
        Self {
            invocation_id,
            res: ContextResult::default(),
            logs: Vec::new(),
        }
    }

    /// Timestamped log line, emitted immediately and kept for hosts that
    /// return logs with the invocation result.
    pub fn log(&mut self, msg: &str) {
        let line = format!(
            "[{}] {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            msg
        );
        info!(invocation_id = %self.invocation_id, "{}", line);
        self.logs.push(line);
    }

    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    #[must_use]
    pub fn into_parts(self) -> (ContextResult, Vec<String>) {
        (self.res, self.logs)
    }
}

/// Adapts a plain async closure into a [`LambdaHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> LambdaHandler for FnHandler<F>
where
    F: Fn(LambdaEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LambdaResult, HandlerError>> + Send + 'static,
{
    async fn call(&self, event: LambdaEvent) -> Result<LambdaResult, HandlerError> {
        (self.0)(event).await
    }
}

/// A registered handler, tagged with its calling convention.
#[derive(Clone)]
pub enum Handler {
    Lambda(Arc<dyn LambdaHandler>),
    Context(Arc<dyn ContextHandler>),
}

impl Handler {
    pub fn lambda<H: LambdaHandler + 'static>(handler: H) -> Self {
        Handler::Lambda(Arc::new(handler))
    }

    pub fn context<H: ContextHandler + 'static>(handler: H) -> Self {
        Handler::Context(Arc::new(handler))
    }

    pub fn lambda_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(LambdaEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LambdaResult, HandlerError>> + Send + 'static,
    {
        Handler::Lambda(Arc::new(FnHandler(f)))
    }

    #[must_use]
    pub fn style(&self) -> HandlerStyle {
        match self {
            Handler::Lambda(_) => HandlerStyle::Lambda,
            Handler::Context(_) => HandlerStyle::Context,
        }
    }

    /// This handler in Lambda convention, bridging context-style ones.
    #[must_use]
    pub fn into_lambda(self) -> Arc<dyn LambdaHandler> {
        match self {
            Handler::Lambda(inner) => inner,
            Handler::Context(inner) => Arc::new(ContextAsLambda::new(inner)),
        }
    }

    /// This handler in context convention, bridging Lambda-style ones.
    #[must_use]
    pub fn into_context(self) -> Arc<dyn ContextHandler> {
        match self {
            Handler::Context(inner) => inner,
            Handler::Lambda(inner) => Arc::new(LambdaAsContext::new(inner)),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.style()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_log_keeps_lines() {
        let mut ctx = InvocationContext::new("inv-1".to_string());
        ctx.log("first");
        ctx.log("second");
        assert_eq!(ctx.logs().len(), 2);
        assert!(ctx.logs()[0].ends_with("] first"));
        assert!(ctx.logs()[1].starts_with('['));
    }

    #[test]
    fn test_fresh_context_result() {
        let ctx = InvocationContext::default();
        let (res, logs) = ctx.into_parts();
        assert_eq!(res.status, Some(200));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_handler_style_tag() {
        let handler = Handler::lambda_fn(|_event| async {
            Ok::<_, HandlerError>(LambdaResult::json(200, &serde_json::json!({})))
        });
        assert_eq!(handler.style(), HandlerStyle::Lambda);
        assert_eq!(format!("{handler:?}"), "Handler(Lambda)");
    }
}
