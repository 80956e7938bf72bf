use async_trait::async_trait;
use serde_json::json;

use super::common;
use crate::adapter::{ContextHandler, InvocationContext};
use crate::core::models::{AzureRequest, ContextResult};
use crate::errors::HandlerError;

/// Context-style sample. Leaves the status unset so it falls back to 200.
pub struct AzureHello;

#[async_trait]
impl ContextHandler for AzureHello {
    async fn call(
        &self,
        context: &mut InvocationContext,
        _req: AzureRequest,
    ) -> Result<(), HandlerError> {
        context.log("HTTP trigger function processed a request.");
        context.res = ContextResult::body(json!({ "message": common::hello() }));
        Ok(())
    }
}
