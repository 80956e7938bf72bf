use async_trait::async_trait;
use serde_json::json;

use super::common;
use crate::adapter::LambdaHandler;
use crate::core::models::{LambdaEvent, LambdaResult};
use crate::errors::HandlerError;

/// Lambda-style sample: always answers `{"message": "Hello"}`.
pub struct Hello;

#[async_trait]
impl LambdaHandler for Hello {
    async fn call(&self, _event: LambdaEvent) -> Result<LambdaResult, HandlerError> {
        Ok(LambdaResult::json(200, &json!({ "message": common::hello() })))
    }
}
