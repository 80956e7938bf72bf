use tracing::{Instrument, error, info_span};

use super::envelope::{Envelope, NormalizedEvent};
use super::handler::{Handler, InvocationContext};
use super::response::{HandlerOutput, HttpResponse};
use crate::errors::HandlerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Invoking,
    Succeeded,
    Failed,
}

/// One handler invocation: `Idle -> Invoking -> {Succeeded, Failed}`.
///
/// There is no retry, timeout or cancellation; a failed invocation surfaces the
/// handler's error unchanged.
pub struct Invocation<'a> {
    handler: &'a Handler,
    state: DispatchState,
    base_url: Option<String>,
    id: String,
}

impl<'a> Invocation<'a> {
    #[must_use]
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            handler,
            state: DispatchState::Idle,
            base_url: None,
            id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Prefix used to build the absolute `url` seen by context-style handlers.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// # Errors
    ///
    /// Propagates whatever the handler fails with. Running an invocation twice
    /// is rejected.
    pub async fn run(&mut self, event: NormalizedEvent) -> Result<HandlerOutput, HandlerError> {
        if self.state != DispatchState::Idle {
            return Err(HandlerError::Failed(format!(
                "invocation {} already ran",
                self.id
            )));
        }
        self.state = DispatchState::Invoking;

        let span = info_span!("invoke", invocation_id = %self.id, path = %event.path, method = %event.method);
        let outcome = match self.handler {
            Handler::Lambda(inner) => {
                let lambda_event = event.into_lambda_event();
                inner
                    .call(lambda_event)
                    .instrument(span)
                    .await
                    .map(HandlerOutput::Lambda)
            }
            Handler::Context(inner) => {
                let req = event.into_azure_request(self.base_url.as_deref());
                let mut context = InvocationContext::new(self.id.clone());
                inner
                    .call(&mut context, req)
                    .instrument(span)
                    .await
                    .map(|()| HandlerOutput::Context(context.res))
            }
        };

        self.state = match &outcome {
            Ok(_) => DispatchState::Succeeded,
            Err(e) => {
                error!(invocation_id = %self.id, "Handler invocation failed: {}", e);
                DispatchState::Failed
            }
        };
        outcome
    }
}

/// Normalizes `envelope`, invokes `handler` and normalizes its result.
///
/// # Errors
///
/// Returns the normalization error (e.g. unsupported method) or the handler's
/// own failure.
pub async fn dispatch(
    handler: &Handler,
    envelope: Envelope,
    base_url: Option<&str>,
) -> Result<HttpResponse, HandlerError> {
    let event = envelope.normalize()?;
    let mut invocation = Invocation::new(handler);
    if let Some(base) = base_url {
        invocation = invocation.with_base_url(base);
    }
    let output = invocation.run(event).await?;
    Ok(output.into_http_response())
}
