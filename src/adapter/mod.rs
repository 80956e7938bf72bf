//! Request/response adaptation between Lambda events, Azure Functions
//! contexts and local development requests.

pub mod bridge;
pub mod dispatch;
pub mod envelope;
pub mod handler;
pub mod response;

pub use dispatch::{DispatchState, Invocation, dispatch};
pub use envelope::{Envelope, HttpMethod, NormalizedEvent};
pub use handler::{ContextHandler, Handler, HandlerStyle, InvocationContext, LambdaHandler};
pub use response::{HandlerOutput, HttpResponse, ResponseBody};
