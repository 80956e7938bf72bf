/// Starless - write an HTTP function once, run it locally, on AWS Lambda and
/// on Azure Functions.
///
/// A function is written in one of two calling conventions and registered
/// under a name from the project's `template.json`:
/// 1. Lambda style: takes an API Gateway proxy event, returns a proxy result
/// 2. Context style: takes a context and a request, reports its result by
///    setting `context.res`
///
/// # Architecture
///
/// The crate is built around a small adapter:
/// - `adapter` normalizes incoming envelopes (Lambda event, Azure request,
///   local request) and results from either convention
/// - `server` serves every route under `/api/` for local development
/// - `api` and `azure` are the AWS Lambda and Azure custom handler entrypoints
/// - `scaffold` and `build` generate and package TypeScript projects
///
/// # Example
///
/// ```no_run
/// use starless::core::config::AppConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     starless::setup_logging();
///
///     let config = AppConfig::default();
///     let table = starless::functions::route_table(&config)?;
///     for line in table.listing(&config.local_base_url()) {
///         println!("{line}");
///     }
///     starless::server::serve(config, table).await?;
///     Ok(())
/// }
/// ```
// Module declarations
pub mod adapter;
pub mod api;
pub mod azure;
pub mod build;
pub mod cli;
pub mod core;
pub mod errors;
pub mod functions;
pub mod process;
pub mod routes;
pub mod scaffold;
pub mod server;
pub mod template;
pub mod utils;

/// Configure structured logging with JSON format for the cloud entrypoints.
///
/// Sets up tracing-subscriber with a JSON formatter suitable for `CloudWatch`
/// Logs and Application Insights. Call it once at the start of the process.
///
/// # Example
///
/// ```
/// starless::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
