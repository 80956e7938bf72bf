use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use starless::api::handler;
use starless::core::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Error> {
    starless::setup_logging();
    let config = AppConfig::from_env().map_err(Error::from)?;
    let routes = Arc::new(starless::functions::route_table(&config)?);

    run(service_fn(move |event: LambdaEvent<Value>| {
        let routes = Arc::clone(&routes);
        async move { handler(&routes, event).await }
    }))
    .await
}
