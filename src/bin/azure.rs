use starless::core::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    starless::setup_logging();
    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    let table = starless::functions::route_table(&config)?;
    starless::azure::serve(config.custom_handler_port, table).await?;
    Ok(())
}
