use crate::config::AppConfig;

pub async fn handle(config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Escola API in {:?} mode", config.environment);
    crate::server::serve(config).await
}
