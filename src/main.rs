use escola_api::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ESCOLA_STORE, etc.
    let _ = dotenvy::dotenv();

    escola_api::init_tracing();

    let config = config::config();
    tracing::info!("Starting Escola API in {:?} mode", config.environment);

    escola_api::server::serve(config).await
}
