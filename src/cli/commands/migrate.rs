use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.backend != StoreBackend::Postgres {
        anyhow::bail!("migrations need the postgres store (ESCOLA_STORE=postgres)");
    }

    // Connect without the automatic run so the migration result is reported here
    let mut database = config.database.clone();
    database.run_migrations = false;
    let pool = DatabaseManager::connect(&database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "migrated": true })),
        OutputFormat::Text => println!("Migrations applied"),
    }
    Ok(())
}
