pub mod entities;
pub mod migrator;
pub mod repositories;

use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseSettings;

/// Connection parameters for the SeaORM pool.
///
/// Built from the `[database]` section of `AppConfig` (which already
/// folded in the `DATABASE_URL` override); there is no other
/// construction path.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            url: settings.url.clone(),
        }
    }
}

/// Open the connection pool.
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(url = %config.url, "Connecting to database");
    let db = Database::connect(&config.url).await?;
    info!("Database connection established");
    Ok(db)
}
