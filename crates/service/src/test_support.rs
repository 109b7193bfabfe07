#![cfg(test)]
use migration::MigratorTrait;
use models::db::{connect_with_config, sqlite_config};
use sea_orm::DatabaseConnection;

/// Fresh migrated SQLite database per test, so tests never share rows.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("taskdesk_service_{}.db", uuid::Uuid::new_v4()));
    let db = connect_with_config(&sqlite_config(&path)).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
