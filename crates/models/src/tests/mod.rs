/// CRUD operations tests for both entities
pub mod crud_tests;

use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::{connect_with_config, sqlite_config};

/// Fresh migrated SQLite database in the temp dir, one per test.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let path = std::env::temp_dir().join(format!("taskdesk_models_{}.db", Uuid::new_v4()));
    let db = connect_with_config(&sqlite_config(&path)).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
