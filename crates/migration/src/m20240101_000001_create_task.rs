//! Create `task` table.
//!
//! Ids are store-assigned; `updated_at` stays NULL until the first update.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(pk_auto(Task::Id))
                    .col(string_len(Task::Title, 255).not_null())
                    .col(ColumnDef::new(Task::Description).text().null())
                    .col(boolean(Task::Completed).not_null().default(false))
                    .col(timestamp_with_time_zone(Task::CreatedAt).not_null())
                    // Explicitly nullable, see note on `user.updated_at`
                    .col(
                        ColumnDef::new(Task::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Task::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Task { Table, Id, Title, Description, Completed, CreatedAt, UpdatedAt }
