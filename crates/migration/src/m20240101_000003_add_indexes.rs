use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Task: completion flag and creation time back the list filters
        manager
            .create_index(
                Index::create()
                    .name("idx_task_completed")
                    .table(Task::Table)
                    .col(Task::Completed)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_task_created_at")
                    .table(Task::Table)
                    .col(Task::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // User: lookups by email
        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_email").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_task_created_at").table(Task::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_task_completed").table(Task::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Task { Table, Completed, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Email }
