use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::DatabaseConnection;

use models::user::{self, NewUser, UserChanges, UserFilter};

use crate::errors::ServiceError;

/// Persistence collaborator for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<user::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<user::Model>, ServiceError>;
    async fn create(&self, input: NewUser, created_at: DateTimeWithTimeZone) -> Result<user::Model, ServiceError>;
    async fn update(
        &self,
        id: i32,
        changes: UserChanges,
        updated_at: DateTimeWithTimeZone,
    ) -> Result<Option<user::Model>, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn find(&self, filter: &UserFilter) -> Result<Vec<user::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::list(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::find(&self.db, id).await?)
    }

    async fn create(&self, input: NewUser, created_at: DateTimeWithTimeZone) -> Result<user::Model, ServiceError> {
        Ok(user::create(&self.db, input, created_at).await?)
    }

    async fn update(
        &self,
        id: i32,
        changes: UserChanges,
        updated_at: DateTimeWithTimeZone,
    ) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::apply_changes(&self.db, id, changes, updated_at).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(user::delete(&self.db, id).await?)
    }

    async fn find(&self, filter: &UserFilter) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::find_filtered(&self.db, filter).await?)
    }
}
