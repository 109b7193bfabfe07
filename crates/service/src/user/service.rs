use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use models::user::{self, NewUser, UserChanges, UserFilter};

use crate::errors::ServiceError;
use crate::user::repository::UserRepository;

/// Application service for users, same contract as the task service.
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i32) -> Result<Option<user::Model>, ServiceError> {
        self.repo.get(id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewUser) -> Result<user::Model, ServiceError> {
        let created = self.repo.create(input, Utc::now().fixed_offset()).await?;
        info!(id = created.id, "user_created");
        Ok(created)
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<user::Model, ServiceError> {
        let updated = self
            .repo
            .update(id, changes, Utc::now().fixed_offset())
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))?;
        info!(id, "user_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if self.repo.delete(id).await? {
            info!(id, "user_deleted");
        } else {
            debug!(id, "user_delete_noop");
        }
        Ok(())
    }

    pub async fn find_by_filter(&self, filter: &UserFilter) -> Result<Vec<user::Model>, ServiceError> {
        if filter.is_empty() {
            return self.repo.list().await;
        }
        self.repo.find(filter).await
    }
}
