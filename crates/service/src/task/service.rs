use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use models::task::{self, NewTask, TaskChanges, TaskFilter};
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::errors::ServiceError;
use crate::task::repository::TaskRepository;

/// Application service for tasks. Holds no cache; the repository owns every row.
pub struct TaskService<R: TaskRepository> {
    repo: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<task::Model>, ServiceError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i32) -> Result<Option<task::Model>, ServiceError> {
        self.repo.get(id).await
    }

    /// Insert a task stamped with the current UTC time; the store assigns the id.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::task::{repository::mock::InMemoryTaskRepository, service::TaskService};
    /// use models::task::NewTask;
    /// let svc = TaskService::new(Arc::new(InMemoryTaskRepository::default()));
    /// let created = tokio_test::block_on(svc.create(NewTask::titled("Task 1"))).unwrap();
    /// assert_eq!(created.title, "Task 1");
    /// ```
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: NewTask) -> Result<task::Model, ServiceError> {
        let created = self.repo.create(input, Utc::now().fixed_offset()).await?;
        info!(id = created.id, "task_created");
        Ok(created)
    }

    /// Copy the provided fields onto an existing task.
    /// A missing id is `NotFound` and nothing gets inserted.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: TaskChanges) -> Result<task::Model, ServiceError> {
        let updated = self
            .repo
            .update(id, changes, Utc::now().fixed_offset())
            .await?
            .ok_or_else(|| ServiceError::not_found("task"))?;
        info!(id, "task_updated");
        Ok(updated)
    }

    /// Idempotent delete: a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existed = self.repo.delete(id).await?;
        if existed {
            info!(id, "task_deleted");
        } else {
            debug!(id, "task_delete_noop");
        }
        Ok(())
    }

    pub async fn find_by_filter(&self, filter: &TaskFilter) -> Result<Vec<task::Model>, ServiceError> {
        if filter.is_empty() {
            return self.repo.list().await;
        }
        self.repo.find(filter).await
    }

    pub async fn completed(&self) -> Result<Vec<task::Model>, ServiceError> {
        self.by_status(true).await
    }

    pub async fn pending(&self) -> Result<Vec<task::Model>, ServiceError> {
        self.by_status(false).await
    }

    pub async fn by_status(&self, completed: bool) -> Result<Vec<task::Model>, ServiceError> {
        let filter = TaskFilter {
            completed: Some(completed),
            ..Default::default()
        };
        self.repo.find(&filter).await
    }

    /// Case-sensitive title search.
    pub async fn search(&self, keyword: &str) -> Result<Vec<task::Model>, ServiceError> {
        let filter = TaskFilter {
            keyword: Some(keyword.to_string()),
            ..Default::default()
        };
        self.repo.find(&filter).await
    }

    /// Tasks created within `[start, end]`.
    pub async fn created_between(
        &self,
        start: DateTimeWithTimeZone,
        end: DateTimeWithTimeZone,
    ) -> Result<Vec<task::Model>, ServiceError> {
        let filter = TaskFilter {
            from: Some(start),
            to: Some(end),
            ..Default::default()
        };
        self.repo.find(&filter).await
    }
}
