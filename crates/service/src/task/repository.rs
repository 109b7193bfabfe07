use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::DatabaseConnection;

use models::task::{self, NewTask, TaskChanges, TaskFilter};

use crate::errors::ServiceError;

/// Persistence collaborator for tasks. Timestamps are chosen by the caller.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<task::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<task::Model>, ServiceError>;
    async fn create(&self, input: NewTask, created_at: DateTimeWithTimeZone) -> Result<task::Model, ServiceError>;
    /// `Ok(None)` when the id does not exist.
    async fn update(
        &self,
        id: i32,
        changes: TaskChanges,
        updated_at: DateTimeWithTimeZone,
    ) -> Result<Option<task::Model>, ServiceError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn find(&self, filter: &TaskFilter) -> Result<Vec<task::Model>, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmTaskRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    async fn list(&self) -> Result<Vec<task::Model>, ServiceError> {
        Ok(task::list(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<task::Model>, ServiceError> {
        Ok(task::find(&self.db, id).await?)
    }

    async fn create(&self, input: NewTask, created_at: DateTimeWithTimeZone) -> Result<task::Model, ServiceError> {
        Ok(task::create(&self.db, input, created_at).await?)
    }

    async fn update(
        &self,
        id: i32,
        changes: TaskChanges,
        updated_at: DateTimeWithTimeZone,
    ) -> Result<Option<task::Model>, ServiceError> {
        Ok(task::apply_changes(&self.db, id, changes, updated_at).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(task::delete(&self.db, id).await?)
    }

    async fn find(&self, filter: &TaskFilter) -> Result<Vec<task::Model>, ServiceError> {
        Ok(task::find_filtered(&self.db, filter).await?)
    }
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct Rows {
        by_id: BTreeMap<i32, task::Model>,
        next_id: i32,
    }

    #[derive(Default)]
    pub struct InMemoryTaskRepository {
        rows: Mutex<Rows>,
        /// When set, every call fails like an unreachable store.
        pub unavailable: bool,
    }

    impl InMemoryTaskRepository {
        pub fn failing() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        fn rows(&self) -> Result<MutexGuard<'_, Rows>, ServiceError> {
            if self.unavailable {
                return Err(ServiceError::Db("store unavailable".into()));
            }
            self.rows
                .lock()
                .map_err(|_| ServiceError::Db("store lock poisoned".into()))
        }
    }

    #[async_trait]
    impl TaskRepository for InMemoryTaskRepository {
        async fn list(&self) -> Result<Vec<task::Model>, ServiceError> {
            Ok(self.rows()?.by_id.values().cloned().collect())
        }

        async fn get(&self, id: i32) -> Result<Option<task::Model>, ServiceError> {
            Ok(self.rows()?.by_id.get(&id).cloned())
        }

        async fn create(&self, input: NewTask, created_at: DateTimeWithTimeZone) -> Result<task::Model, ServiceError> {
            let mut rows = self.rows()?;
            rows.next_id += 1;
            let row = task::Model {
                id: rows.next_id,
                title: input.title,
                description: input.description,
                completed: input.completed,
                created_at,
                updated_at: None,
            };
            rows.by_id.insert(row.id, row.clone());
            Ok(row)
        }

        async fn update(
            &self,
            id: i32,
            changes: TaskChanges,
            updated_at: DateTimeWithTimeZone,
        ) -> Result<Option<task::Model>, ServiceError> {
            let mut rows = self.rows()?;
            let Some(row) = rows.by_id.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(t) = changes.title {
                row.title = t;
            }
            if let Some(d) = changes.description {
                row.description = d;
            }
            if let Some(c) = changes.completed {
                row.completed = c;
            }
            row.updated_at = Some(updated_at);
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.rows()?.by_id.remove(&id).is_some())
        }

        async fn find(&self, filter: &TaskFilter) -> Result<Vec<task::Model>, ServiceError> {
            let rows = self.rows()?;
            Ok(rows.by_id.values().filter(|t| filter.matches(t)).cloned().collect())
        }
    }
}
