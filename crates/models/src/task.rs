use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::serde_ext::double_option;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Create input: no id and no timestamps, both are assigned on insert.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Update input. `None` keeps the stored value; a `description` of
/// `Some(None)` (JSON `null`) clears it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

/// Predicate for task listing. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    /// Case-sensitive substring of the title.
    pub keyword: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTimeWithTimeZone>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTimeWithTimeZone>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.keyword.is_none() && self.from.is_none() && self.to.is_none()
    }

    pub fn matches(&self, task: &Model) -> bool {
        self.completed.map_or(true, |c| task.completed == c)
            && self.keyword.as_deref().map_or(true, |k| task.title.contains(k))
            && self.from.map_or(true, |from| task.created_at >= from)
            && self.to.map_or(true, |to| task.created_at <= to)
    }
}

/// Rows are stored in UTC; SQLite compares timestamps as text, so bounds must
/// carry the same `+00:00` offset to order correctly.
fn to_utc(at: DateTimeWithTimeZone) -> DateTimeWithTimeZone {
    at.with_timezone(&Utc).fixed_offset()
}

pub async fn create(
    db: &DatabaseConnection,
    input: NewTask,
    created_at: DateTimeWithTimeZone,
) -> Result<Model, ModelError> {
    let am = ActiveModel {
        title: Set(input.title),
        description: Set(input.description),
        completed: Set(input.completed),
        created_at: Set(to_utc(created_at)),
        updated_at: Set(None),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

/// Rows matching `filter`. The flag and time range go to SQL; the keyword is
/// matched in-process because SQLite `LIKE` ignores ASCII case.
pub async fn find_filtered(db: &DatabaseConnection, filter: &TaskFilter) -> Result<Vec<Model>, ModelError> {
    let mut query = Entity::find();
    if let Some(c) = filter.completed {
        query = query.filter(Column::Completed.eq(c));
    }
    if let Some(from) = filter.from {
        query = query.filter(Column::CreatedAt.gte(to_utc(from)));
    }
    if let Some(to) = filter.to {
        query = query.filter(Column::CreatedAt.lte(to_utc(to)));
    }
    let mut rows = query.order_by_asc(Column::Id).all(db).await?;
    rows.retain(|t| filter.matches(t));
    Ok(rows)
}

/// Copy the provided fields onto the stored row and stamp `updated_at`.
/// Returns `None` when the id does not exist; nothing is inserted.
pub async fn apply_changes(
    db: &DatabaseConnection,
    id: i32,
    changes: TaskChanges,
    updated_at: DateTimeWithTimeZone,
) -> Result<Option<Model>, ModelError> {
    let Some(existing) = Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut am: ActiveModel = existing.into();
    if let Some(t) = changes.title {
        am.title = Set(t);
    }
    if let Some(d) = changes.description {
        am.description = Set(d);
    }
    if let Some(c) = changes.completed {
        am.completed = Set(c);
    }
    am.updated_at = Set(Some(to_utc(updated_at)));
    match am.update(db).await {
        Ok(m) => Ok(Some(m)),
        // deleted between the read and the write
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Delete by id; returns whether a row was removed.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
