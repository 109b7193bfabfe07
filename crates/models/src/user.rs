use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Case-sensitive substring filters; unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    pub fn matches(&self, user: &Model) -> bool {
        self.name.as_deref().map_or(true, |n| user.name.contains(n))
            && self.email.as_deref().map_or(true, |e| user.email.contains(e))
    }
}

pub async fn create(
    db: &DatabaseConnection,
    input: NewUser,
    created_at: DateTimeWithTimeZone,
) -> Result<Model, ModelError> {
    let am = ActiveModel {
        name: Set(input.name),
        email: Set(input.email),
        created_at: Set(created_at.with_timezone(&Utc).fixed_offset()),
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

pub async fn find_filtered(db: &DatabaseConnection, filter: &UserFilter) -> Result<Vec<Model>, ModelError> {
    let mut rows = list(db).await?;
    rows.retain(|u| filter.matches(u));
    Ok(rows)
}

pub async fn apply_changes(
    db: &DatabaseConnection,
    id: i32,
    changes: UserChanges,
    updated_at: DateTimeWithTimeZone,
) -> Result<Option<Model>, ModelError> {
    let Some(existing) = Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut am: ActiveModel = existing.into();
    if let Some(n) = changes.name {
        am.name = Set(n);
    }
    if let Some(e) = changes.email {
        am.email = Set(e);
    }
    am.updated_at = Set(Some(updated_at.with_timezone(&Utc).fixed_offset()));
    match am.update(db).await {
        Ok(m) => Ok(Some(m)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
