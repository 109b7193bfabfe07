use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use models::user::{self, NewUser, UserChanges, UserFilter};

use crate::errors::JsonApiError;
use crate::observability::record_op;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/api/users", tag = "users",
    params(
        ("name" = Option<String>, Query, description = "Case-sensitive name substring"),
        ("email" = Option<String>, Query, description = "Case-sensitive email substring"),
    ),
    responses((status = 200, body = [crate::openapi::UserDoc]))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<user::Model>>, JsonApiError> {
    let rows = state.users.find_by_filter(&filter).await?;
    record_op("user", "list");
    info!(count = rows.len(), "list users");
    Ok(Json(rows))
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, body = crate::openapi::UserDoc), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<user::Model>, JsonApiError> {
    record_op("user", "get");
    state
        .users
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("user {id} not found"))))
}

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = crate::openapi::NewUserDoc,
    responses((status = 200, body = crate::openapi::UserDoc))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> Result<Json<user::Model>, JsonApiError> {
    let created = state.users.create(input).await?;
    record_op("user", "create");
    Ok(Json(created))
}

#[utoipa::path(
    put, path = "/api/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = crate::openapi::UserChangesDoc,
    responses((status = 200, body = crate::openapi::UserDoc), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<user::Model>, JsonApiError> {
    let updated = state.users.update(id, changes).await?;
    record_op("user", "update");
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 204, description = "Deleted, or already absent"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.users.delete(id).await?;
    record_op("user", "delete");
    Ok(StatusCode::NO_CONTENT)
}
