use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use models::task::{self, NewTask, TaskChanges, TaskFilter};

use crate::errors::JsonApiError;
use crate::observability::record_op;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/api/tasks", tag = "tasks",
    params(
        ("completed" = Option<bool>, Query, description = "Completion flag"),
        ("keyword" = Option<String>, Query, description = "Case-sensitive title substring"),
        ("from" = Option<String>, Query, description = "RFC 3339 lower bound on created_at"),
        ("to" = Option<String>, Query, description = "RFC 3339 upper bound on created_at"),
    ),
    responses((status = 200, description = "Matching tasks", body = [crate::openapi::TaskDoc]))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<task::Model>>, JsonApiError> {
    let rows = state.tasks.find_by_filter(&filter).await?;
    record_op("task", "list");
    info!(count = rows.len(), "list tasks");
    Ok(Json(rows))
}

#[utoipa::path(
    get, path = "/api/tasks/{id}", tag = "tasks",
    params(("id" = i32, Path, description = "Task id")),
    responses((status = 200, body = crate::openapi::TaskDoc), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<task::Model>, JsonApiError> {
    record_op("task", "get");
    match state.tasks.get(id).await? {
        Some(t) => Ok(Json(t)),
        None => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("task {id} not found")))),
    }
}

#[utoipa::path(
    post, path = "/api/tasks", tag = "tasks",
    request_body = crate::openapi::NewTaskDoc,
    responses((status = 200, description = "Created task with its id", body = crate::openapi::TaskDoc))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewTask>,
) -> Result<Json<task::Model>, JsonApiError> {
    let created = state.tasks.create(input).await?;
    record_op("task", "create");
    Ok(Json(created))
}

#[utoipa::path(
    put, path = "/api/tasks/{id}", tag = "tasks",
    params(("id" = i32, Path, description = "Task id")),
    request_body = crate::openapi::TaskChangesDoc,
    responses((status = 200, body = crate::openapi::TaskDoc), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<TaskChanges>,
) -> Result<Json<task::Model>, JsonApiError> {
    let updated = state.tasks.update(id, changes).await?;
    record_op("task", "update");
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/tasks/{id}", tag = "tasks",
    params(("id" = i32, Path, description = "Task id")),
    responses((status = 204, description = "Deleted, or already absent"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.tasks.delete(id).await?;
    record_op("task", "delete");
    Ok(StatusCode::NO_CONTENT)
}
