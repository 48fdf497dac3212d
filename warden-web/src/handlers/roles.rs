use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use warden_api::query::{OrderParam, QueryResult, Status};
use warden_domain::security::{Role, RoleQuery};

use super::{status_filter, CreatedId, PageParams, UpdateBody};
use crate::extractors::{CurrentUser, Tx};
use crate::response::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoleFilter {
    pub name: Option<String>,
    pub query_value: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<i32>,
}

/// GET /api/v1/roles
pub async fn query(
    State(state): State<AppState>,
    tx: Tx,
    Query(page): Query<PageParams>,
    Query(filter): Query<RoleFilter>,
) -> ApiResult<QueryResult<Role>> {
    let param = RoleQuery {
        pagination: page.pagination(),
        order: page.order_or(OrderParam::default()),
        name: filter.name,
        query_value: filter.query_value,
        user_id: filter.user_id.filter(|id| !id.is_empty()),
        status: status_filter(filter.status),
        ..Default::default()
    };
    Ok(ApiResponse::ok(state.role_service.query(&tx, &param).await?))
}

/// GET /api/v1/roles.all
pub async fn query_all(State(state): State<AppState>, tx: Tx) -> ApiResult<Vec<Role>> {
    Ok(ApiResponse::ok(state.role_service.query_all(&tx).await?))
}

/// GET /api/v1/roles/:id
pub async fn get(State(state): State<AppState>, tx: Tx, Path(id): Path<String>) -> ApiResult<Role> {
    Ok(ApiResponse::ok(state.role_service.get(&tx, &id).await?))
}

/// POST /api/v1/roles
pub async fn create(
    State(state): State<AppState>,
    tx: Tx,
    CurrentUser(user): CurrentUser,
    Json(mut role): Json<Role>,
) -> ApiResult<CreatedId> {
    role.created_by = user.id;
    let id = state.role_service.create(&tx, role).await?;
    Ok(ApiResponse::ok(CreatedId { id }))
}

/// PUT /api/v1/roles/:id
pub async fn update(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody<Role>>,
) -> ApiResult<()> {
    state.role_service.update(&tx, &id, body.item).await?;
    if let Some(status) = body.status {
        state.role_service.update_status(&tx, &id, status).await?;
    }
    Ok(ApiResponse::done())
}

/// DELETE /api/v1/roles/:id
pub async fn delete(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.role_service.delete(&tx, &id).await?;
    Ok(ApiResponse::done())
}

/// PATCH /api/v1/roles/:id/enable
pub async fn enable(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.role_service.update_status(&tx, &id, Status::Enabled).await?;
    Ok(ApiResponse::done())
}

/// PATCH /api/v1/roles/:id/disable
pub async fn disable(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.role_service.update_status(&tx, &id, Status::Disabled).await?;
    Ok(ApiResponse::done())
}
