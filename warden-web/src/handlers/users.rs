use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use warden_api::query::{OrderParam, QueryResult, Status};
use warden_domain::security::{User, UserQuery};

use super::{status_filter, CreatedId, PageParams, UpdateBody};
use crate::extractors::{CurrentUser, Tx};
use crate::response::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    pub username: Option<String>,
    pub realname: Option<String>,
    pub query_value: Option<String>,
    pub status: Option<i32>,
    /// 逗号分隔的角色ID
    pub role_ids: Option<String>,
}

/// GET /api/v1/users
pub async fn query(
    State(state): State<AppState>,
    tx: Tx,
    Query(page): Query<PageParams>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<QueryResult<User>> {
    let role_ids = filter
        .role_ids
        .as_deref()
        .map(|ids| {
            ids.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let param = UserQuery {
        pagination: page.pagination(),
        order: page.order_or(OrderParam::default()),
        username: filter.username.filter(|u| !u.is_empty()),
        realname: filter.realname.filter(|r| !r.is_empty()),
        query_value: filter.query_value,
        status: status_filter(filter.status),
        role_ids,
        with_password: false,
    };
    Ok(ApiResponse::ok(state.user_service.query(&tx, &param).await?))
}

/// GET /api/v1/users/:id
pub async fn get(State(state): State<AppState>, tx: Tx, Path(id): Path<String>) -> ApiResult<User> {
    Ok(ApiResponse::ok(state.user_service.get(&tx, &id).await?))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    tx: Tx,
    CurrentUser(user): CurrentUser,
    Json(mut new_user): Json<User>,
) -> ApiResult<CreatedId> {
    new_user.created_by = user.id;
    let id = state.user_service.create(&tx, new_user).await?;
    Ok(ApiResponse::ok(CreatedId { id }))
}

/// PUT /api/v1/users/:id
pub async fn update(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody<User>>,
) -> ApiResult<()> {
    state.user_service.update(&tx, &id, body.item).await?;
    if let Some(status) = body.status {
        state.user_service.update_status(&tx, &id, status).await?;
    }
    Ok(ApiResponse::done())
}

/// DELETE /api/v1/users/:id
pub async fn delete(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.user_service.delete(&tx, &id).await?;
    Ok(ApiResponse::done())
}

/// PATCH /api/v1/users/:id/enable
pub async fn enable(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.user_service.update_status(&tx, &id, Status::Enabled).await?;
    Ok(ApiResponse::done())
}

/// PATCH /api/v1/users/:id/disable
pub async fn disable(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.user_service.update_status(&tx, &id, Status::Disabled).await?;
    Ok(ApiResponse::done())
}
