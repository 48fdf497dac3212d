use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use warden_api::query::{OrderParam, Status};
use warden_domain::menu::{to_tree, Menu, MenuAction, MenuQuery};

use super::{status_filter, CreatedId, PageParams, UpdateBody};
use crate::extractors::{CurrentUser, Tx};
use crate::response::{ApiError, ApiResponse, ApiResult};
use crate::AppState;

/// 菜单列表过滤条件
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MenuFilter {
    pub name: Option<String>,
    pub query_value: Option<String>,
    pub parent_id: Option<String>,
    pub parent_path: Option<String>,
    pub status: Option<i32>,
    pub hidden: Option<i32>,
    pub include_actions: bool,
    /// 以树形返回
    pub tree: bool,
}

/// GET /api/v1/menus
pub async fn query(
    State(state): State<AppState>,
    tx: Tx,
    Query(page): Query<PageParams>,
    Query(filter): Query<MenuFilter>,
) -> Result<Response, ApiError> {
    let param = MenuQuery {
        pagination: page.pagination(),
        order: page.order_or(OrderParam::asc("sequence")),
        name: filter.name,
        query_value: filter.query_value,
        parent_id: filter.parent_id.filter(|id| !id.is_empty()),
        descendants_of: filter.parent_path.filter(|p| !p.is_empty()),
        status: status_filter(filter.status),
        hidden: filter.hidden.filter(|h| *h != 0),
        include_actions: filter.include_actions,
        ..Default::default()
    };
    let result = state.menu_service.query(&tx, &param).await?;
    if filter.tree {
        return Ok(ApiResponse::ok(to_tree(result.list)).into_response());
    }
    Ok(ApiResponse::ok(result).into_response())
}

/// GET /api/v1/menus/:id
pub async fn get(State(state): State<AppState>, tx: Tx, Path(id): Path<String>) -> ApiResult<Menu> {
    Ok(ApiResponse::ok(state.menu_service.get(&tx, &id).await?))
}

/// POST /api/v1/menus
pub async fn create(
    State(state): State<AppState>,
    tx: Tx,
    CurrentUser(user): CurrentUser,
    Json(mut menu): Json<Menu>,
) -> ApiResult<CreatedId> {
    menu.created_by = user.id;
    let id = state.menu_service.create(&tx, menu).await?;
    Ok(ApiResponse::ok(CreatedId { id }))
}

/// PUT /api/v1/menus/:id
pub async fn update(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody<Menu>>,
) -> ApiResult<()> {
    state.menu_service.update(&tx, &id, body.item).await?;
    if let Some(status) = body.status {
        state.menu_service.update_status(&tx, &id, status).await?;
    }
    Ok(ApiResponse::done())
}

/// DELETE /api/v1/menus/:id
pub async fn delete(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.menu_service.delete(&tx, &id).await?;
    Ok(ApiResponse::done())
}

/// PATCH /api/v1/menus/:id/enable
pub async fn enable(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.menu_service.update_status(&tx, &id, Status::Enabled).await?;
    Ok(ApiResponse::done())
}

/// PATCH /api/v1/menus/:id/disable
pub async fn disable(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.menu_service.update_status(&tx, &id, Status::Disabled).await?;
    Ok(ApiResponse::done())
}

/// GET /api/v1/menus/:id/actions
pub async fn get_actions(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
) -> ApiResult<Vec<MenuAction>> {
    Ok(ApiResponse::ok(state.menu_service.get_actions(&tx, &id).await?))
}

/// PUT /api/v1/menus/:id/actions
pub async fn update_actions(
    State(state): State<AppState>,
    tx: Tx,
    Path(id): Path<String>,
    Json(actions): Json<Vec<MenuAction>>,
) -> ApiResult<()> {
    state.menu_service.update_actions(&tx, &id, actions).await?;
    Ok(ApiResponse::done())
}
