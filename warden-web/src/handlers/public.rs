use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use warden_domain::menu::MenuTree;
use warden_domain::security::UserInfo;
use warden_service::security::LoginToken;

use crate::extractors::{CurrentUser, Tx};
use crate::response::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录
/// POST /api/v1/publics/user/login
pub async fn login(
    State(state): State<AppState>,
    tx: Tx,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginToken> {
    let token = state
        .auth_service
        .login(&tx, &request.username, &request.password)
        .await?;
    Ok(ApiResponse::ok(token))
}

/// 当前用户信息
/// GET /api/v1/publics/user
pub async fn user_info(
    State(state): State<AppState>,
    tx: Tx,
    CurrentUser(user): CurrentUser,
) -> ApiResult<UserInfo> {
    Ok(ApiResponse::ok(state.user_service.get_user_info(&tx, &user.id).await?))
}

/// 当前用户的菜单树
/// GET /api/v1/publics/user/menutree
pub async fn menu_tree(
    State(state): State<AppState>,
    tx: Tx,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<MenuTree>> {
    Ok(ApiResponse::ok(state.user_service.get_user_menu_trees(&tx, &user.id).await?))
}
