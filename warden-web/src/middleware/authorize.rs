use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use warden_api::AuthenticatedUser;

use crate::response::ApiError;
use crate::AppState;

/// 授权中间件
///
/// 用 (用户ID, 路由模板, 方法) 询问执行器。路由模板取自 [`MatchedPath`]，
/// 所以资源登记的是 `/api/v1/menus/:id` 这样的路径；没有匹配路由时用原始路径。
pub async fn authorize_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !state.options.policy_enable || state.options.skips_policy(path) {
        return next.run(request).await;
    }

    let Some(user) = request.extensions().get::<AuthenticatedUser>() else {
        return ApiError::unauthorized("authentication required").into_response();
    };
    let resource = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str())
        .unwrap_or(path);
    let method = request.method().as_str();

    let decision = state.enforcer.enforce(&user.id, resource, method);
    if !decision.allowed {
        tracing::debug!(
            user = %user.id,
            path = %resource,
            method = %method,
            reason = ?decision.reason,
            "request denied"
        );
        return ApiError::forbidden().into_response();
    }

    next.run(request).await
}
