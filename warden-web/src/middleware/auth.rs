use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use warden_api::AuthenticatedUser;

use crate::response::ApiError;
use crate::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// 认证中间件
/// 校验 Bearer 令牌，将用户信息注入请求扩展；忽略前缀下的路径直接放行
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let options = &state.options;
    if !options.auth_enable {
        // 认证关闭时按超级管理员处理
        let user = AuthenticatedUser::new(options.super_admin.clone(), options.super_admin.clone());
        request.extensions_mut().insert(user);
        return next.run(request).await;
    }
    if options.skips_auth(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(&request) else {
        return ApiError::unauthorized("missing bearer token").into_response();
    };
    match state.auth_service.authenticate(token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}
