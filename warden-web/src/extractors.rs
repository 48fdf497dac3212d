use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::ops::Deref;
use std::sync::Arc;
use warden_api::AuthenticatedUser;
use warden_infra::TransactionScope;

use crate::response::ApiError;

/// 当前用户提取器
/// 从请求扩展中提取已认证的用户信息
pub struct CurrentUser(pub AuthenticatedUser);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("authentication required"))
    }
}

/// 请求的事务作用域，由事务中间件放入扩展
#[derive(Clone)]
pub struct Tx(pub Arc<TransactionScope>);

impl Deref for Tx {
    type Target = TransactionScope;

    fn deref(&self) -> &TransactionScope {
        &self.0
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Tx
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Tx>()
            .cloned()
            .ok_or_else(|| ApiError::internal("transaction scope missing"))
    }
}
