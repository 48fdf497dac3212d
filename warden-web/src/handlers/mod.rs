pub mod health;
pub mod menus;
pub mod public;
pub mod roles;
pub mod users;

use axum::routing::{get, patch, post};
use axum::Router;
use serde::Deserialize;
use warden_api::query::{OrderParam, PaginationParam, Status};

use crate::AppState;

/// `/api/v1` 下的全部业务路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/publics/user/login", post(public::login))
        .route("/api/v1/publics/user", get(public::user_info))
        .route("/api/v1/publics/user/menutree", get(public::menu_tree))
        .route("/api/v1/menus", get(menus::query).post(menus::create))
        .route(
            "/api/v1/menus/:id",
            get(menus::get).put(menus::update).delete(menus::delete),
        )
        .route("/api/v1/menus/:id/enable", patch(menus::enable))
        .route("/api/v1/menus/:id/disable", patch(menus::disable))
        .route(
            "/api/v1/menus/:id/actions",
            get(menus::get_actions).put(menus::update_actions),
        )
        .route("/api/v1/roles", get(roles::query).post(roles::create))
        .route("/api/v1/roles.all", get(roles::query_all))
        .route(
            "/api/v1/roles/:id",
            get(roles::get).put(roles::update).delete(roles::delete),
        )
        .route("/api/v1/roles/:id/enable", patch(roles::enable))
        .route("/api/v1/roles/:id/disable", patch(roles::disable))
        .route("/api/v1/users", get(users::query).post(users::create))
        .route(
            "/api/v1/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/api/v1/users/:id/enable", patch(users::enable))
        .route("/api/v1/users/:id/disable", patch(users::disable))
}

/// 不经过事务、认证和授权的路由
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}

/// 列表接口共用的分页和排序参数
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub current: Option<u64>,
    pub page_size: Option<u64>,
    pub order_key: Option<String>,
    pub order_direction: Option<String>,
}

impl PageParams {
    pub fn pagination(&self) -> PaginationParam {
        PaginationParam::new(self.current, self.page_size)
    }

    pub fn order_or(&self, default: OrderParam) -> OrderParam {
        match &self.order_key {
            Some(key) if !key.is_empty() => match self.order_direction.as_deref() {
                Some(d) if d.eq_ignore_ascii_case("asc") => OrderParam::asc(key.clone()),
                _ => OrderParam::desc(key.clone()),
            },
            _ => default,
        }
    }
}

/// 0 或缺省表示不过滤
pub(crate) fn status_filter(code: Option<i32>) -> Option<Status> {
    code.filter(|c| *c != 0).map(Status::from_code)
}

/// PUT 请求体：实体字段加可选的 `status`
/// 缺省 `status` 时保持原状态
#[derive(Debug, Deserialize)]
pub struct UpdateBody<T> {
    #[serde(flatten)]
    pub item: T,
    pub status: Option<Status>,
}

#[derive(Debug, serde::Serialize)]
pub struct CreatedId {
    pub id: String,
}
