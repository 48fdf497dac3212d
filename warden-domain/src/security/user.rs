use crate::reconcile::ReconcileKey;
use crate::security::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_api::query::{OrderParam, PaginationParam, Status};

/// 用户
/// `password` 输入时是明文，存储时是哈希，从不序列化输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub realname: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_roles: Vec<UserRole>,
}

/// 用户角色关联
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRole {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
}

impl ReconcileKey for UserRole {
    type Key = String;

    fn reconcile_key(&self) -> String {
        self.role_id.clone()
    }
}

/// 当前用户信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub realname: String,
    pub roles: Vec<Role>,
}

/// 用户查询参数
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub pagination: PaginationParam,
    pub order: OrderParam,
    pub username: Option<String>,
    /// 前缀匹配
    pub realname: Option<String>,
    pub status: Option<Status>,
    /// 持有其中任一角色的用户
    pub role_ids: Vec<String>,
    pub query_value: Option<String>,
    /// 是否读取密码哈希
    pub with_password: bool,
}

/// 用户角色查询参数
#[derive(Debug, Clone, Default)]
pub struct UserRoleQuery {
    pub pagination: PaginationParam,
    pub order: OrderParam,
    pub user_id: Option<String>,
    pub user_ids: Vec<String>,
    pub role_id: Option<String>,
}
