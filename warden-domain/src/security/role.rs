use crate::reconcile::ReconcileKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_api::query::{OrderParam, PaginationParam, Status};

/// 角色
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Role {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(nested)]
    pub role_menus: Vec<RoleMenu>,
}

/// 角色授权：(角色, 菜单, 动作)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RoleMenu {
    pub id: String,
    pub role_id: String,
    #[validate(length(min = 1, max = 36))]
    pub menu_id: String,
    #[validate(length(min = 1, max = 36))]
    pub action_id: String,
}

impl ReconcileKey for RoleMenu {
    type Key = (String, String);

    fn reconcile_key(&self) -> (String, String) {
        (self.menu_id.clone(), self.action_id.clone())
    }
}

/// 角色查询参数
#[derive(Debug, Clone, Default)]
pub struct RoleQuery {
    pub pagination: PaginationParam,
    pub order: OrderParam,
    pub ids: Vec<String>,
    pub name: Option<String>,
    /// 某用户持有的角色
    pub user_id: Option<String>,
    pub status: Option<Status>,
    pub query_value: Option<String>,
}

/// 角色授权查询参数
#[derive(Debug, Clone, Default)]
pub struct RoleMenuQuery {
    pub pagination: PaginationParam,
    pub order: OrderParam,
    pub role_id: Option<String>,
    pub role_ids: Vec<String>,
}
