use crate::reconcile::ReconcileKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_api::query::{OrderParam, PaginationParam, Status};

/// 菜单隐藏
pub const HIDDEN: i32 = 1;
/// 菜单显示
pub const VISIBLE: i32 = -1;

fn default_hidden() -> i32 {
    VISIBLE
}

/// 菜单
/// `parent_path` 是祖先ID用 `/` 连接的物化路径，根节点为空串
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Menu {
    #[serde(default)]
    pub id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub router: String,
    #[serde(default)]
    pub component: String,
    #[serde(default, deserialize_with = "crate::empty_string_as_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub parent_path: String,
    #[serde(default = "default_hidden")]
    #[validate(range(min = -1, max = 1))]
    pub hidden: i32,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub actions: Vec<MenuAction>,
}

impl Menu {
    /// 子节点的 `parent_path`
    pub fn child_path(&self) -> String {
        crate::menu::join_parent_path(&self.parent_path, &self.id)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// 菜单动作，`code` 在同一菜单内唯一
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MenuAction {
    pub id: String,
    pub menu_id: String,
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(nested)]
    pub resources: Vec<MenuActionResource>,
}

impl ReconcileKey for MenuAction {
    type Key = String;

    fn reconcile_key(&self) -> String {
        self.code.clone()
    }
}

/// 动作绑定的HTTP资源，在同一动作内按 (method, path) 唯一
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MenuActionResource {
    pub id: String,
    pub action_id: String,
    #[validate(length(min = 1, max = 16))]
    pub method: String,
    #[validate(length(min = 1, max = 255))]
    pub path: String,
}

impl ReconcileKey for MenuActionResource {
    type Key = (String, String);

    fn reconcile_key(&self) -> (String, String) {
        (self.method.to_ascii_uppercase(), self.path.clone())
    }
}

/// 菜单树节点
/// 也用作初始化菜单文件（YAML）的格式，此时只需要名称、展示字段、动作和子节点
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuTree {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub router: String,
    pub component: String,
    #[serde(deserialize_with = "crate::empty_string_as_none")]
    pub parent_id: Option<String>,
    pub parent_path: String,
    pub sequence: i32,
    #[serde(default = "default_hidden")]
    pub hidden: i32,
    pub status: Status,
    pub actions: Vec<MenuAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuTree>,
}

impl From<Menu> for MenuTree {
    fn from(menu: Menu) -> Self {
        Self {
            id: menu.id,
            name: menu.name,
            icon: menu.icon,
            router: menu.router,
            component: menu.component,
            parent_id: menu.parent_id,
            parent_path: menu.parent_path,
            sequence: menu.sequence,
            hidden: menu.hidden,
            status: menu.status,
            actions: menu.actions,
            children: Vec::new(),
        }
    }
}

impl MenuTree {
    /// 转换回菜单（不含子节点）
    pub fn to_menu(&self) -> Menu {
        Menu {
            id: self.id.clone(),
            name: self.name.clone(),
            sequence: self.sequence,
            icon: self.icon.clone(),
            router: self.router.clone(),
            component: self.component.clone(),
            parent_id: self.parent_id.clone(),
            parent_path: self.parent_path.clone(),
            hidden: self.hidden,
            status: self.status,
            actions: self.actions.clone(),
            ..Default::default()
        }
    }
}

/// 菜单查询参数
#[derive(Debug, Clone, Default)]
pub struct MenuQuery {
    pub pagination: PaginationParam,
    pub order: OrderParam,
    /// 为空表示不过滤
    pub ids: Vec<String>,
    pub name: Option<String>,
    pub parent_id: Option<String>,
    /// 只查根节点
    pub roots_only: bool,
    /// 查询某路径下的全部后代
    pub descendants_of: Option<String>,
    pub hidden: Option<i32>,
    pub status: Option<Status>,
    /// 模糊匹配名称或备注
    pub query_value: Option<String>,
    pub include_actions: bool,
}

/// 菜单动作查询参数
#[derive(Debug, Clone, Default)]
pub struct MenuActionQuery {
    pub pagination: PaginationParam,
    pub order: OrderParam,
    pub menu_id: Option<String>,
    pub menu_ids: Vec<String>,
    pub ids: Vec<String>,
}

/// 动作资源查询参数
#[derive(Debug, Clone, Default)]
pub struct MenuActionResourceQuery {
    pub pagination: PaginationParam,
    pub order: OrderParam,
    pub menu_id: Option<String>,
    pub menu_ids: Vec<String>,
    pub action_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_defaults_from_json() {
        let menu: Menu = serde_json::from_str(r#"{"name":"系统管理","parent_id":""}"#).unwrap();
        assert_eq!(menu.parent_id, None);
        assert_eq!(menu.hidden, VISIBLE);
        assert_eq!(menu.status, Status::Enabled);
        assert!(menu.validate().is_ok());
    }

    #[test]
    fn test_menu_validation() {
        let menu = Menu {
            name: String::new(),
            hidden: 3,
            ..Default::default()
        };
        let errors = menu.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("hidden"));
    }

    #[test]
    fn test_resource_key_ignores_method_case() {
        let a = MenuActionResource {
            method: "get".to_string(),
            path: "/api/v1/menus".to_string(),
            ..Default::default()
        };
        let b = MenuActionResource {
            method: "GET".to_string(),
            path: "/api/v1/menus".to_string(),
            ..Default::default()
        };
        assert_eq!(a.reconcile_key(), b.reconcile_key());
    }

    #[test]
    fn test_menu_tree_from_yaml() {
        let yaml = r#"
- name: 系统管理
  icon: setting
  sequence: 10
  children:
    - name: 菜单管理
      router: /system/menu
      actions:
        - code: add
          name: 新增
          resources:
            - method: POST
              path: /api/v1/menus
"#;
        let trees: Vec<MenuTree> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].hidden, VISIBLE);
        assert_eq!(trees[0].children[0].actions[0].resources[0].path, "/api/v1/menus");
    }
}
