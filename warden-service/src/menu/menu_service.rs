use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::Validate;
use warden_api::query::{OrderParam, PaginationParam, QueryResult, Status};
use warden_domain::menu::{
    join_parent_path, split_parent_ids, Menu, MenuAction, MenuActionQuery, MenuActionResource,
    MenuActionResourceQuery, MenuQuery, MenuTree, VISIBLE,
};
use warden_domain::{reconcile, reconcile_by_key, ReconcileKey};
use warden_infra::TransactionScope;

use crate::error::{ServiceError, ServiceResult};
use crate::menu::tree_builder::{compute_parent_path, reparent};

/// 菜单服务trait
/// 所有方法都在调用方传入的事务作用域内执行
#[async_trait]
pub trait MenuService: Send + Sync {
    /// 查询菜单，`include_actions` 时附带动作和资源
    async fn query(
        &self,
        scope: &TransactionScope,
        param: &MenuQuery,
    ) -> ServiceResult<QueryResult<Menu>>;

    /// 获取菜单（含动作和资源）
    async fn get(&self, scope: &TransactionScope, id: &str) -> ServiceResult<Menu>;

    /// 获取菜单的动作（含资源）
    async fn get_actions(
        &self,
        scope: &TransactionScope,
        id: &str,
    ) -> ServiceResult<Vec<MenuAction>>;

    /// 创建菜单，返回新ID
    async fn create(&self, scope: &TransactionScope, menu: Menu) -> ServiceResult<String>;

    /// 按树批量导入，返回创建的菜单数
    async fn create_menus(
        &self,
        scope: &TransactionScope,
        parent_id: Option<&str>,
        trees: &[MenuTree],
    ) -> ServiceResult<usize>;

    /// 更新菜单字段，父节点变化时迁移全部后代路径；状态不变
    async fn update(&self, scope: &TransactionScope, id: &str, menu: Menu) -> ServiceResult<()>;

    /// 用提交的集合整体替换菜单的动作
    async fn update_actions(
        &self,
        scope: &TransactionScope,
        menu_id: &str,
        actions: Vec<MenuAction>,
    ) -> ServiceResult<()>;

    /// 删除菜单（有子节点时拒绝），级联删除动作和资源
    async fn delete(&self, scope: &TransactionScope, id: &str) -> ServiceResult<()>;

    async fn update_status(
        &self,
        scope: &TransactionScope,
        id: &str,
        status: Status,
    ) -> ServiceResult<()>;
}

/// 默认菜单服务实现
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMenuService;

impl DefaultMenuService {
    pub fn new() -> Self {
        Self
    }

    /// 同一父节点下名称唯一
    async fn check_name(
        &self,
        scope: &TransactionScope,
        name: &str,
        parent_id: Option<&str>,
        exclude_id: Option<&str>,
    ) -> ServiceResult<()> {
        let param = MenuQuery {
            name: Some(name.to_string()),
            parent_id: parent_id.map(str::to_string),
            roots_only: parent_id.is_none(),
            pagination: PaginationParam::unpaged(),
            ..Default::default()
        };
        let existing = scope.store().menus().query(&param).await?;
        if existing.list.iter().any(|m| Some(m.id.as_str()) != exclude_id) {
            return Err(ServiceError::Conflict(format!("menu name {name} already exists")));
        }
        Ok(())
    }

    async fn get_menu(&self, scope: &TransactionScope, id: &str) -> ServiceResult<Menu> {
        scope
            .store()
            .menus()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("menu", id))
    }

    /// 读取一批菜单的动作，并挂上资源
    async fn load_actions(
        &self,
        scope: &TransactionScope,
        menu_ids: Vec<String>,
    ) -> ServiceResult<Vec<MenuAction>> {
        if menu_ids.is_empty() {
            return Ok(Vec::new());
        }
        let store = scope.store();
        let actions = store
            .menu_actions()
            .query(&MenuActionQuery {
                menu_ids: menu_ids.clone(),
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("record_id"),
                ..Default::default()
            })
            .await?
            .list;
        let resources = store
            .menu_action_resources()
            .query(&MenuActionResourceQuery {
                menu_ids,
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("record_id"),
                ..Default::default()
            })
            .await?
            .list;

        let mut by_action: HashMap<String, Vec<MenuActionResource>> = HashMap::new();
        for resource in resources {
            by_action.entry(resource.action_id.clone()).or_default().push(resource);
        }
        Ok(actions
            .into_iter()
            .map(|mut action| {
                action.resources = by_action.remove(&action.id).unwrap_or_default();
                action
            })
            .collect())
    }

    async fn create_resources(
        &self,
        scope: &TransactionScope,
        action_id: &str,
        resources: Vec<MenuActionResource>,
    ) -> ServiceResult<()> {
        // 与空集合对账，顺带去掉重复的 (method, path)
        let resources = reconcile(Vec::new(), resources, MenuActionResource::reconcile_key).to_add;
        for mut resource in resources {
            resource.id = Uuid::new_v4().to_string();
            resource.action_id = action_id.to_string();
            scope.store().menu_action_resources().create(&resource).await?;
        }
        Ok(())
    }

    async fn create_action(
        &self,
        scope: &TransactionScope,
        menu_id: &str,
        mut action: MenuAction,
    ) -> ServiceResult<()> {
        action.id = Uuid::new_v4().to_string();
        action.menu_id = menu_id.to_string();
        scope.store().menu_actions().create(&action).await?;
        let resources = std::mem::take(&mut action.resources);
        self.create_resources(scope, &action.id, resources).await
    }

    /// 为新菜单创建动作，编码重复视为冲突
    async fn create_actions(
        &self,
        scope: &TransactionScope,
        menu_id: &str,
        actions: Vec<MenuAction>,
    ) -> ServiceResult<()> {
        let mut codes = HashSet::new();
        for action in &actions {
            if !codes.insert(action.code.as_str()) {
                return Err(ServiceError::Conflict(format!(
                    "duplicate action code {}",
                    action.code
                )));
            }
        }
        for action in actions {
            self.create_action(scope, menu_id, action).await?;
        }
        Ok(())
    }

    async fn delete_action(
        &self,
        scope: &TransactionScope,
        action: &MenuAction,
    ) -> ServiceResult<()> {
        let store = scope.store();
        store.menu_action_resources().delete_by_action_id(&action.id).await?;
        store.menu_actions().delete(&action.id).await?;
        Ok(())
    }
}

#[async_trait]
impl MenuService for DefaultMenuService {
    async fn query(
        &self,
        scope: &TransactionScope,
        param: &MenuQuery,
    ) -> ServiceResult<QueryResult<Menu>> {
        let mut result = scope.store().menus().query(param).await?;
        if !param.include_actions || result.list.is_empty() {
            return Ok(result);
        }

        let menu_ids = result.list.iter().map(|m| m.id.clone()).collect();
        let mut by_menu: HashMap<String, Vec<MenuAction>> = HashMap::new();
        for action in self.load_actions(scope, menu_ids).await? {
            by_menu.entry(action.menu_id.clone()).or_default().push(action);
        }
        for menu in &mut result.list {
            menu.actions = by_menu.remove(&menu.id).unwrap_or_default();
        }
        Ok(result)
    }

    async fn get(&self, scope: &TransactionScope, id: &str) -> ServiceResult<Menu> {
        let mut menu = self.get_menu(scope, id).await?;
        menu.actions = self.load_actions(scope, vec![menu.id.clone()]).await?;
        Ok(menu)
    }

    async fn get_actions(
        &self,
        scope: &TransactionScope,
        id: &str,
    ) -> ServiceResult<Vec<MenuAction>> {
        self.get_menu(scope, id).await?;
        self.load_actions(scope, vec![id.to_string()]).await
    }

    async fn create(&self, scope: &TransactionScope, mut menu: Menu) -> ServiceResult<String> {
        menu.validate()?;
        self.check_name(scope, &menu.name, menu.parent_id.as_deref(), None).await?;

        menu.parent_path = compute_parent_path(scope, menu.parent_id.as_deref()).await?;
        menu.id = Uuid::new_v4().to_string();
        scope.store().menus().create(&menu).await?;

        let actions = std::mem::take(&mut menu.actions);
        self.create_actions(scope, &menu.id, actions).await?;
        scope.request_policy_reload();

        tracing::info!(menu = %menu.id, name = %menu.name, "menu created");
        Ok(menu.id)
    }

    async fn create_menus(
        &self,
        scope: &TransactionScope,
        parent_id: Option<&str>,
        trees: &[MenuTree],
    ) -> ServiceResult<usize> {
        // 显式栈代替递归，逆序压栈保持兄弟顺序
        let mut stack: Vec<(Option<String>, &MenuTree)> =
            trees.iter().rev().map(|t| (parent_id.map(str::to_string), t)).collect();
        let mut created = 0;

        while let Some((parent, tree)) = stack.pop() {
            let menu = Menu {
                name: tree.name.clone(),
                sequence: tree.sequence,
                icon: tree.icon.clone(),
                router: tree.router.clone(),
                component: tree.component.clone(),
                parent_id: parent,
                hidden: if tree.hidden == 0 { VISIBLE } else { tree.hidden },
                status: Status::Enabled,
                actions: tree.actions.clone(),
                ..Default::default()
            };
            let id = self.create(scope, menu).await?;
            created += 1;
            stack.extend(tree.children.iter().rev().map(|child| (Some(id.clone()), child)));
        }

        Ok(created)
    }

    async fn update(
        &self,
        scope: &TransactionScope,
        id: &str,
        mut menu: Menu,
    ) -> ServiceResult<()> {
        menu.validate()?;
        if menu.parent_id.as_deref() == Some(id) {
            return Err(ServiceError::InvariantViolation(
                "menu cannot be its own parent".to_string(),
            ));
        }

        let old = self.get_menu(scope, id).await?;
        let parent_changed = old.parent_id != menu.parent_id;
        if old.name != menu.name || parent_changed {
            self.check_name(scope, &menu.name, menu.parent_id.as_deref(), Some(id)).await?;
        }

        if parent_changed {
            let parent_path = compute_parent_path(scope, menu.parent_id.as_deref()).await?;
            if split_parent_ids(&parent_path).contains(&id) {
                return Err(ServiceError::InvariantViolation(
                    "menu cannot be moved under its own descendant".to_string(),
                ));
            }
            let old_prefix = old.child_path();
            let new_prefix = join_parent_path(&parent_path, id);
            reparent(scope, &old_prefix, &new_prefix).await?;
            menu.parent_path = parent_path;
        } else {
            menu.parent_path = old.parent_path;
        }

        menu.id = old.id;
        menu.status = old.status;
        scope.store().menus().update(id, &menu).await?;
        scope.request_policy_reload();
        Ok(())
    }

    async fn update_actions(
        &self,
        scope: &TransactionScope,
        menu_id: &str,
        actions: Vec<MenuAction>,
    ) -> ServiceResult<()> {
        for action in &actions {
            action.validate()?;
        }
        self.get_menu(scope, menu_id).await?;

        let old = self.load_actions(scope, vec![menu_id.to_string()]).await?;
        let diff = reconcile_by_key(old, actions);

        for action in &diff.to_remove {
            self.delete_action(scope, action).await?;
        }
        for action in diff.to_add {
            self.create_action(scope, menu_id, action).await?;
        }

        // 保留的动作：名称按字段覆盖，资源再按 (method, path) 对账
        let store = scope.store();
        for kept in diff.kept {
            if kept.old.name != kept.new.name {
                store.menu_actions().update(&kept.old.id, &kept.new).await?;
            }
            let resources = reconcile_by_key(kept.old.resources, kept.new.resources);
            for resource in &resources.to_remove {
                store.menu_action_resources().delete(&resource.id).await?;
            }
            self.create_resources(scope, &kept.old.id, resources.to_add).await?;
        }

        scope.request_policy_reload();
        Ok(())
    }

    async fn delete(&self, scope: &TransactionScope, id: &str) -> ServiceResult<()> {
        self.get_menu(scope, id).await?;

        let store = scope.store();
        if store.menus().count_children(id).await? > 0 {
            return Err(ServiceError::InvariantViolation(
                "menu with children cannot be deleted".to_string(),
            ));
        }

        store.menu_action_resources().delete_by_menu_id(id).await?;
        store.menu_actions().delete_by_menu_id(id).await?;
        store.menus().delete(id).await?;
        scope.request_policy_reload();

        tracing::info!(menu = %id, "menu deleted");
        Ok(())
    }

    async fn update_status(
        &self,
        scope: &TransactionScope,
        id: &str,
        status: Status,
    ) -> ServiceResult<()> {
        self.get_menu(scope, id).await?;
        scope.store().menus().update_status(id, status).await?;
        scope.request_policy_reload();
        Ok(())
    }
}
