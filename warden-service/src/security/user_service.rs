use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
use warden_api::query::{OrderParam, PaginationParam, QueryResult, Status};
use warden_domain::menu::{split_parent_ids, to_tree, Menu, MenuQuery, MenuTree};
use warden_domain::reconcile_by_key;
use warden_domain::security::{
    RoleMenuQuery, RoleQuery, User, UserInfo, UserQuery, UserRole, UserRoleQuery,
};
use warden_infra::TransactionScope;

use crate::error::{ServiceError, ServiceResult};
use crate::security::PasswordService;

/// 超级管理员，来自配置，不落库
/// 身份就是用户名
#[derive(Debug, Clone, Deserialize)]
pub struct SuperAdmin {
    pub username: String,
    #[serde(default)]
    pub realname: String,
    pub password: String,
}

impl SuperAdmin {
    pub fn is(&self, identity: &str) -> bool {
        !self.username.is_empty() && self.username == identity
    }

    fn to_user(&self) -> User {
        User {
            id: self.username.clone(),
            username: self.username.clone(),
            realname: self.realname.clone(),
            status: Status::Enabled,
            ..Default::default()
        }
    }
}

/// 用户服务trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// 查询用户并附带角色关联
    async fn query(
        &self,
        scope: &TransactionScope,
        param: &UserQuery,
    ) -> ServiceResult<QueryResult<User>>;

    async fn get(&self, scope: &TransactionScope, id: &str) -> ServiceResult<User>;

    /// 校验用户名密码，返回登录用户
    async fn verify(
        &self,
        scope: &TransactionScope,
        username: &str,
        password: &str,
    ) -> ServiceResult<User>;

    /// 当前用户信息（含启用的角色）
    async fn get_user_info(&self, scope: &TransactionScope, id: &str) -> ServiceResult<UserInfo>;

    /// 当前用户可见的菜单树
    async fn get_user_menu_trees(
        &self,
        scope: &TransactionScope,
        id: &str,
    ) -> ServiceResult<Vec<MenuTree>>;

    async fn create(&self, scope: &TransactionScope, user: User) -> ServiceResult<String>;

    /// 更新用户，角色按 role_id 对账；密码非空时一并修改；状态不变
    async fn update(&self, scope: &TransactionScope, id: &str, user: User) -> ServiceResult<()>;

    async fn delete(&self, scope: &TransactionScope, id: &str) -> ServiceResult<()>;

    async fn update_status(
        &self,
        scope: &TransactionScope,
        id: &str,
        status: Status,
    ) -> ServiceResult<()>;

    async fn update_password(
        &self,
        scope: &TransactionScope,
        id: &str,
        password: &str,
    ) -> ServiceResult<()>;
}

/// 默认用户服务实现
pub struct DefaultUserService {
    super_admin: SuperAdmin,
    password_service: Arc<dyn PasswordService>,
}

impl DefaultUserService {
    pub fn new(super_admin: SuperAdmin, password_service: Arc<dyn PasswordService>) -> Self {
        Self {
            super_admin,
            password_service,
        }
    }

    pub fn super_admin(&self) -> &SuperAdmin {
        &self.super_admin
    }

    async fn get_user(&self, scope: &TransactionScope, id: &str) -> ServiceResult<User> {
        scope
            .store()
            .users()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    /// 用户名唯一，且不能占用超级管理员的用户名
    async fn check_username(
        &self,
        scope: &TransactionScope,
        username: &str,
        exclude_id: Option<&str>,
    ) -> ServiceResult<()> {
        if self.super_admin.is(username) {
            return Err(ServiceError::Conflict(format!("username {username} is reserved")));
        }
        if let Some(existing) = scope.store().users().get_by_username(username).await? {
            if Some(existing.id.as_str()) != exclude_id {
                return Err(ServiceError::Conflict(format!("username {username} already exists")));
            }
        }
        Ok(())
    }

    async fn check_roles(
        &self,
        scope: &TransactionScope,
        user_roles: &[UserRole],
    ) -> ServiceResult<()> {
        let roles = scope.store().roles();
        for user_role in user_roles {
            if roles.get(&user_role.role_id).await?.is_none() {
                return Err(ServiceError::not_found("role", &user_role.role_id));
            }
        }
        Ok(())
    }

    async fn load_user_roles(
        &self,
        scope: &TransactionScope,
        user_ids: Vec<String>,
    ) -> ServiceResult<Vec<UserRole>> {
        Ok(scope
            .store()
            .user_roles()
            .query(&UserRoleQuery {
                user_ids,
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("record_id"),
                ..Default::default()
            })
            .await?
            .list)
    }

    async fn create_user_role(
        &self,
        scope: &TransactionScope,
        user_id: &str,
        mut user_role: UserRole,
    ) -> ServiceResult<()> {
        user_role.id = Uuid::new_v4().to_string();
        user_role.user_id = user_id.to_string();
        scope.store().user_roles().create(&user_role).await?;
        Ok(())
    }

    async fn enabled_menus(
        &self,
        scope: &TransactionScope,
        ids: Vec<String>,
    ) -> ServiceResult<Vec<Menu>> {
        let result = scope
            .store()
            .menus()
            .query(&MenuQuery {
                ids,
                status: Some(Status::Enabled),
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("sequence"),
                ..Default::default()
            })
            .await?;
        Ok(result.list)
    }
}

#[async_trait]
impl UserService for DefaultUserService {
    async fn query(
        &self,
        scope: &TransactionScope,
        param: &UserQuery,
    ) -> ServiceResult<QueryResult<User>> {
        let mut result = scope.store().users().query(param).await?;
        if result.list.is_empty() {
            return Ok(result);
        }

        let user_ids = result.list.iter().map(|u| u.id.clone()).collect();
        let mut by_user: HashMap<String, Vec<UserRole>> = HashMap::new();
        for user_role in self.load_user_roles(scope, user_ids).await? {
            by_user.entry(user_role.user_id.clone()).or_default().push(user_role);
        }
        for user in &mut result.list {
            user.user_roles = by_user.remove(&user.id).unwrap_or_default();
        }
        Ok(result)
    }

    async fn get(&self, scope: &TransactionScope, id: &str) -> ServiceResult<User> {
        let mut user = self.get_user(scope, id).await?;
        user.user_roles = self.load_user_roles(scope, vec![user.id.clone()]).await?;
        Ok(user)
    }

    async fn verify(
        &self,
        scope: &TransactionScope,
        username: &str,
        password: &str,
    ) -> ServiceResult<User> {
        if self.super_admin.is(username) {
            if self.super_admin.password == password {
                return Ok(self.super_admin.to_user());
            }
            return Err(ServiceError::Unauthorized("invalid username or password".to_string()));
        }

        let user = scope
            .store()
            .users()
            .get_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("invalid username or password".to_string()))?;
        if !self.password_service.verify(password, &user.password).await? {
            return Err(ServiceError::Unauthorized("invalid username or password".to_string()));
        }
        if !user.status.is_enabled() {
            return Err(ServiceError::Unauthorized("user is disabled".to_string()));
        }

        let mut user = user;
        user.password.clear();
        Ok(user)
    }

    async fn get_user_info(&self, scope: &TransactionScope, id: &str) -> ServiceResult<UserInfo> {
        if self.super_admin.is(id) {
            let admin = self.super_admin.to_user();
            return Ok(UserInfo {
                id: admin.id,
                username: admin.username,
                realname: admin.realname,
                roles: Vec::new(),
            });
        }

        let user = self.get_user(scope, id).await?;
        let roles = scope
            .store()
            .roles()
            .query(&RoleQuery {
                user_id: Some(user.id.clone()),
                status: Some(Status::Enabled),
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("sequence"),
                ..Default::default()
            })
            .await?
            .list;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            realname: user.realname,
            roles,
        })
    }

    async fn get_user_menu_trees(
        &self,
        scope: &TransactionScope,
        id: &str,
    ) -> ServiceResult<Vec<MenuTree>> {
        if self.super_admin.is(id) {
            return Ok(to_tree(self.enabled_menus(scope, Vec::new()).await?));
        }

        let store = scope.store();
        let role_ids: Vec<String> = store
            .roles()
            .query(&RoleQuery {
                user_id: Some(id.to_string()),
                status: Some(Status::Enabled),
                pagination: PaginationParam::unpaged(),
                ..Default::default()
            })
            .await?
            .list
            .into_iter()
            .map(|r| r.id)
            .collect();
        if role_ids.is_empty() {
            return Err(ServiceError::Unauthorized("user has no roles".to_string()));
        }

        let grants = store
            .role_menus()
            .query(&RoleMenuQuery {
                role_ids,
                pagination: PaginationParam::unpaged(),
                ..Default::default()
            })
            .await?
            .list;
        if grants.is_empty() {
            return Err(ServiceError::Unauthorized("user has no permissions".to_string()));
        }

        let mut menu_ids: Vec<String> = grants.into_iter().map(|g| g.menu_id).collect();
        menu_ids.sort();
        menu_ids.dedup();
        let mut menus = self.enabled_menus(scope, menu_ids).await?;
        if menus.is_empty() {
            return Err(ServiceError::Unauthorized("user has no permissions".to_string()));
        }

        // 补齐不在授权里的祖先节点
        let known: HashSet<String> = menus.iter().map(|m| m.id.clone()).collect();
        let mut missing: Vec<String> = menus
            .iter()
            .flat_map(|m| split_parent_ids(&m.parent_path))
            .filter(|id| !known.contains(*id))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        if !missing.is_empty() {
            menus.extend(self.enabled_menus(scope, missing).await?);
        }

        menus.sort_by_key(|m| m.sequence);
        Ok(to_tree(menus))
    }

    async fn create(&self, scope: &TransactionScope, mut user: User) -> ServiceResult<String> {
        user.validate()?;
        if user.password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }
        self.check_username(scope, &user.username, None).await?;
        self.check_roles(scope, &user.user_roles).await?;

        user.id = Uuid::new_v4().to_string();
        user.password = self.password_service.hash(&user.password).await?;
        scope.store().users().create(&user).await?;

        let user_roles = reconcile_by_key(Vec::new(), std::mem::take(&mut user.user_roles)).to_add;
        for user_role in user_roles {
            self.create_user_role(scope, &user.id, user_role).await?;
        }
        scope.request_policy_reload();

        tracing::info!(user = %user.id, username = %user.username, "user created");
        Ok(user.id)
    }

    async fn update(
        &self,
        scope: &TransactionScope,
        id: &str,
        mut user: User,
    ) -> ServiceResult<()> {
        user.validate()?;
        let old = self.get_user(scope, id).await?;
        if old.username != user.username {
            self.check_username(scope, &user.username, Some(id)).await?;
        }
        self.check_roles(scope, &user.user_roles).await?;

        let old_roles = self.load_user_roles(scope, vec![id.to_string()]).await?;
        let diff = reconcile_by_key(old_roles, std::mem::take(&mut user.user_roles));
        let store = scope.store();
        for user_role in diff.to_add {
            self.create_user_role(scope, id, user_role).await?;
        }
        for user_role in &diff.to_remove {
            store.user_roles().delete(&user_role.id).await?;
        }

        user.status = old.status;
        store.users().update(id, &user).await?;
        if !user.password.is_empty() {
            let hash = self.password_service.hash(&user.password).await?;
            store.users().update_password(id, &hash).await?;
        }
        scope.request_policy_reload();
        Ok(())
    }

    async fn delete(&self, scope: &TransactionScope, id: &str) -> ServiceResult<()> {
        self.get_user(scope, id).await?;
        let store = scope.store();
        store.user_roles().delete_by_user_id(id).await?;
        store.users().delete(id).await?;
        scope.request_policy_reload();

        tracing::info!(user = %id, "user deleted");
        Ok(())
    }

    async fn update_status(
        &self,
        scope: &TransactionScope,
        id: &str,
        status: Status,
    ) -> ServiceResult<()> {
        self.get_user(scope, id).await?;
        scope.store().users().update_status(id, status).await?;
        scope.request_policy_reload();
        Ok(())
    }

    async fn update_password(
        &self,
        scope: &TransactionScope,
        id: &str,
        password: &str,
    ) -> ServiceResult<()> {
        if password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }
        self.get_user(scope, id).await?;
        let hash = self.password_service.hash(password).await?;
        scope.store().users().update_password(id, &hash).await?;
        scope.request_policy_reload();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{DefaultMenuService, MenuService};
    use crate::security::{DefaultPasswordService, DefaultRoleService, RoleService};
    use crate::testing::memory_store;
    use warden_domain::menu::MenuAction;
    use warden_domain::security::{Role, RoleMenu};
    use warden_infra::ScopeOutcome;

    fn service() -> DefaultUserService {
        DefaultUserService::new(
            SuperAdmin {
                username: "root".to_string(),
                realname: "超级管理员".to_string(),
                password: "root-pass".to_string(),
            },
            Arc::new(DefaultPasswordService::new().with_bcrypt_cost(4)),
        )
    }

    fn user(username: &str, password: &str, role_ids: &[&str]) -> User {
        User {
            username: username.to_string(),
            password: password.to_string(),
            user_roles: role_ids
                .iter()
                .map(|r| UserRole {
                    role_id: r.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    async fn role(scope: &TransactionScope, name: &str, role_menus: Vec<RoleMenu>) -> String {
        DefaultRoleService::new()
            .create(
                scope,
                Role {
                    name: name.to_string(),
                    role_menus,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_verify_and_reserved_name() {
        let store = memory_store().await;
        let scope = store.begin().await.unwrap();
        let service = service();

        let id = service.create(&scope, user("alice", "s3cret", &[])).await.unwrap();
        let verified = service.verify(&scope, "alice", "s3cret").await.unwrap();
        assert_eq!(verified.id, id);
        assert!(verified.password.is_empty());

        assert!(matches!(
            service.verify(&scope, "alice", "wrong").await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.create(&scope, user("root", "x", &[])).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.create(&scope, user("alice", "x", &[])).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.create(&scope, user("bob", "", &[])).await,
            Err(ServiceError::Validation(_))
        ));

        let admin = service.verify(&scope, "root", "root-pass").await.unwrap();
        assert_eq!(admin.id, "root");

        service.update_status(&scope, &id, Status::Disabled).await.unwrap();
        assert!(matches!(
            service.verify(&scope, "alice", "s3cret").await,
            Err(ServiceError::Unauthorized(_))
        ));
        scope.finalize(ScopeOutcome::Completed { failed: false }).await;
    }

    #[tokio::test]
    async fn test_update_reconciles_roles_and_password() {
        let store = memory_store().await;
        let scope = store.begin().await.unwrap();
        let service = service();
        let r1 = role(&scope, "r1", Vec::new()).await;
        let r2 = role(&scope, "r2", Vec::new()).await;

        let id = service.create(&scope, user("carol", "old-pass", &[&r1])).await.unwrap();
        let kept = service.get(&scope, &id).await.unwrap().user_roles[0].id.clone();

        service
            .update(&scope, &id, user("carol", "new-pass", &[&r1, &r2]))
            .await
            .unwrap();
        let updated = service.get(&scope, &id).await.unwrap();
        assert_eq!(updated.user_roles.len(), 2);
        assert!(updated.user_roles.iter().any(|ur| ur.id == kept));
        service.verify(&scope, "carol", "new-pass").await.unwrap();

        // 空密码不修改密码
        service.update(&scope, &id, user("carol", "", &[&r2])).await.unwrap();
        let updated = service.get(&scope, &id).await.unwrap();
        assert_eq!(updated.user_roles.len(), 1);
        assert_eq!(updated.user_roles[0].role_id, r2);
        service.verify(&scope, "carol", "new-pass").await.unwrap();

        assert!(matches!(
            service.update(&scope, &id, user("carol", "", &["missing"])).await,
            Err(ServiceError::NotFound(_))
        ));

        service.delete(&scope, &id).await.unwrap();
        let left = scope
            .store()
            .user_roles()
            .query(&UserRoleQuery::default())
            .await
            .unwrap();
        assert_eq!(left.pagination.total, 0);
        scope.finalize(ScopeOutcome::Completed { failed: false }).await;
    }

    #[tokio::test]
    async fn test_menu_trees_include_ancestors() {
        let store = memory_store().await;
        let scope = store.begin().await.unwrap();
        let menus = DefaultMenuService::new();
        let service = service();

        let root = menus
            .create(
                &scope,
                Menu {
                    name: "系统".to_string(),
                    sequence: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let leaf = menus
            .create(
                &scope,
                Menu {
                    name: "用户".to_string(),
                    parent_id: Some(root.clone()),
                    actions: vec![MenuAction {
                        code: "view".to_string(),
                        name: "查看".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        menus
            .create(
                &scope,
                Menu {
                    name: "角色".to_string(),
                    parent_id: Some(root.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let action = menus.get_actions(&scope, &leaf).await.unwrap().remove(0);

        let r1 = role(
            &scope,
            "r1",
            vec![RoleMenu {
                menu_id: leaf.clone(),
                action_id: action.id,
                ..Default::default()
            }],
        )
        .await;
        let id = service.create(&scope, user("dave", "pass", &[&r1])).await.unwrap();

        let trees = service.get_user_menu_trees(&scope, &id).await.unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].id, root);
        assert_eq!(trees[0].children.len(), 1);
        assert_eq!(trees[0].children[0].id, leaf);

        let all = service.get_user_menu_trees(&scope, "root").await.unwrap();
        assert_eq!(all[0].children.len(), 2);

        let nobody = service.create(&scope, user("erin", "pass", &[])).await.unwrap();
        assert!(matches!(
            service.get_user_menu_trees(&scope, &nobody).await,
            Err(ServiceError::Unauthorized(_))
        ));

        let info = service.get_user_info(&scope, &id).await.unwrap();
        assert_eq!(info.roles.len(), 1);
        scope.finalize(ScopeOutcome::Completed { failed: false }).await;
    }
}
