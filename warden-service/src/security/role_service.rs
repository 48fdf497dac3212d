use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;
use warden_api::query::{OrderParam, PaginationParam, QueryResult, Status};
use warden_domain::reconcile_by_key;
use warden_domain::security::{Role, RoleMenu, RoleMenuQuery, RoleQuery, UserRoleQuery};
use warden_infra::TransactionScope;

use crate::error::{ServiceError, ServiceResult};

/// 角色服务trait
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn query(
        &self,
        scope: &TransactionScope,
        param: &RoleQuery,
    ) -> ServiceResult<QueryResult<Role>>;

    /// 全部启用的角色，用于下拉选择
    async fn query_all(&self, scope: &TransactionScope) -> ServiceResult<Vec<Role>>;

    /// 获取角色（含授权）
    async fn get(&self, scope: &TransactionScope, id: &str) -> ServiceResult<Role>;

    async fn create(&self, scope: &TransactionScope, role: Role) -> ServiceResult<String>;

    /// 更新角色，授权按 (菜单, 动作) 对账；不修改状态
    async fn update(&self, scope: &TransactionScope, id: &str, role: Role) -> ServiceResult<()>;

    /// 删除角色，仍有用户持有时拒绝
    async fn delete(&self, scope: &TransactionScope, id: &str) -> ServiceResult<()>;

    async fn update_status(
        &self,
        scope: &TransactionScope,
        id: &str,
        status: Status,
    ) -> ServiceResult<()>;
}

/// 默认角色服务实现
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRoleService;

impl DefaultRoleService {
    pub fn new() -> Self {
        Self
    }

    async fn get_role(&self, scope: &TransactionScope, id: &str) -> ServiceResult<Role> {
        scope
            .store()
            .roles()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("role", id))
    }

    async fn check_name(
        &self,
        scope: &TransactionScope,
        name: &str,
        exclude_id: Option<&str>,
    ) -> ServiceResult<()> {
        let existing = scope
            .store()
            .roles()
            .query(&RoleQuery {
                name: Some(name.to_string()),
                pagination: PaginationParam::unpaged(),
                ..Default::default()
            })
            .await?;
        if existing.list.iter().any(|r| Some(r.id.as_str()) != exclude_id) {
            return Err(ServiceError::Conflict(format!("role name {name} already exists")));
        }
        Ok(())
    }

    /// 授权引用的菜单和动作必须存在，且动作属于该菜单
    async fn check_grants(
        &self,
        scope: &TransactionScope,
        grants: &[RoleMenu],
    ) -> ServiceResult<()> {
        let store = scope.store();
        for grant in grants {
            if store.menus().get(&grant.menu_id).await?.is_none() {
                return Err(ServiceError::not_found("menu", &grant.menu_id));
            }
            match store.menu_actions().get(&grant.action_id).await? {
                Some(action) if action.menu_id == grant.menu_id => {}
                _ => {
                    return Err(ServiceError::NotFound(format!(
                        "action {} of menu {}",
                        grant.action_id, grant.menu_id
                    )))
                }
            }
        }
        Ok(())
    }

    async fn load_grants(
        &self,
        scope: &TransactionScope,
        role_ids: Vec<String>,
    ) -> ServiceResult<Vec<RoleMenu>> {
        Ok(scope
            .store()
            .role_menus()
            .query(&RoleMenuQuery {
                role_ids,
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("record_id"),
                ..Default::default()
            })
            .await?
            .list)
    }

    async fn create_grant(
        &self,
        scope: &TransactionScope,
        role_id: &str,
        mut grant: RoleMenu,
    ) -> ServiceResult<()> {
        grant.id = Uuid::new_v4().to_string();
        grant.role_id = role_id.to_string();
        scope.store().role_menus().create(&grant).await?;
        Ok(())
    }
}

#[async_trait]
impl RoleService for DefaultRoleService {
    async fn query(
        &self,
        scope: &TransactionScope,
        param: &RoleQuery,
    ) -> ServiceResult<QueryResult<Role>> {
        Ok(scope.store().roles().query(param).await?)
    }

    async fn query_all(&self, scope: &TransactionScope) -> ServiceResult<Vec<Role>> {
        let result = scope
            .store()
            .roles()
            .query(&RoleQuery {
                status: Some(Status::Enabled),
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("sequence"),
                ..Default::default()
            })
            .await?;
        Ok(result.list)
    }

    async fn get(&self, scope: &TransactionScope, id: &str) -> ServiceResult<Role> {
        let mut role = self.get_role(scope, id).await?;
        role.role_menus = self.load_grants(scope, vec![role.id.clone()]).await?;
        Ok(role)
    }

    async fn create(&self, scope: &TransactionScope, mut role: Role) -> ServiceResult<String> {
        role.validate()?;
        self.check_name(scope, &role.name, None).await?;
        self.check_grants(scope, &role.role_menus).await?;

        role.id = Uuid::new_v4().to_string();
        scope.store().roles().create(&role).await?;

        // 与空集合对账去重
        let grants = reconcile_by_key(Vec::new(), std::mem::take(&mut role.role_menus)).to_add;
        for grant in grants {
            self.create_grant(scope, &role.id, grant).await?;
        }
        scope.request_policy_reload();

        tracing::info!(role = %role.id, name = %role.name, "role created");
        Ok(role.id)
    }

    async fn update(
        &self,
        scope: &TransactionScope,
        id: &str,
        mut role: Role,
    ) -> ServiceResult<()> {
        role.validate()?;
        let old = self.get_role(scope, id).await?;
        if old.name != role.name {
            self.check_name(scope, &role.name, Some(id)).await?;
        }

        // 只校验新增的授权，已有授权不因动作被删而失效
        let old_grants = self.load_grants(scope, vec![id.to_string()]).await?;
        let diff = reconcile_by_key(old_grants, std::mem::take(&mut role.role_menus));
        self.check_grants(scope, &diff.to_add).await?;
        let store = scope.store();
        for grant in diff.to_add {
            self.create_grant(scope, id, grant).await?;
        }
        for grant in &diff.to_remove {
            store.role_menus().delete(&grant.id).await?;
        }

        // 状态只通过 update_status 修改
        role.status = old.status;
        store.roles().update(id, &role).await?;
        scope.request_policy_reload();
        Ok(())
    }

    async fn delete(&self, scope: &TransactionScope, id: &str) -> ServiceResult<()> {
        self.get_role(scope, id).await?;

        let store = scope.store();
        let holders = store
            .user_roles()
            .query(&UserRoleQuery {
                role_id: Some(id.to_string()),
                pagination: PaginationParam::new(Some(1), Some(1)),
                ..Default::default()
            })
            .await?;
        if holders.pagination.total > 0 {
            return Err(ServiceError::InvariantViolation(format!(
                "role {id} is still held by {} user(s)",
                holders.pagination.total
            )));
        }

        store.role_menus().delete_by_role_id(id).await?;
        store.roles().delete(id).await?;
        scope.request_policy_reload();

        tracing::info!(role = %id, "role deleted");
        Ok(())
    }

    async fn update_status(
        &self,
        scope: &TransactionScope,
        id: &str,
        status: Status,
    ) -> ServiceResult<()> {
        self.get_role(scope, id).await?;
        scope.store().roles().update_status(id, status).await?;
        scope.request_policy_reload();
        Ok(())
    }
}

/// 按角色分组授权
pub(crate) fn grants_by_role(grants: Vec<RoleMenu>) -> HashMap<String, Vec<RoleMenu>> {
    let mut map: HashMap<String, Vec<RoleMenu>> = HashMap::new();
    for grant in grants {
        map.entry(grant.role_id.clone()).or_default().push(grant);
    }
    map
}
