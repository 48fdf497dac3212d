use std::collections::{HashMap, HashSet};
use warden_api::query::{OrderParam, PaginationParam, Status};
use warden_api::PolicyRule;
use warden_domain::menu::{MenuActionResource, MenuActionResourceQuery};
use warden_domain::security::{RoleMenuQuery, RoleQuery, UserQuery, UserRoleQuery};
use warden_infra::AssociationStore;

use crate::error::ServiceResult;
use crate::security::role_service::grants_by_role;

/// 权限图加载器
///
/// 从已提交的数据读出整张权限图，展开成平铺的策略规则：
/// 每个启用角色按授权动作绑定的资源生成 `Grant`，
/// 每个启用用户按角色关联生成 `Membership`。
#[derive(Clone)]
pub struct PolicyGraphLoader {
    store: AssociationStore,
}

impl PolicyGraphLoader {
    pub fn new(store: AssociationStore) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> ServiceResult<Vec<PolicyRule>> {
        let (mut rules, role_ids) = self.load_role_policy().await?;
        rules.extend(self.load_user_policy(&role_ids).await?);
        tracing::debug!(rules = rules.len(), "policy graph loaded");
        Ok(rules)
    }

    /// `p, role, path, method`，同一角色内按 (method, path) 去重
    async fn load_role_policy(&self) -> ServiceResult<(Vec<PolicyRule>, HashSet<String>)> {
        let store = self.store.store();
        let roles = store
            .roles()
            .query(&RoleQuery {
                status: Some(Status::Enabled),
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("record_id"),
                ..Default::default()
            })
            .await?
            .list;
        if roles.is_empty() {
            return Ok((Vec::new(), HashSet::new()));
        }

        let role_ids: Vec<String> = roles.iter().map(|r| r.id.clone()).collect();
        let mut grants = grants_by_role(
            store
                .role_menus()
                .query(&RoleMenuQuery {
                    role_ids: role_ids.clone(),
                    pagination: PaginationParam::unpaged(),
                    order: OrderParam::asc("record_id"),
                    ..Default::default()
                })
                .await?
                .list,
        );

        let mut resources: HashMap<String, Vec<MenuActionResource>> = HashMap::new();
        if !grants.is_empty() {
            let all = store
                .menu_action_resources()
                .query(&MenuActionResourceQuery {
                    pagination: PaginationParam::unpaged(),
                    order: OrderParam::asc("record_id"),
                    ..Default::default()
                })
                .await?
                .list;
            for resource in all {
                resources.entry(resource.action_id.clone()).or_default().push(resource);
            }
        }

        let mut rules = Vec::new();
        for role in &roles {
            let Some(role_grants) = grants.remove(&role.id) else {
                continue;
            };
            let mut seen = HashSet::new();
            for grant in role_grants {
                let Some(bound) = resources.get(&grant.action_id) else {
                    continue;
                };
                for resource in bound {
                    if resource.method.is_empty() || resource.path.is_empty() {
                        continue;
                    }
                    let key = (resource.method.to_ascii_uppercase(), resource.path.clone());
                    if seen.insert(key) {
                        rules.push(PolicyRule::grant(&role.id, &resource.path, &resource.method));
                    }
                }
            }
        }

        Ok((rules, role_ids.into_iter().collect()))
    }

    /// `g, user, role`，只保留指向启用角色的关联
    async fn load_user_policy(
        &self,
        enabled_roles: &HashSet<String>,
    ) -> ServiceResult<Vec<PolicyRule>> {
        if enabled_roles.is_empty() {
            return Ok(Vec::new());
        }

        let store = self.store.store();
        let user_ids: Vec<String> = store
            .users()
            .query(&UserQuery {
                status: Some(Status::Enabled),
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("record_id"),
                ..Default::default()
            })
            .await?
            .list
            .into_iter()
            .map(|u| u.id)
            .collect();
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let memberships = store
            .user_roles()
            .query(&UserRoleQuery {
                user_ids,
                pagination: PaginationParam::unpaged(),
                order: OrderParam::asc("record_id"),
                ..Default::default()
            })
            .await?
            .list;

        Ok(memberships
            .into_iter()
            .filter(|m| enabled_roles.contains(&m.role_id))
            .map(|m| PolicyRule::membership(m.user_id, m.role_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_store;
    use warden_domain::menu::{Menu, MenuAction};
    use warden_domain::security::{Role, RoleMenu, User, UserRole};

    /// r1 授权 m1/a1，a1 绑定同一资源两次（大小写不同）和一个空方法资源
    async fn seed(store: &AssociationStore) {
        let s = store.store();
        s.menus()
            .create(&Menu {
                id: "m1".to_string(),
                name: "部件".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        s.menu_actions()
            .create(&MenuAction {
                id: "a1".to_string(),
                menu_id: "m1".to_string(),
                code: "view".to_string(),
                name: "查看".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        for (id, method, path) in [
            ("res1", "GET", "/api/v1/widgets"),
            ("res2", "get", "/api/v1/widgets/"),
            ("res3", "", "/api/v1/empty"),
        ] {
            s.menu_action_resources()
                .create(&MenuActionResource {
                    id: id.to_string(),
                    action_id: "a1".to_string(),
                    method: method.to_string(),
                    path: path.to_string(),
                })
                .await
                .unwrap();
        }
        for (id, status) in [("r1", Status::Enabled), ("r2", Status::Disabled)] {
            s.roles()
                .create(&Role {
                    id: id.to_string(),
                    name: id.to_string(),
                    status,
                    ..Default::default()
                })
                .await
                .unwrap();
            s.role_menus()
                .create(&RoleMenu {
                    id: format!("g-{id}"),
                    role_id: id.to_string(),
                    menu_id: "m1".to_string(),
                    action_id: "a1".to_string(),
                })
                .await
                .unwrap();
        }
        s.users()
            .create(&User {
                id: "u1".to_string(),
                username: "u1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        for role_id in ["r1", "r2"] {
            s.user_roles()
                .create(&UserRole {
                    id: format!("u1-{role_id}"),
                    user_id: "u1".to_string(),
                    role_id: role_id.to_string(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_empty_graph_loads_nothing() {
        let store = memory_store().await;
        let rules = PolicyGraphLoader::new(store).load().await.unwrap();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn test_load_skips_disabled_roles() {
        let store = memory_store().await;
        seed(&store).await;

        let rules = PolicyGraphLoader::new(store).load().await.unwrap();
        let lines: Vec<String> = rules.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "p, r1, /api/v1/widgets, GET",
                "p, r1, /api/v1/widgets/, GET",
                "g, u1, r1",
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_resources_are_emitted_once_per_role() {
        let store = memory_store().await;
        seed(&store).await;
        // 第二个授权指向同一动作
        store
            .store()
            .menu_actions()
            .create(&MenuAction {
                id: "a2".to_string(),
                menu_id: "m1".to_string(),
                code: "list".to_string(),
                name: "列表".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .store()
            .menu_action_resources()
            .create(&MenuActionResource {
                id: "res4".to_string(),
                action_id: "a2".to_string(),
                method: "GET".to_string(),
                path: "/api/v1/widgets".to_string(),
            })
            .await
            .unwrap();
        store
            .store()
            .role_menus()
            .create(&RoleMenu {
                id: "g-r1-a2".to_string(),
                role_id: "r1".to_string(),
                menu_id: "m1".to_string(),
                action_id: "a2".to_string(),
            })
            .await
            .unwrap();

        let rules = PolicyGraphLoader::new(store).load().await.unwrap();
        let grants = rules
            .iter()
            .filter(|r| matches!(r, PolicyRule::Grant { path, .. } if path == "/api/v1/widgets"))
            .count();
        assert_eq!(grants, 1);
    }
}
