use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use warden_api::{AuthorizationDecision, Enforcer, PolicyRule};

use crate::error::ServiceResult;
use crate::security::PolicyGraphLoader;

/// 不可变的策略快照
/// 路径精确匹配，方法统一大写
#[derive(Debug, Default)]
pub struct PolicySnapshot {
    grants: HashMap<String, HashSet<(String, String)>>,
    memberships: HashMap<String, Vec<String>>,
    rules: usize,
}

impl PolicySnapshot {
    pub fn from_rules(rules: &[PolicyRule]) -> Self {
        let mut snapshot = Self {
            rules: rules.len(),
            ..Default::default()
        };
        for rule in rules {
            match rule {
                PolicyRule::Grant { role_id, path, method } => {
                    snapshot
                        .grants
                        .entry(role_id.clone())
                        .or_default()
                        .insert((method.to_ascii_uppercase(), path.clone()));
                }
                PolicyRule::Membership { user_id, role_id } => {
                    snapshot
                        .memberships
                        .entry(user_id.clone())
                        .or_default()
                        .push(role_id.clone());
                }
            }
        }
        snapshot
    }

    /// 主体所属的任一角色拥有 (method, path) 即允许
    pub fn allows(&self, subject: &str, path: &str, method: &str) -> Option<&str> {
        let roles = self.memberships.get(subject)?;
        let key = (method.to_ascii_uppercase(), path.to_string());
        roles
            .iter()
            .find(|role| self.grants.get(*role).is_some_and(|g| g.contains(&key)))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules == 0
    }
}

/// 策略执行器
///
/// 判定只读当前快照，不加锁；重载时构建新快照并整体替换。
/// 重载之间用互斥锁串行，避免旧的加载结果覆盖新的。
pub struct PolicyEnforcer {
    loader: PolicyGraphLoader,
    snapshot: ArcSwap<PolicySnapshot>,
    super_admin: String,
    reload_lock: Mutex<()>,
}

impl PolicyEnforcer {
    /// 初始快照为空，加载前拒绝所有非超级管理员的请求
    pub fn new(loader: PolicyGraphLoader, super_admin: impl Into<String>) -> Self {
        Self {
            loader,
            snapshot: ArcSwap::from_pointee(PolicySnapshot::default()),
            super_admin: super_admin.into(),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.snapshot.load_full()
    }

    pub fn check(&self, subject: &str, path: &str, method: &str) -> AuthorizationDecision {
        if !self.super_admin.is_empty() && subject == self.super_admin {
            return AuthorizationDecision::allow(Some("super admin".to_string()));
        }
        match self.snapshot.load().allows(subject, path, method) {
            Some(role) => AuthorizationDecision::allow(Some(format!("granted by role {role}"))),
            None => AuthorizationDecision::deny(Some("no matching policy rule".to_string())),
        }
    }

    /// 重新加载权限图，返回规则数
    pub async fn reload_policy(&self) -> ServiceResult<usize> {
        let _guard = self.reload_lock.lock().await;
        let rules = self.loader.load().await?;
        let count = self.install(&rules);
        tracing::info!(rules = count, "policy reloaded");
        Ok(count)
    }

    /// 直接安装一组规则
    pub fn install(&self, rules: &[PolicyRule]) -> usize {
        self.snapshot.store(Arc::new(PolicySnapshot::from_rules(rules)));
        rules.len()
    }

    /// 定时重载，兜底漏掉的同步重载
    pub fn spawn_auto_reload(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = self.reload_policy().await {
                    tracing::error!(error = %err, "scheduled policy reload failed");
                }
            }
        })
    }
}

#[async_trait]
impl Enforcer for PolicyEnforcer {
    fn enforce(&self, subject: &str, path: &str, method: &str) -> AuthorizationDecision {
        self.check(subject, path, method)
    }

    async fn reload(&self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.reload_policy().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_store;
    use std::sync::atomic::{AtomicBool, Ordering};
    use warden_api::query::Status;
    use warden_domain::menu::{Menu, MenuAction, MenuActionResource};
    use warden_domain::security::{Role, RoleMenu, User, UserRole};
    use warden_infra::AssociationStore;

    async fn seed_widgets(store: &AssociationStore) {
        let s = store.store();
        s.menus()
            .create(&Menu {
                id: "m1".to_string(),
                name: "widgets".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        s.menu_actions()
            .create(&MenuAction {
                id: "a1".to_string(),
                menu_id: "m1".to_string(),
                code: "view".to_string(),
                name: "view".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        s.menu_action_resources()
            .create(&MenuActionResource {
                id: "res1".to_string(),
                action_id: "a1".to_string(),
                method: "GET".to_string(),
                path: "/api/v1/widgets".to_string(),
            })
            .await
            .unwrap();
        s.roles()
            .create(&Role {
                id: "r1".to_string(),
                name: "r1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        s.role_menus()
            .create(&RoleMenu {
                id: "g1".to_string(),
                role_id: "r1".to_string(),
                menu_id: "m1".to_string(),
                action_id: "a1".to_string(),
            })
            .await
            .unwrap();
        s.users()
            .create(&User {
                id: "u1".to_string(),
                username: "u1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        s.user_roles()
            .create(&UserRole {
                id: "ur1".to_string(),
                user_id: "u1".to_string(),
                role_id: "r1".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_widgets_scenario() {
        let store = memory_store().await;
        seed_widgets(&store).await;
        let enforcer = PolicyEnforcer::new(PolicyGraphLoader::new(store.clone()), "root");

        assert!(!enforcer.enforce("u1", "/api/v1/widgets", "GET").allowed);

        assert_eq!(enforcer.reload().await.unwrap(), 2);
        assert!(enforcer.enforce("u1", "/api/v1/widgets", "GET").allowed);
        assert!(enforcer.enforce("u1", "/api/v1/widgets", "get").allowed);
        assert!(!enforcer.enforce("u1", "/api/v1/widgets", "POST").allowed);
        assert!(!enforcer.enforce("u1", "/api/v1/widgets/1", "GET").allowed);
        assert!(!enforcer.enforce("u2", "/api/v1/widgets", "GET").allowed);

        store.store().roles().update_status("r1", Status::Disabled).await.unwrap();
        enforcer.reload().await.unwrap();
        assert!(!enforcer.enforce("u1", "/api/v1/widgets", "GET").allowed);
        assert!(store.store().role_menus().get("g1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_disabled_user_loses_access() {
        let store = memory_store().await;
        seed_widgets(&store).await;
        let enforcer = PolicyEnforcer::new(PolicyGraphLoader::new(store.clone()), "root");

        store.store().users().update_status("u1", Status::Disabled).await.unwrap();
        enforcer.reload().await.unwrap();
        assert!(!enforcer.enforce("u1", "/api/v1/widgets", "GET").allowed);
    }

    #[test]
    fn test_snapshot_requires_membership() {
        let rules = vec![PolicyRule::grant("r1", "/x", "GET")];
        let snapshot = PolicySnapshot::from_rules(&rules);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.allows("u1", "/x", "GET").is_none());

        let snapshot = PolicySnapshot::from_rules(&[
            PolicyRule::grant("r1", "/x", "get"),
            PolicyRule::membership("u1", "r1"),
        ]);
        assert_eq!(snapshot.allows("u1", "/x", "GET"), Some("r1"));
    }

    #[tokio::test]
    async fn test_super_admin_identity() {
        let store = memory_store().await;
        let enforcer = PolicyEnforcer::new(PolicyGraphLoader::new(store), "root");
        assert!(enforcer.enforce("root", "/anything", "DELETE").allowed);
        assert!(!enforcer.enforce("", "/anything", "DELETE").allowed);
        assert!(enforcer.snapshot().is_empty());
    }

    const REQUESTS: [(&str, &str, &str); 4] = [
        ("u1", "/api/v1/widgets", "GET"),
        ("u1", "/api/v1/gadgets", "POST"),
        ("u2", "/api/v1/gadgets", "POST"),
        ("u2", "/api/v1/widgets", "GET"),
    ];

    fn decisions(snapshot: &PolicySnapshot) -> (usize, Vec<bool>) {
        let allowed = REQUESTS
            .iter()
            .map(|(subject, path, method)| snapshot.allows(subject, path, method).is_some())
            .collect();
        (snapshot.len(), allowed)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_see_whole_snapshots_during_reloads() {
        let store = memory_store().await;
        seed_widgets(&store).await;
        let enforcer = Arc::new(PolicyEnforcer::new(PolicyGraphLoader::new(store), "root"));

        let gadgets = vec![
            PolicyRule::grant("r2", "/api/v1/gadgets", "POST"),
            PolicyRule::membership("u1", "r2"),
            PolicyRule::membership("u2", "r2"),
        ];
        let expected_gadgets = (3, vec![false, true, true, false]);
        let expected_widgets = (2, vec![true, false, false, false]);

        enforcer.reload_policy().await.unwrap();
        assert_eq!(decisions(&enforcer.snapshot()), expected_widgets);
        enforcer.install(&gadgets);
        assert_eq!(decisions(&enforcer.snapshot()), expected_gadgets);

        let done = Arc::new(AtomicBool::new(false));
        let readers: Vec<_> = (0..3)
            .map(|_| {
                let enforcer = enforcer.clone();
                let done = done.clone();
                let (gadgets, widgets) = (expected_gadgets.clone(), expected_widgets.clone());
                tokio::spawn(async move {
                    let mut seen = 0usize;
                    loop {
                        let observed = decisions(&enforcer.snapshot());
                        assert!(
                            observed == gadgets || observed == widgets,
                            "torn snapshot {observed:?}"
                        );

                        let decision = enforcer.check("u1", "/api/v1/widgets", "GET");
                        if decision.allowed {
                            assert_eq!(decision.reason.as_deref(), Some("granted by role r1"));
                        }
                        seen += 1;
                        if done.load(Ordering::Acquire) {
                            break seen;
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for _ in 0..100 {
            assert_eq!(enforcer.install(&gadgets), 3);
            tokio::task::yield_now().await;
            assert_eq!(enforcer.reload_policy().await.unwrap(), 2);
            tokio::task::yield_now().await;
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.await.unwrap() > 0);
        }
        assert_eq!(decisions(&enforcer.snapshot()), expected_widgets);
    }
}
