use std::sync::Arc;
use warden_api::Enforcer;
use warden_infra::AssociationStore;
use warden_service::menu::MenuService;
use warden_service::security::{AuthService, RoleService, UserService};

/// 中间件开关和忽略前缀
#[derive(Debug, Clone, Default)]
pub struct MiddlewareOptions {
    pub auth_enable: bool,
    pub auth_ignore_path_prefixes: Vec<String>,
    pub policy_enable: bool,
    pub policy_ignore_path_prefixes: Vec<String>,
    /// 认证关闭时注入的身份
    pub super_admin: String,
}

impl MiddlewareOptions {
    pub fn skips_auth(&self, path: &str) -> bool {
        self.auth_ignore_path_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn skips_policy(&self, path: &str) -> bool {
        self.policy_ignore_path_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// 应用状态
/// 包含所有需要的服务实例
#[derive(Clone)]
pub struct AppState {
    pub store: AssociationStore,
    pub enforcer: Arc<dyn Enforcer>,
    pub auth_service: Arc<AuthService>,
    pub menu_service: Arc<dyn MenuService>,
    pub role_service: Arc<dyn RoleService>,
    pub user_service: Arc<dyn UserService>,
    pub options: Arc<MiddlewareOptions>,
}
