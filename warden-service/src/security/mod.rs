pub mod auth_service;
pub mod enforcer;
pub mod password_service;
pub mod policy_loader;
pub mod role_service;
pub mod user_service;

pub use auth_service::{AuthService, LoginToken};
pub use enforcer::{PolicyEnforcer, PolicySnapshot};
pub use password_service::{DefaultPasswordService, PasswordService};
pub use policy_loader::PolicyGraphLoader;
pub use role_service::{DefaultRoleService, RoleService};
pub use user_service::{DefaultUserService, SuperAdmin, UserService};
