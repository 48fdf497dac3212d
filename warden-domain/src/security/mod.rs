pub mod role;
pub mod user;

pub use role::{Role, RoleMenu, RoleMenuQuery, RoleQuery};
pub use user::{User, UserInfo, UserQuery, UserRole, UserRoleQuery};
