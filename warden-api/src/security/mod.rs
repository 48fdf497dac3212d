pub mod authentication;
pub mod authorization;
pub mod policy;

pub use authentication::AuthenticatedUser;
pub use authorization::{AuthorizationDecision, Enforcer};
pub use policy::PolicyRule;
