use serde::{Deserialize, Serialize};

/// 认证后的用户信息
/// `id` 是策略判定使用的主体标识，超级管理员的 `id` 等于其用户名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_user() {
        let user = AuthenticatedUser::new("u-1", "alice");
        assert_eq!(user.id, "u-1");
        assert_eq!(user.username, "alice");
    }
}
