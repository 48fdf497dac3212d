use std::sync::Arc;
use warden_api::AuthenticatedUser;
use warden_infra::{JwtService, TransactionScope};

use crate::error::{ServiceError, ServiceResult};
use crate::security::UserService;

/// 登录令牌
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// 认证服务：用户名密码换令牌，令牌换身份
pub struct AuthService {
    jwt: Arc<JwtService>,
    users: Arc<dyn UserService>,
}

impl AuthService {
    pub fn new(jwt: Arc<JwtService>, users: Arc<dyn UserService>) -> Self {
        Self { jwt, users }
    }

    pub async fn login(
        &self,
        scope: &TransactionScope,
        username: &str,
        password: &str,
    ) -> ServiceResult<LoginToken> {
        let user = self.users.verify(scope, username, password).await?;
        let access_token = self
            .jwt
            .generate(&user.id, &user.username)
            .map_err(|e| ServiceError::Internal(format!("failed to sign token: {e}")))?;

        tracing::info!(user = %user.id, "user logged in");
        Ok(LoginToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expiration(),
        })
    }

    /// 校验令牌；身份取 `sub`（超级管理员为用户名）
    pub fn authenticate(&self, token: &str) -> ServiceResult<AuthenticatedUser> {
        let claims = self
            .jwt
            .verify(token)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;
        Ok(AuthenticatedUser::new(claims.sub, claims.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{DefaultPasswordService, DefaultUserService, SuperAdmin};
    use crate::testing::memory_store;
    use warden_infra::ScopeOutcome;

    fn auth() -> AuthService {
        let users = DefaultUserService::new(
            SuperAdmin {
                username: "root".to_string(),
                realname: String::new(),
                password: "root-pass".to_string(),
            },
            Arc::new(DefaultPasswordService::new().with_bcrypt_cost(4)),
        );
        AuthService::new(
            Arc::new(JwtService::new("test-secret", "warden".to_string(), 60)),
            Arc::new(users),
        )
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let store = memory_store().await;
        let scope = store.begin().await.unwrap();
        let auth = auth();

        let token = auth.login(&scope, "root", "root-pass").await.unwrap();
        assert_eq!(token.token_type, "Bearer");
        let user = auth.authenticate(&token.access_token).unwrap();
        assert_eq!(user.id, "root");

        assert!(matches!(
            auth.login(&scope, "root", "nope").await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.authenticate("not-a-token"),
            Err(ServiceError::Unauthorized(_))
        ));
        scope.finalize(ScopeOutcome::Completed { failed: false }).await;
    }
}
