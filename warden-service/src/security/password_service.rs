use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{ServiceError, ServiceResult};

/// 密码服务trait
#[async_trait]
pub trait PasswordService: Send + Sync {
    /// 加密密码
    async fn hash(&self, password: &str) -> ServiceResult<String>;

    /// 验证密码
    async fn verify(&self, password: &str, hash: &str) -> ServiceResult<bool>;
}

/// 默认密码服务实现（bcrypt）
/// 哈希计算放到阻塞线程池，避免占用异步工作线程
pub struct DefaultPasswordService {
    bcrypt_cost: u32,
}

impl DefaultPasswordService {
    pub fn new() -> Self {
        Self {
            bcrypt_cost: DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

impl Default for DefaultPasswordService {
    fn default() -> Self {
        Self::new()
    }
}

fn join_error(err: tokio::task::JoinError) -> ServiceError {
    ServiceError::Internal(format!("password task failed: {err}"))
}

#[async_trait]
impl PasswordService for DefaultPasswordService {
    async fn hash(&self, password: &str) -> ServiceResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(join_error)?
            .map_err(|e| ServiceError::Internal(format!("bcrypt hash error: {e}")))
    }

    async fn verify(&self, password: &str, hash: &str) -> ServiceResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        let result = tokio::task::spawn_blocking(move || verify(password, &hash))
            .await
            .map_err(join_error)?;
        // 存储的哈希格式不对时按校验失败处理
        Ok(result.unwrap_or(false))
    }
}
