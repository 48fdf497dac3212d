use async_trait::async_trait;

/// 授权决策
#[derive(Debug, Clone)]
pub struct AuthorizationDecision {
    /// 是否允许访问
    pub allowed: bool,
    /// 决策原因（用于日志和调试）
    pub reason: Option<String>,
}

impl AuthorizationDecision {
    pub fn allow(reason: Option<String>) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    pub fn deny(reason: Option<String>) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// 策略执行器trait
/// 按 (主体, 路径, 方法) 判定请求，并支持整体替换规则集
#[async_trait]
pub trait Enforcer: Send + Sync {
    /// 判定请求，热路径上不能加锁
    fn enforce(&self, subject: &str, path: &str, method: &str) -> AuthorizationDecision;

    /// 重新加载全部规则，返回加载的规则数
    async fn reload(&self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}
