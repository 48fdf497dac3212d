use warden_infra::StoreError;

/// 服务层错误
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// 引用的实体不存在
    #[error("not found: {0}")]
    NotFound(String),

    /// 唯一性冲突
    #[error("conflict: {0}")]
    Conflict(String),

    /// 破坏结构约束（自引用、删除有子节点的菜单、删除仍被持有的角色）
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(what: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{what} {id}"))
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
