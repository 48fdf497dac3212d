use sea_orm::DbErr;

/// 存储层错误，只附加上下文，不解释底层错误
#[derive(Debug, thiserror::Error)]
#[error("{context}: {source}")]
pub struct StoreError {
    pub context: String,
    #[source]
    pub source: DbErr,
}

impl StoreError {
    pub fn new(context: impl Into<String>, source: DbErr) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(source: DbErr) -> Self {
        Self::new("database error", source)
    }
}

/// 给 `Result<_, DbErr>` 附加上下文
pub trait StoreContext<T> {
    fn context(self, context: impl Into<String>) -> Result<T, StoreError>;
}

impl<T> StoreContext<T> for Result<T, DbErr> {
    fn context(self, context: impl Into<String>) -> Result<T, StoreError> {
        self.map_err(|source| StoreError::new(context, source))
    }
}
