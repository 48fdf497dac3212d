use thiserror::Error;
use warden_infra::StoreError;
use warden_service::ServiceError;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Menu file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for WardenError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        WardenError::Server(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WardenError>;
