use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use std::time::Duration;

/// 数据库连接参数
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub sqlx_logging: bool,
}

impl DatabaseOptions {
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .sqlx_logging(self.sqlx_logging);
        options
    }
}

/// DatabaseManager 管理主数据库连接池
#[derive(Clone)]
pub struct DatabaseManager {
    primary: Arc<DatabaseConnection>,
}

impl DatabaseManager {
    /// 连接数据库（不执行迁移）
    pub async fn new(options: &DatabaseOptions) -> Result<Self, DbErr> {
        let db = Database::connect(options.connect_options()).await?;
        tracing::info!(max_connections = options.max_connections, "database connected");
        Ok(Self::from_connection(db))
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            primary: Arc::new(db),
        }
    }

    /// 获取主数据库连接
    pub fn primary_db(&self) -> Arc<DatabaseConnection> {
        self.primary.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options() {
        let options = DatabaseOptions {
            url: "sqlite::memory:".to_string(),
            max_connections: 8,
            min_connections: 2,
            connect_timeout: Duration::from_secs(3),
            sqlx_logging: false,
        };
        let connect = options.connect_options();
        assert_eq!(connect.get_url(), "sqlite::memory:");
        assert_eq!(connect.get_max_connections(), Some(8));
        assert_eq!(connect.get_min_connections(), Some(2));
    }
}
