pub mod entities;
mod error;
pub mod manager;
pub mod repository;
mod transaction;

pub use error::{StoreContext, StoreError};
pub use manager::DatabaseManager;
pub use repository::{AssociationStore, Store};
pub use transaction::{ScopeOutcome, ScopeReport, ScopeState, TransactionScope};

#[cfg(test)]
pub(crate) mod testing {
    use sea_orm::{ConnectOptions, DatabaseConnection};

    /// 迁移好的内存库，单连接
    pub async fn memory_store() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        warden_migration::connect_and_migrate(options).await.unwrap()
    }
}
