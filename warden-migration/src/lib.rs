pub use sea_orm_migration::prelude::*;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

mod m20240601_000001_create_rbac_tables;
mod m20240601_000002_create_rbac_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_rbac_tables::Migration),
            Box::new(m20240601_000002_create_rbac_indexes::Migration),
        ]
    }
}

/// 连接数据库并执行全部待执行的迁移
pub async fn connect_and_migrate(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn test_migrations_apply_on_sqlite() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);
        let db = connect_and_migrate(options).await.unwrap();

        let rows = db
            .query_all(Statement::from_string(
                db.get_database_backend(),
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name".to_string(),
            ))
            .await
            .unwrap();
        let tables: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String>("", "name").unwrap())
            .collect();
        for table in [
            "menu_action_resources",
            "menu_actions",
            "menus",
            "role_menus",
            "roles",
            "user_roles",
            "users",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }

        // 再跑一次是空操作
        Migrator::up(&db, None).await.unwrap();
    }
}
