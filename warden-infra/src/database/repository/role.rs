use super::{apply_order, fetch_page};
use crate::database::entities::{role, user_role};
use crate::database::error::{StoreContext, StoreError};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, Select,
};
use warden_api::query::{QueryResult, Status};
use warden_domain::security::{Role, RoleQuery};

/// 角色仓储
pub struct RoleRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RoleRepository<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn filtered(param: &RoleQuery) -> Select<role::Entity> {
        let mut select = role::Entity::find();
        if !param.ids.is_empty() {
            select = select.filter(role::Column::Id.is_in(param.ids.clone()));
        }
        if let Some(name) = &param.name {
            select = select.filter(role::Column::Name.eq(name.as_str()));
        }
        if let Some(user_id) = &param.user_id {
            select = select.filter(
                role::Column::Id.in_subquery(
                    Query::select()
                        .column(user_role::Column::RoleId)
                        .from(user_role::Entity)
                        .and_where(user_role::Column::UserId.eq(user_id.as_str()))
                        .to_owned(),
                ),
            );
        }
        if let Some(status) = param.status {
            select = select.filter(role::Column::Status.eq(status.code()));
        }
        if let Some(value) = param.query_value.as_deref().filter(|v| !v.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(role::Column::Name.contains(value))
                    .add(role::Column::Remark.contains(value)),
            );
        }
        select
    }

    pub async fn query(&self, param: &RoleQuery) -> Result<QueryResult<Role>, StoreError> {
        let select = apply_order(Self::filtered(param), &param.order);
        let (list, pagination) = fetch_page(self.db, select, &param.pagination)
            .await
            .context("query roles")?;
        Ok(QueryResult::new(list.into_iter().map(Role::from).collect(), pagination))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Role>, StoreError> {
        let model = role::Entity::find()
            .filter(role::Column::Id.eq(id))
            .one(self.db)
            .await
            .context("get role")?;
        Ok(model.map(Role::from))
    }

    pub async fn create(&self, item: &Role) -> Result<(), StoreError> {
        let now = Utc::now();
        let active_model = role::ActiveModel {
            id: Set(item.id.clone()),
            name: Set(item.name.clone()),
            sequence: Set(item.sequence),
            remark: Set(item.remark.clone()),
            status: Set(item.status.code()),
            created_by: Set(item.created_by.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        role::Entity::insert(active_model)
            .exec(self.db)
            .await
            .context("create role")?;
        Ok(())
    }

    pub async fn update(&self, id: &str, item: &Role) -> Result<(), StoreError> {
        let active_model = role::ActiveModel {
            name: Set(item.name.clone()),
            sequence: Set(item.sequence),
            remark: Set(item.remark.clone()),
            status: Set(item.status.code()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        role::Entity::update_many()
            .set(active_model)
            .filter(role::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update role")?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        role::Entity::delete_many()
            .filter(role::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("delete role")?;
        Ok(())
    }

    pub async fn update_status(&self, id: &str, status: Status) -> Result<(), StoreError> {
        role::Entity::update_many()
            .col_expr(role::Column::Status, Expr::value(status.code()))
            .col_expr(role::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(role::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update role status")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::database::testing::memory_store;
    use crate::database::Store;
    use warden_api::query::Status;
    use warden_domain::security::{Role, RoleQuery, UserRole};

    fn role(id: &str, name: &str) -> Role {
        Role {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_roles_held_by_user() {
        let db = memory_store().await;
        let store = Store::new(&db);

        store.roles().create(&role("r1", "管理员")).await.unwrap();
        store.roles().create(&role("r2", "审计员")).await.unwrap();
        store.roles().create(&role("r3", "访客")).await.unwrap();
        for role_id in ["r1", "r3"] {
            store
                .user_roles()
                .create(&UserRole {
                    id: format!("ur-{role_id}"),
                    user_id: "u1".to_string(),
                    role_id: role_id.to_string(),
                })
                .await
                .unwrap();
        }
        store.roles().update_status("r3", Status::Disabled).await.unwrap();

        let held = store
            .roles()
            .query(&RoleQuery {
                user_id: Some("u1".to_string()),
                status: Some(Status::Enabled),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(held.list.len(), 1);
        assert_eq!(held.list[0].id, "r1");

        let by_value = store
            .roles()
            .query(&RoleQuery {
                query_value: Some("审计".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_value.list[0].id, "r2");
    }
}
