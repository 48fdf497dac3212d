use super::{apply_order, fetch_page};
use crate::database::entities::user_role;
use crate::database::error::{StoreContext, StoreError};
use chrono::Utc;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Select};
use warden_api::query::QueryResult;
use warden_domain::security::{UserRole, UserRoleQuery};

/// 用户角色仓储。成员关系只有增删，没有字段更新
pub struct UserRoleRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRoleRepository<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn filtered(param: &UserRoleQuery) -> Select<user_role::Entity> {
        let mut select = user_role::Entity::find();
        if let Some(user_id) = &param.user_id {
            select = select.filter(user_role::Column::UserId.eq(user_id.as_str()));
        }
        if !param.user_ids.is_empty() {
            select = select.filter(user_role::Column::UserId.is_in(param.user_ids.clone()));
        }
        if let Some(role_id) = &param.role_id {
            select = select.filter(user_role::Column::RoleId.eq(role_id.as_str()));
        }
        select
    }

    pub async fn query(&self, param: &UserRoleQuery) -> Result<QueryResult<UserRole>, StoreError> {
        let select = apply_order(Self::filtered(param), &param.order);
        let (list, pagination) = fetch_page(self.db, select, &param.pagination)
            .await
            .context("query user roles")?;
        Ok(QueryResult::new(list.into_iter().map(UserRole::from).collect(), pagination))
    }

    pub async fn get(&self, id: &str) -> Result<Option<UserRole>, StoreError> {
        let model = user_role::Entity::find()
            .filter(user_role::Column::Id.eq(id))
            .one(self.db)
            .await
            .context("get user role")?;
        Ok(model.map(UserRole::from))
    }

    pub async fn create(&self, item: &UserRole) -> Result<(), StoreError> {
        let now = Utc::now();
        let active_model = user_role::ActiveModel {
            id: Set(item.id.clone()),
            user_id: Set(item.user_id.clone()),
            role_id: Set(item.role_id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        user_role::Entity::insert(active_model)
            .exec(self.db)
            .await
            .context("create user role")?;
        Ok(())
    }

    pub async fn update(&self, id: &str, item: &UserRole) -> Result<(), StoreError> {
        let active_model = user_role::ActiveModel {
            user_id: Set(item.user_id.clone()),
            role_id: Set(item.role_id.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        user_role::Entity::update_many()
            .set(active_model)
            .filter(user_role::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update user role")?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        user_role::Entity::delete_many()
            .filter(user_role::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("delete user role")?;
        Ok(())
    }

    pub async fn delete_by_user_id(&self, user_id: &str) -> Result<u64, StoreError> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(self.db)
            .await
            .context("delete user roles by user")?;
        Ok(result.rows_affected)
    }
}
