use super::{apply_order, fetch_page};
use crate::database::entities::role_menu;
use crate::database::error::{StoreContext, StoreError};
use chrono::Utc;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Select};
use warden_api::query::QueryResult;
use warden_domain::security::{RoleMenu, RoleMenuQuery};

/// 角色授权仓储。授权只有增删，没有字段更新
pub struct RoleMenuRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RoleMenuRepository<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn filtered(param: &RoleMenuQuery) -> Select<role_menu::Entity> {
        let mut select = role_menu::Entity::find();
        if let Some(role_id) = &param.role_id {
            select = select.filter(role_menu::Column::RoleId.eq(role_id.as_str()));
        }
        if !param.role_ids.is_empty() {
            select = select.filter(role_menu::Column::RoleId.is_in(param.role_ids.clone()));
        }
        select
    }

    pub async fn query(&self, param: &RoleMenuQuery) -> Result<QueryResult<RoleMenu>, StoreError> {
        let select = apply_order(Self::filtered(param), &param.order);
        let (list, pagination) = fetch_page(self.db, select, &param.pagination)
            .await
            .context("query role menus")?;
        Ok(QueryResult::new(list.into_iter().map(RoleMenu::from).collect(), pagination))
    }

    pub async fn get(&self, id: &str) -> Result<Option<RoleMenu>, StoreError> {
        let model = role_menu::Entity::find()
            .filter(role_menu::Column::Id.eq(id))
            .one(self.db)
            .await
            .context("get role menu")?;
        Ok(model.map(RoleMenu::from))
    }

    pub async fn create(&self, item: &RoleMenu) -> Result<(), StoreError> {
        let now = Utc::now();
        let active_model = role_menu::ActiveModel {
            id: Set(item.id.clone()),
            role_id: Set(item.role_id.clone()),
            menu_id: Set(item.menu_id.clone()),
            action_id: Set(item.action_id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        role_menu::Entity::insert(active_model)
            .exec(self.db)
            .await
            .context("create role menu")?;
        Ok(())
    }

    pub async fn update(&self, id: &str, item: &RoleMenu) -> Result<(), StoreError> {
        let active_model = role_menu::ActiveModel {
            role_id: Set(item.role_id.clone()),
            menu_id: Set(item.menu_id.clone()),
            action_id: Set(item.action_id.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        role_menu::Entity::update_many()
            .set(active_model)
            .filter(role_menu::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update role menu")?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        role_menu::Entity::delete_many()
            .filter(role_menu::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("delete role menu")?;
        Ok(())
    }

    pub async fn delete_by_role_id(&self, role_id: &str) -> Result<u64, StoreError> {
        let result = role_menu::Entity::delete_many()
            .filter(role_menu::Column::RoleId.eq(role_id))
            .exec(self.db)
            .await
            .context("delete role menus by role")?;
        Ok(result.rows_affected)
    }
}
