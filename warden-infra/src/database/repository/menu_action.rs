use super::{apply_order, fetch_page};
use crate::database::entities::menu_action;
use crate::database::error::{StoreContext, StoreError};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Select};
use warden_api::query::QueryResult;
use warden_domain::menu::{MenuAction, MenuActionQuery};

/// 菜单动作仓储
pub struct MenuActionRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> MenuActionRepository<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn filtered(param: &MenuActionQuery) -> Select<menu_action::Entity> {
        let mut select = menu_action::Entity::find();
        if let Some(menu_id) = &param.menu_id {
            select = select.filter(menu_action::Column::MenuId.eq(menu_id.as_str()));
        }
        if !param.menu_ids.is_empty() {
            select = select.filter(menu_action::Column::MenuId.is_in(param.menu_ids.clone()));
        }
        if !param.ids.is_empty() {
            select = select.filter(menu_action::Column::Id.is_in(param.ids.clone()));
        }
        select
    }

    pub async fn query(
        &self,
        param: &MenuActionQuery,
    ) -> Result<QueryResult<MenuAction>, StoreError> {
        let select = apply_order(Self::filtered(param), &param.order);
        let (list, pagination) = fetch_page(self.db, select, &param.pagination)
            .await
            .context("query menu actions")?;
        Ok(QueryResult::new(list.into_iter().map(MenuAction::from).collect(), pagination))
    }

    pub async fn get(&self, id: &str) -> Result<Option<MenuAction>, StoreError> {
        let model = menu_action::Entity::find()
            .filter(menu_action::Column::Id.eq(id))
            .one(self.db)
            .await
            .context("get menu action")?;
        Ok(model.map(MenuAction::from))
    }

    pub async fn create(&self, item: &MenuAction) -> Result<(), StoreError> {
        let now = Utc::now();
        let active_model = menu_action::ActiveModel {
            id: Set(item.id.clone()),
            menu_id: Set(item.menu_id.clone()),
            code: Set(item.code.clone()),
            name: Set(item.name.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        menu_action::Entity::insert(active_model)
            .exec(self.db)
            .await
            .context("create menu action")?;
        Ok(())
    }

    /// 只更新名称；编码是对账键，不可修改
    pub async fn update(&self, id: &str, item: &MenuAction) -> Result<(), StoreError> {
        menu_action::Entity::update_many()
            .col_expr(menu_action::Column::Name, Expr::value(item.name.as_str()))
            .col_expr(menu_action::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(menu_action::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update menu action")?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        menu_action::Entity::delete_many()
            .filter(menu_action::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("delete menu action")?;
        Ok(())
    }

    pub async fn delete_by_menu_id(&self, menu_id: &str) -> Result<u64, StoreError> {
        let result = menu_action::Entity::delete_many()
            .filter(menu_action::Column::MenuId.eq(menu_id))
            .exec(self.db)
            .await
            .context("delete menu actions by menu")?;
        Ok(result.rows_affected)
    }
}
