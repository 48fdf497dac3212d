use super::{apply_order, fetch_page};
use crate::database::entities::{menu_action, menu_action_resource};
use crate::database::error::{StoreContext, StoreError};
use chrono::Utc;
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Select};
use warden_api::query::QueryResult;
use warden_domain::menu::{MenuActionResource, MenuActionResourceQuery};

/// 动作资源仓储
pub struct MenuActionResourceRepository<'a, C> {
    db: &'a C,
}

/// 属于给定菜单的动作ID子查询
fn action_ids_of_menus(menu_ids: Vec<String>) -> SelectStatement {
    Query::select()
        .column(menu_action::Column::Id)
        .from(menu_action::Entity)
        .and_where(menu_action::Column::MenuId.is_in(menu_ids))
        .to_owned()
}

impl<'a, C: ConnectionTrait> MenuActionResourceRepository<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn filtered(param: &MenuActionResourceQuery) -> Select<menu_action_resource::Entity> {
        let mut select = menu_action_resource::Entity::find();
        if let Some(menu_id) = &param.menu_id {
            select = select.filter(
                menu_action_resource::Column::ActionId
                    .in_subquery(action_ids_of_menus(vec![menu_id.clone()])),
            );
        }
        if !param.menu_ids.is_empty() {
            select = select.filter(
                menu_action_resource::Column::ActionId
                    .in_subquery(action_ids_of_menus(param.menu_ids.clone())),
            );
        }
        if let Some(action_id) = &param.action_id {
            select = select.filter(menu_action_resource::Column::ActionId.eq(action_id.as_str()));
        }
        select
    }

    pub async fn query(
        &self,
        param: &MenuActionResourceQuery,
    ) -> Result<QueryResult<MenuActionResource>, StoreError> {
        let select = apply_order(Self::filtered(param), &param.order);
        let (list, pagination) = fetch_page(self.db, select, &param.pagination)
            .await
            .context("query menu action resources")?;
        Ok(QueryResult::new(
            list.into_iter().map(MenuActionResource::from).collect(),
            pagination,
        ))
    }

    pub async fn get(&self, id: &str) -> Result<Option<MenuActionResource>, StoreError> {
        let model = menu_action_resource::Entity::find()
            .filter(menu_action_resource::Column::Id.eq(id))
            .one(self.db)
            .await
            .context("get menu action resource")?;
        Ok(model.map(MenuActionResource::from))
    }

    pub async fn create(&self, item: &MenuActionResource) -> Result<(), StoreError> {
        let now = Utc::now();
        let active_model = menu_action_resource::ActiveModel {
            id: Set(item.id.clone()),
            action_id: Set(item.action_id.clone()),
            method: Set(item.method.to_ascii_uppercase()),
            path: Set(item.path.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        menu_action_resource::Entity::insert(active_model)
            .exec(self.db)
            .await
            .context("create menu action resource")?;
        Ok(())
    }

    pub async fn update(&self, id: &str, item: &MenuActionResource) -> Result<(), StoreError> {
        let active_model = menu_action_resource::ActiveModel {
            method: Set(item.method.to_ascii_uppercase()),
            path: Set(item.path.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        menu_action_resource::Entity::update_many()
            .set(active_model)
            .filter(menu_action_resource::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update menu action resource")?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        menu_action_resource::Entity::delete_many()
            .filter(menu_action_resource::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("delete menu action resource")?;
        Ok(())
    }

    pub async fn delete_by_action_id(&self, action_id: &str) -> Result<u64, StoreError> {
        let result = menu_action_resource::Entity::delete_many()
            .filter(menu_action_resource::Column::ActionId.eq(action_id))
            .exec(self.db)
            .await
            .context("delete resources by action")?;
        Ok(result.rows_affected)
    }

    pub async fn delete_by_menu_id(&self, menu_id: &str) -> Result<u64, StoreError> {
        let result = menu_action_resource::Entity::delete_many()
            .filter(
                menu_action_resource::Column::ActionId
                    .in_subquery(action_ids_of_menus(vec![menu_id.to_string()])),
            )
            .exec(self.db)
            .await
            .context("delete resources by menu")?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use crate::database::testing::memory_store;
    use crate::database::Store;
    use warden_domain::menu::{MenuAction, MenuActionResource, MenuActionResourceQuery};

    fn action(id: &str, menu_id: &str, code: &str) -> MenuAction {
        MenuAction {
            id: id.to_string(),
            menu_id: menu_id.to_string(),
            code: code.to_string(),
            name: code.to_string(),
            resources: Vec::new(),
        }
    }

    fn resource(id: &str, action_id: &str, method: &str, path: &str) -> MenuActionResource {
        MenuActionResource {
            id: id.to_string(),
            action_id: action_id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn test_resources_by_menu_and_cascade_delete() {
        let db = memory_store().await;
        let store = Store::new(&db);

        store.menu_actions().create(&action("a1", "m1", "view")).await.unwrap();
        store.menu_actions().create(&action("a2", "m1", "edit")).await.unwrap();
        store.menu_actions().create(&action("a3", "m2", "view")).await.unwrap();

        let resources = store.menu_action_resources();
        resources.create(&resource("r1", "a1", "get", "/api/v1/widgets")).await.unwrap();
        resources.create(&resource("r2", "a2", "PUT", "/api/v1/widgets/:id")).await.unwrap();
        resources.create(&resource("r3", "a3", "GET", "/api/v1/gadgets")).await.unwrap();

        let of_m1 = resources
            .query(&MenuActionResourceQuery {
                menu_id: Some("m1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(of_m1.pagination.total, 2);
        assert!(of_m1.list.iter().any(|r| r.method == "GET"));

        assert_eq!(resources.delete_by_menu_id("m1").await.unwrap(), 2);
        assert_eq!(store.menu_actions().delete_by_menu_id("m1").await.unwrap(), 2);

        let remaining = resources.query(&MenuActionResourceQuery::default()).await.unwrap();
        assert_eq!(remaining.list.len(), 1);
        assert_eq!(remaining.list[0].id, "r3");
    }
}
