use super::{apply_order, fetch_page};
use crate::database::entities::menu;
use crate::database::error::{StoreContext, StoreError};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, Select,
};
use warden_api::query::{QueryResult, Status};
use warden_domain::menu::{Menu, MenuQuery};

/// 菜单仓储
pub struct MenuRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> MenuRepository<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn filtered(param: &MenuQuery) -> Select<menu::Entity> {
        let mut select = menu::Entity::find();
        if !param.ids.is_empty() {
            select = select.filter(menu::Column::Id.is_in(param.ids.clone()));
        }
        if let Some(name) = &param.name {
            select = select.filter(menu::Column::Name.eq(name.as_str()));
        }
        if let Some(parent_id) = &param.parent_id {
            select = select.filter(menu::Column::ParentId.eq(parent_id.as_str()));
        }
        if param.roots_only {
            select = select.filter(menu::Column::ParentId.is_null());
        }
        if let Some(prefix) = &param.descendants_of {
            // 按完整路径段匹配，避免 A/B 命中 A/B2
            select = select.filter(
                Condition::any()
                    .add(menu::Column::ParentPath.eq(prefix.as_str()))
                    .add(menu::Column::ParentPath.starts_with(format!("{prefix}/"))),
            );
        }
        if let Some(hidden) = param.hidden {
            select = select.filter(menu::Column::Hidden.eq(hidden));
        }
        if let Some(status) = param.status {
            select = select.filter(menu::Column::Status.eq(status.code()));
        }
        if let Some(value) = param.query_value.as_deref().filter(|v| !v.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(menu::Column::Name.contains(value))
                    .add(menu::Column::Remark.contains(value)),
            );
        }
        select
    }

    pub async fn query(&self, param: &MenuQuery) -> Result<QueryResult<Menu>, StoreError> {
        let select = apply_order(Self::filtered(param), &param.order);
        let (list, pagination) = fetch_page(self.db, select, &param.pagination)
            .await
            .context("query menus")?;
        Ok(QueryResult::new(list.into_iter().map(Menu::from).collect(), pagination))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Menu>, StoreError> {
        let model = menu::Entity::find()
            .filter(menu::Column::Id.eq(id))
            .one(self.db)
            .await
            .context("get menu")?;
        Ok(model.map(Menu::from))
    }

    /// 直接子节点数量
    pub async fn count_children(&self, id: &str) -> Result<u64, StoreError> {
        use sea_orm::PaginatorTrait;

        menu::Entity::find()
            .filter(menu::Column::ParentId.eq(id))
            .count(self.db)
            .await
            .context("count child menus")
    }

    pub async fn create(&self, item: &Menu) -> Result<(), StoreError> {
        let now = Utc::now();
        let active_model = menu::ActiveModel {
            id: Set(item.id.clone()),
            name: Set(item.name.clone()),
            sequence: Set(item.sequence),
            icon: Set(item.icon.clone()),
            router: Set(item.router.clone()),
            component: Set(item.component.clone()),
            parent_id: Set(item.parent_id.clone()),
            parent_path: Set(item.parent_path.clone()),
            hidden: Set(item.hidden),
            status: Set(item.status.code()),
            remark: Set(item.remark.clone()),
            created_by: Set(item.created_by.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        menu::Entity::insert(active_model)
            .exec(self.db)
            .await
            .context("create menu")?;
        Ok(())
    }

    /// 更新菜单字段（不含 `created_by`）
    pub async fn update(&self, id: &str, item: &Menu) -> Result<(), StoreError> {
        let active_model = menu::ActiveModel {
            name: Set(item.name.clone()),
            sequence: Set(item.sequence),
            icon: Set(item.icon.clone()),
            router: Set(item.router.clone()),
            component: Set(item.component.clone()),
            parent_id: Set(item.parent_id.clone()),
            parent_path: Set(item.parent_path.clone()),
            hidden: Set(item.hidden),
            status: Set(item.status.code()),
            remark: Set(item.remark.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        menu::Entity::update_many()
            .set(active_model)
            .filter(menu::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update menu")?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        menu::Entity::delete_many()
            .filter(menu::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("delete menu")?;
        Ok(())
    }

    pub async fn update_status(&self, id: &str, status: Status) -> Result<(), StoreError> {
        menu::Entity::update_many()
            .col_expr(menu::Column::Status, Expr::value(status.code()))
            .col_expr(menu::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(menu::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update menu status")?;
        Ok(())
    }

    pub async fn update_parent_path(&self, id: &str, parent_path: &str) -> Result<(), StoreError> {
        menu::Entity::update_many()
            .col_expr(menu::Column::ParentPath, Expr::value(parent_path))
            .col_expr(menu::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(menu::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update menu parent path")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::database::testing::memory_store;
    use crate::database::Store;
    use warden_api::query::{OrderParam, PaginationParam, Status};
    use warden_domain::menu::{Menu, MenuQuery};

    fn menu(id: &str, name: &str, parent: Option<&str>, parent_path: &str, sequence: i32) -> Menu {
        Menu {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(str::to_string),
            parent_path: parent_path.to_string(),
            sequence,
            hidden: -1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_menu_crud_and_pagination() {
        let db = memory_store().await;
        let store = Store::new(&db);
        let menus = store.menus();

        for i in 0..20 {
            menus
                .create(&menu(&format!("m{i}"), &format!("菜单{i}"), None, "", i))
                .await
                .unwrap();
        }

        let page = menus
            .query(&MenuQuery {
                pagination: PaginationParam::new(Some(2), Some(15)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 20);
        assert_eq!(page.list.len(), 5);
        // 默认 record_id 倒序，第二页是最早插入的
        assert_eq!(page.list[4].id, "m0");

        let mut item = menus.get("m3").await.unwrap().unwrap();
        item.name = "改名".to_string();
        menus.update("m3", &item).await.unwrap();
        assert_eq!(menus.get("m3").await.unwrap().unwrap().name, "改名");

        menus.update_status("m3", Status::Disabled).await.unwrap();
        let disabled = menus
            .query(&MenuQuery {
                status: Some(Status::Disabled),
                pagination: PaginationParam::unpaged(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(disabled.list.len(), 1);

        menus.delete("m3").await.unwrap();
        assert!(menus.get("m3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_descendant_filter_respects_segments() {
        let db = memory_store().await;
        let menus = Store::new(&db).menus();

        menus.create(&menu("A", "A", None, "", 1)).await.unwrap();
        menus.create(&menu("B", "B", Some("A"), "A", 1)).await.unwrap();
        menus.create(&menu("B2", "B2", Some("A"), "A", 2)).await.unwrap();
        menus.create(&menu("X", "X", Some("B"), "A/B", 1)).await.unwrap();
        menus.create(&menu("Z", "Z", Some("X"), "A/B/X", 1)).await.unwrap();
        menus.create(&menu("Y", "Y", Some("B2"), "A/B2", 1)).await.unwrap();

        let result = menus
            .query(&MenuQuery {
                descendants_of: Some("A/B".to_string()),
                order: OrderParam::asc("sequence"),
                pagination: PaginationParam::unpaged(),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut ids: Vec<_> = result.list.iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["X", "Z"]);

        assert_eq!(menus.count_children("A").await.unwrap(), 2);

        let roots = menus
            .query(&MenuQuery {
                roots_only: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(roots.list.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_order_key_falls_back() {
        let db = memory_store().await;
        let menus = Store::new(&db).menus();
        menus.create(&menu("a", "a", None, "", 1)).await.unwrap();
        menus.create(&menu("b", "b", None, "", 2)).await.unwrap();

        let result = menus
            .query(&MenuQuery {
                order: OrderParam::asc("no_such_column; drop table menus"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.list.len(), 2);
    }
}
