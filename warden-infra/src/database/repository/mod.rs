//! 关联存储
//!
//! 仓储对 `ConnectionTrait` 泛型，同一套代码既能跑在连接池上，
//! 也能跑在请求的事务里（见 [`crate::database::TransactionScope::store`]）。

mod menu;
mod menu_action;
mod menu_action_resource;
mod role;
mod role_menu;
mod user;
mod user_role;

pub use menu::MenuRepository;
pub use menu_action::MenuActionRepository;
pub use menu_action_resource::MenuActionResourceRepository;
pub use role::RoleRepository;
pub use role_menu::RoleMenuRepository;
pub use user::UserRepository;
pub use user_role::UserRoleRepository;

use crate::database::{StoreError, TransactionScope};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryOrder, QuerySelect, Select,
};
use std::str::FromStr;
use std::sync::Arc;
use warden_api::query::{OrderDirection, OrderParam, Pagination, PaginationParam, DEFAULT_ORDER_KEY};

/// 七个仓储的入口
pub struct Store<'a, C> {
    db: &'a C,
}

impl<C> Clone for Store<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Store<'_, C> {}

impl<'a, C: ConnectionTrait> Store<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub fn users(&self) -> UserRepository<'a, C> {
        UserRepository::new(self.db)
    }

    pub fn roles(&self) -> RoleRepository<'a, C> {
        RoleRepository::new(self.db)
    }

    pub fn menus(&self) -> MenuRepository<'a, C> {
        MenuRepository::new(self.db)
    }

    pub fn menu_actions(&self) -> MenuActionRepository<'a, C> {
        MenuActionRepository::new(self.db)
    }

    pub fn menu_action_resources(&self) -> MenuActionResourceRepository<'a, C> {
        MenuActionResourceRepository::new(self.db)
    }

    pub fn user_roles(&self) -> UserRoleRepository<'a, C> {
        UserRoleRepository::new(self.db)
    }

    pub fn role_menus(&self) -> RoleMenuRepository<'a, C> {
        RoleMenuRepository::new(self.db)
    }
}

/// 关联存储：持有连接池，可以绑定到某个请求的事务
#[derive(Clone)]
pub struct AssociationStore {
    db: Arc<DatabaseConnection>,
}

impl AssociationStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &Arc<DatabaseConnection> {
        &self.db
    }

    /// 直接在连接池上读写（只读已提交的数据）
    pub fn store(&self) -> Store<'_, DatabaseConnection> {
        Store::new(&self.db)
    }

    /// 开启新的事务作用域
    pub async fn begin(&self) -> Result<TransactionScope, StoreError> {
        TransactionScope::open(&self.db).await
    }

    /// 把存储重定向到调用方的事务作用域
    pub fn with_transaction<'s>(
        &self,
        scope: &'s TransactionScope,
    ) -> Store<'s, DatabaseTransaction> {
        scope.store()
    }
}

/// 按排序参数排序，未知字段回退到 `record_id`
pub(crate) fn apply_order<E>(select: Select<E>, order: &OrderParam) -> Select<E>
where
    E: EntityTrait,
{
    let direction = match order.direction {
        OrderDirection::Asc => Order::Asc,
        OrderDirection::Desc => Order::Desc,
    };
    let column = E::Column::from_str(&order.key).or_else(|_| {
        tracing::warn!(
            key = %order.key,
            "unknown order key, falling back to {}",
            DEFAULT_ORDER_KEY
        );
        E::Column::from_str(DEFAULT_ORDER_KEY)
    });
    match column {
        Ok(column) => select.order_by(column, direction),
        Err(_) => select,
    }
}

/// 查询一页；`unpaged` 时返回全部
pub(crate) async fn fetch_page<'db, E, C>(
    db: &'db C,
    select: Select<E>,
    page: &PaginationParam,
) -> Result<(Vec<E::Model>, Pagination), DbErr>
where
    E: EntityTrait,
    E::Model: Sync + 'db,
    C: ConnectionTrait,
{
    if page.unpaged {
        let list = select.all(db).await?;
        let total = list.len() as u64;
        return Ok((
            list,
            Pagination {
                total,
                current: 1,
                page_size: total,
            },
        ));
    }

    let total = select.clone().count(db).await?;
    let list = if total == 0 {
        Vec::new()
    } else {
        select
            .offset(page.offset())
            .limit(page.page_size)
            .all(db)
            .await?
    };

    Ok((
        list,
        Pagination {
            total,
            current: page.current,
            page_size: page.page_size,
        },
    ))
}
