use super::{apply_order, fetch_page};
use crate::database::entities::{user, user_role};
use crate::database::error::{StoreContext, StoreError};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, Select,
};
use warden_api::query::{QueryResult, Status};
use warden_domain::security::{User, UserQuery};

/// 用户仓储
pub struct UserRepository<'a, C> {
    db: &'a C,
}

fn without_password(model: user::Model) -> User {
    let mut user = User::from(model);
    user.password.clear();
    user
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn filtered(param: &UserQuery) -> Select<user::Entity> {
        let mut select = user::Entity::find();
        if let Some(username) = &param.username {
            select = select.filter(user::Column::Username.eq(username.as_str()));
        }
        if let Some(realname) = &param.realname {
            select = select.filter(user::Column::Realname.starts_with(realname.as_str()));
        }
        if let Some(status) = param.status {
            select = select.filter(user::Column::Status.eq(status.code()));
        }
        if !param.role_ids.is_empty() {
            select = select.filter(
                user::Column::Id.in_subquery(
                    Query::select()
                        .column(user_role::Column::UserId)
                        .from(user_role::Entity)
                        .and_where(user_role::Column::RoleId.is_in(param.role_ids.clone()))
                        .to_owned(),
                ),
            );
        }
        if let Some(value) = param.query_value.as_deref().filter(|v| !v.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(user::Column::Username.contains(value))
                    .add(user::Column::Realname.contains(value)),
            );
        }
        select
    }

    pub async fn query(&self, param: &UserQuery) -> Result<QueryResult<User>, StoreError> {
        let select = apply_order(Self::filtered(param), &param.order);
        let (list, pagination) = fetch_page(self.db, select, &param.pagination)
            .await
            .context("query users")?;
        let list = if param.with_password {
            list.into_iter().map(User::from).collect()
        } else {
            list.into_iter().map(without_password).collect()
        };
        Ok(QueryResult::new(list, pagination))
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>, StoreError> {
        let model = user::Entity::find()
            .filter(user::Column::Id.eq(id))
            .one(self.db)
            .await
            .context("get user")?;
        Ok(model.map(without_password))
    }

    /// 按用户名读取，包含密码哈希（用于登录校验）
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await
            .context("get user by username")?;
        Ok(model.map(User::from))
    }

    /// `item.password` 必须已经是哈希
    pub async fn create(&self, item: &User) -> Result<(), StoreError> {
        let now = Utc::now();
        let active_model = user::ActiveModel {
            id: Set(item.id.clone()),
            username: Set(item.username.clone()),
            realname: Set(item.realname.clone()),
            password: Set(item.password.clone()),
            email: Set(item.email.clone()),
            phone: Set(item.phone.clone()),
            status: Set(item.status.code()),
            created_by: Set(item.created_by.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        user::Entity::insert(active_model)
            .exec(self.db)
            .await
            .context("create user")?;
        Ok(())
    }

    /// 不修改密码，见 [`Self::update_password`]
    pub async fn update(&self, id: &str, item: &User) -> Result<(), StoreError> {
        let active_model = user::ActiveModel {
            username: Set(item.username.clone()),
            realname: Set(item.realname.clone()),
            email: Set(item.email.clone()),
            phone: Set(item.phone.clone()),
            status: Set(item.status.code()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        user::Entity::update_many()
            .set(active_model)
            .filter(user::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update user")?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        user::Entity::delete_many()
            .filter(user::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("delete user")?;
        Ok(())
    }

    pub async fn update_status(&self, id: &str, status: Status) -> Result<(), StoreError> {
        user::Entity::update_many()
            .col_expr(user::Column::Status, Expr::value(status.code()))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update user status")?;
        Ok(())
    }

    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), StoreError> {
        user::Entity::update_many()
            .col_expr(user::Column::Password, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(self.db)
            .await
            .context("update user password")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::database::testing::memory_store;
    use crate::database::Store;
    use warden_domain::security::{User, UserQuery, UserRole};

    fn user(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            realname: format!("{username} real"),
            password: "hash".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_password_only_read_on_request() {
        let db = memory_store().await;
        let users = Store::new(&db).users();
        users.create(&user("u1", "alice")).await.unwrap();

        assert!(users.get("u1").await.unwrap().unwrap().password.is_empty());
        let listed = users.query(&UserQuery::default()).await.unwrap();
        assert!(listed.list[0].password.is_empty());

        let with_password = users
            .query(&UserQuery {
                with_password: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(with_password.list[0].password, "hash");

        users.update_password("u1", "new-hash").await.unwrap();
        let by_name = users.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.password, "new-hash");
    }

    #[tokio::test]
    async fn test_users_by_role() {
        let db = memory_store().await;
        let store = Store::new(&db);
        store.users().create(&user("u1", "alice")).await.unwrap();
        store.users().create(&user("u2", "bob")).await.unwrap();
        store
            .user_roles()
            .create(&UserRole {
                id: "ur1".to_string(),
                user_id: "u2".to_string(),
                role_id: "r1".to_string(),
            })
            .await
            .unwrap();

        let holders = store
            .users()
            .query(&UserQuery {
                role_ids: vec!["r1".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(holders.list.len(), 1);
        assert_eq!(holders.list[0].username, "bob");

        assert_eq!(store.user_roles().delete_by_user_id("u2").await.unwrap(), 1);
    }
}
