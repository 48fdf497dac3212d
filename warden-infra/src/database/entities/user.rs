use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use warden_api::query::Status;
use warden_domain::security::User;

/// 用户表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i32,
    #[sea_orm(unique, column_type = "String(Some(36))")]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub realname: String,
    /// 密码哈希，默认查询不读取
    pub password: String,
    #[sea_orm(nullable)]
    pub email: Option<String>,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    pub status: i32,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            realname: model.realname,
            password: model.password,
            email: model.email,
            phone: model.phone,
            status: Status::from_code(model.status),
            created_by: model.created_by,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
            user_roles: Vec::new(),
        }
    }
}
