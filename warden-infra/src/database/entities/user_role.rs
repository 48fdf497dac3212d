use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use warden_domain::security::UserRole;

/// 用户角色关联表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i32,
    #[sea_orm(unique, column_type = "String(Some(36))")]
    pub id: String,
    #[sea_orm(column_type = "String(Some(36))")]
    pub user_id: String,
    #[sea_orm(column_type = "String(Some(36))")]
    pub role_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserRole {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            role_id: model.role_id,
        }
    }
}
