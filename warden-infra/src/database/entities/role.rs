use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use warden_api::query::Status;
use warden_domain::security::Role;

/// 角色表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i32,
    #[sea_orm(unique, column_type = "String(Some(36))")]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub sequence: i32,
    pub remark: String,
    pub status: i32,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Role {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sequence: model.sequence,
            remark: model.remark,
            status: Status::from_code(model.status),
            created_by: model.created_by,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
            role_menus: Vec::new(),
        }
    }
}
