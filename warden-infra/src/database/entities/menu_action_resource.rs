use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use warden_domain::menu::MenuActionResource;

/// 动作资源表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_action_resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i32,
    #[sea_orm(unique, column_type = "String(Some(36))")]
    pub id: String,
    #[sea_orm(column_type = "String(Some(36))")]
    pub action_id: String,
    pub method: String,
    pub path: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MenuActionResource {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            action_id: model.action_id,
            method: model.method,
            path: model.path,
        }
    }
}
