use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use warden_domain::menu::MenuAction;

/// 菜单动作表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_actions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i32,
    #[sea_orm(unique, column_type = "String(Some(36))")]
    pub id: String,
    #[sea_orm(column_type = "String(Some(36))")]
    pub menu_id: String,
    pub code: String,
    pub name: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MenuAction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            menu_id: model.menu_id,
            code: model.code,
            name: model.name,
            resources: Vec::new(),
        }
    }
}
