use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use warden_api::query::Status;
use warden_domain::menu::Menu;

/// 菜单表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i32,
    #[sea_orm(unique, column_type = "String(Some(36))")]
    pub id: String,
    pub name: String,
    pub sequence: i32,
    pub icon: String,
    pub router: String,
    pub component: String,
    #[sea_orm(nullable, column_type = "String(Some(36))")]
    pub parent_id: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub parent_path: String,
    pub hidden: i32,
    pub status: i32,
    pub remark: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Menu {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sequence: model.sequence,
            icon: model.icon,
            router: model.router,
            component: model.component,
            parent_id: model.parent_id,
            parent_path: model.parent_path,
            hidden: model.hidden,
            status: Status::from_code(model.status),
            remark: model.remark,
            created_by: model.created_by,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
            actions: Vec::new(),
        }
    }
}
