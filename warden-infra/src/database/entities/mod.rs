//! 七张表的 sea-orm 实体
//!
//! 每张表都有自增的 `record_id`（默认排序字段）和对外的字符串 `id`。

pub mod menu;
pub mod menu_action;
pub mod menu_action_resource;
pub mod role;
pub mod role_menu;
pub mod user;
pub mod user_role;
