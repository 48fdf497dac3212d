use crate::m20240601_000001_create_rbac_tables::{
    MenuActionResources, MenuActions, Menus, RoleMenus, Roles, UserRoles, Users,
};
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240601_000002_create_rbac_indexes"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let indexes = vec![
            Index::create()
                .name("uk_users_username")
                .table(Users::Table)
                .col(Users::Username)
                .unique()
                .to_owned(),
            Index::create()
                .name("uk_roles_name")
                .table(Roles::Table)
                .col(Roles::Name)
                .unique()
                .to_owned(),
            Index::create()
                .name("idx_menus_parent_id")
                .table(Menus::Table)
                .col(Menus::ParentId)
                .to_owned(),
            Index::create()
                .name("uk_menu_actions_menu_code")
                .table(MenuActions::Table)
                .col(MenuActions::MenuId)
                .col(MenuActions::Code)
                .unique()
                .to_owned(),
            Index::create()
                .name("uk_menu_action_resources_key")
                .table(MenuActionResources::Table)
                .col(MenuActionResources::ActionId)
                .col(MenuActionResources::Method)
                .col(MenuActionResources::Path)
                .unique()
                .to_owned(),
            Index::create()
                .name("uk_user_roles_user_role")
                .table(UserRoles::Table)
                .col(UserRoles::UserId)
                .col(UserRoles::RoleId)
                .unique()
                .to_owned(),
            Index::create()
                .name("uk_role_menus_grant")
                .table(RoleMenus::Table)
                .col(RoleMenus::RoleId)
                .col(RoleMenus::MenuId)
                .col(RoleMenus::ActionId)
                .unique()
                .to_owned(),
        ];

        for index in indexes {
            manager.create_index(index).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let indexes = vec![
            Index::drop().name("uk_role_menus_grant").table(RoleMenus::Table).to_owned(),
            Index::drop().name("uk_user_roles_user_role").table(UserRoles::Table).to_owned(),
            Index::drop()
                .name("uk_menu_action_resources_key")
                .table(MenuActionResources::Table)
                .to_owned(),
            Index::drop().name("uk_menu_actions_menu_code").table(MenuActions::Table).to_owned(),
            Index::drop().name("idx_menus_parent_id").table(Menus::Table).to_owned(),
            Index::drop().name("uk_roles_name").table(Roles::Table).to_owned(),
            Index::drop().name("uk_users_username").table(Users::Table).to_owned(),
        ];

        for index in indexes {
            manager.drop_index(index).await?;
        }
        Ok(())
    }
}
