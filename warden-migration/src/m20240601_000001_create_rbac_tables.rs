use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240601_000001_create_rbac_tables"
    }
}

fn record_id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn uuid_key<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).string_len(36).not_null().unique_key().to_owned()
}

fn uuid_ref<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).string_len(36).not_null().to_owned()
}

fn text<T: IntoIden>(col: T, len: u32) -> ColumnDef {
    ColumnDef::new(col).string_len(len).not_null().default("").to_owned()
}

fn int<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).integer().not_null().default(0).to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().not_null().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut record_id(Users::RecordId))
                    .col(&mut uuid_key(Users::Id))
                    .col(&mut text(Users::Username, 64))
                    .col(&mut text(Users::Realname, 64))
                    .col(&mut text(Users::Password, 255))
                    .col(ColumnDef::new(Users::Email).string_len(128).null())
                    .col(ColumnDef::new(Users::Phone).string_len(32).null())
                    .col(&mut int(Users::Status))
                    .col(&mut text(Users::CreatedBy, 64))
                    .col(&mut timestamp(Users::CreatedAt))
                    .col(&mut timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(&mut record_id(Roles::RecordId))
                    .col(&mut uuid_key(Roles::Id))
                    .col(&mut text(Roles::Name, 100))
                    .col(&mut int(Roles::Sequence))
                    .col(&mut text(Roles::Remark, 1024))
                    .col(&mut int(Roles::Status))
                    .col(&mut text(Roles::CreatedBy, 64))
                    .col(&mut timestamp(Roles::CreatedAt))
                    .col(&mut timestamp(Roles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(&mut record_id(Menus::RecordId))
                    .col(&mut uuid_key(Menus::Id))
                    .col(&mut text(Menus::Name, 128))
                    .col(&mut int(Menus::Sequence))
                    .col(&mut text(Menus::Icon, 255))
                    .col(&mut text(Menus::Router, 255))
                    .col(&mut text(Menus::Component, 255))
                    .col(ColumnDef::new(Menus::ParentId).string_len(36).null())
                    .col(ColumnDef::new(Menus::ParentPath).text().not_null())
                    .col(&mut int(Menus::Hidden))
                    .col(&mut int(Menus::Status))
                    .col(&mut text(Menus::Remark, 1024))
                    .col(&mut text(Menus::CreatedBy, 64))
                    .col(&mut timestamp(Menus::CreatedAt))
                    .col(&mut timestamp(Menus::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuActions::Table)
                    .if_not_exists()
                    .col(&mut record_id(MenuActions::RecordId))
                    .col(&mut uuid_key(MenuActions::Id))
                    .col(&mut uuid_ref(MenuActions::MenuId))
                    .col(&mut text(MenuActions::Code, 100))
                    .col(&mut text(MenuActions::Name, 100))
                    .col(&mut timestamp(MenuActions::CreatedAt))
                    .col(&mut timestamp(MenuActions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuActionResources::Table)
                    .if_not_exists()
                    .col(&mut record_id(MenuActionResources::RecordId))
                    .col(&mut uuid_key(MenuActionResources::Id))
                    .col(&mut uuid_ref(MenuActionResources::ActionId))
                    .col(&mut text(MenuActionResources::Method, 16))
                    .col(&mut text(MenuActionResources::Path, 255))
                    .col(&mut timestamp(MenuActionResources::CreatedAt))
                    .col(&mut timestamp(MenuActionResources::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(&mut record_id(UserRoles::RecordId))
                    .col(&mut uuid_key(UserRoles::Id))
                    .col(&mut uuid_ref(UserRoles::UserId))
                    .col(&mut uuid_ref(UserRoles::RoleId))
                    .col(&mut timestamp(UserRoles::CreatedAt))
                    .col(&mut timestamp(UserRoles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoleMenus::Table)
                    .if_not_exists()
                    .col(&mut record_id(RoleMenus::RecordId))
                    .col(&mut uuid_key(RoleMenus::Id))
                    .col(&mut uuid_ref(RoleMenus::RoleId))
                    .col(&mut uuid_ref(RoleMenus::MenuId))
                    .col(&mut uuid_ref(RoleMenus::ActionId))
                    .col(&mut timestamp(RoleMenus::CreatedAt))
                    .col(&mut timestamp(RoleMenus::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleMenus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuActionResources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuActions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Menus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    RecordId,
    Id,
    Username,
    Realname,
    Password,
    Email,
    Phone,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Roles {
    Table,
    RecordId,
    Id,
    Name,
    Sequence,
    Remark,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Menus {
    Table,
    RecordId,
    Id,
    Name,
    Sequence,
    Icon,
    Router,
    Component,
    ParentId,
    ParentPath,
    Hidden,
    Status,
    Remark,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum MenuActions {
    Table,
    RecordId,
    Id,
    MenuId,
    Code,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum MenuActionResources {
    Table,
    RecordId,
    Id,
    ActionId,
    Method,
    Path,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum UserRoles {
    Table,
    RecordId,
    Id,
    UserId,
    RoleId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum RoleMenus {
    Table,
    RecordId,
    Id,
    RoleId,
    MenuId,
    ActionId,
    CreatedAt,
    UpdatedAt,
}
