//! Create `alarm` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alarm::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alarm::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alarm::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Alarm::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Alarm::Time).time().not_null())
                    .col(ColumnDef::new(Alarm::Days).json_binary().not_null())
                    .col(
                        ColumnDef::new(Alarm::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Alarm::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alarm_user")
                            .from(Alarm::Table, Alarm::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for per-user listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_alarm_user_id")
                    .table(Alarm::Table)
                    .col(Alarm::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alarm::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Alarm {
    Table,
    Id,
    UserId,
    Name,
    Time,
    Days,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
