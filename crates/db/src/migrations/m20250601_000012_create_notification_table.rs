//! Create `notification` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notification::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notification::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::NotificationType)
                            .string_len(32)
                            .not_null()
                            .default("general"),
                    )
                    .col(
                        ColumnDef::new(Notification::Title)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notification::Message).text().not_null())
                    .col(ColumnDef::new(Notification::Link).string_len(500))
                    .col(
                        ColumnDef::new(Notification::Priority)
                            .string_len(8)
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(Notification::TargetKind).string_len(32))
                    .col(ColumnDef::new(Notification::TargetId).string_len(32))
                    .col(
                        ColumnDef::new(Notification::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notification::IsDismissed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Notification::ReadAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_user")
                            .from(Notification::Table, Notification::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) - per-user recency listings
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_user_created_at")
                    .table(Notification::Table)
                    .col(Notification::UserId)
                    .col(Notification::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: notification_type
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_type")
                    .table(Notification::Table)
                    .col(Notification::NotificationType)
                    .to_owned(),
            )
            .await?;

        // Index: (is_read, is_dismissed) - unread badge queries
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_read_dismissed")
                    .table(Notification::Table)
                    .col(Notification::IsRead)
                    .col(Notification::IsDismissed)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notification {
    Table,
    Id,
    UserId,
    NotificationType,
    Title,
    Message,
    Link,
    Priority,
    TargetKind,
    TargetId,
    IsRead,
    IsDismissed,
    CreatedAt,
    ReadAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
