//! Create `friend_request` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FriendRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::FromProfileId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::ToProfileId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(FriendRequest::RespondedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_from")
                            .from(FriendRequest::Table, FriendRequest::FromProfileId)
                            .to(UserProfile::Table, UserProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_to")
                            .from(FriendRequest::Table, FriendRequest::ToProfileId)
                            .to(UserProfile::Table, UserProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (from, to) - prevent duplicate requests
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_from_to")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::FromProfileId)
                    .col(FriendRequest::ToProfileId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: to_profile_id (for listing received requests)
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_to_profile_id")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::ToProfileId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FriendRequest {
    Table,
    Id,
    FromProfileId,
    ToProfileId,
    Status,
    CreatedAt,
    RespondedAt,
}

#[derive(Iden)]
enum UserProfile {
    Table,
    Id,
}
