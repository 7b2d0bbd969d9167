//! Create `friendship` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Friendship::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Friendship::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Friendship::ProfileAId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Friendship::ProfileBId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Friendship::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_profile_a")
                            .from(Friendship::Table, Friendship::ProfileAId)
                            .to(UserProfile::Table, UserProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_profile_b")
                            .from(Friendship::Table, Friendship::ProfileBId)
                            .to(UserProfile::Table, UserProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one row per canonical pair
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_pair")
                    .table(Friendship::Table)
                    .col(Friendship::ProfileAId)
                    .col(Friendship::ProfileBId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: profile_b_id (pair index covers profile_a_id lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_profile_b")
                    .table(Friendship::Table)
                    .col(Friendship::ProfileBId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Friendship::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Friendship {
    Table,
    Id,
    ProfileAId,
    ProfileBId,
    CreatedAt,
}

#[derive(Iden)]
enum UserProfile {
    Table,
    Id,
}
