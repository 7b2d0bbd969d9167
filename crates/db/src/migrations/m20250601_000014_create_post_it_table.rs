//! Create `post_it` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostIt::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostIt::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostIt::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PostIt::Content).text().not_null())
                    .col(
                        ColumnDef::new(PostIt::Color)
                            .string_len(7)
                            .not_null()
                            .default("#ffeb3b"),
                    )
                    .col(
                        ColumnDef::new(PostIt::PositionX)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PostIt::PositionY)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PostIt::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(PostIt::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_it_user")
                            .from(PostIt::Table, PostIt::UserId)
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
                    .name("idx_post_it_user_id")
                    .table(PostIt::Table)
                    .col(PostIt::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostIt::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostIt {
    Table,
    Id,
    UserId,
    Content,
    Color,
    PositionX,
    PositionY,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
