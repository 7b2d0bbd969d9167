//! Create `conversation` and `conversation_participant` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Conversation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Conversation::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: updated_at (conversation lists are recency-ordered)
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_updated_at")
                    .table(Conversation::Table)
                    .col(Conversation::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConversationParticipant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConversationParticipant::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConversationParticipant::ConversationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversationParticipant::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversationParticipant::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_participant_conversation")
                            .from(
                                ConversationParticipant::Table,
                                ConversationParticipant::ConversationId,
                            )
                            .to(Conversation::Table, Conversation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_participant_user")
                            .from(
                                ConversationParticipant::Table,
                                ConversationParticipant::UserId,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: a user joins a conversation at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_participant_pair")
                    .table(ConversationParticipant::Table)
                    .col(ConversationParticipant::ConversationId)
                    .col(ConversationParticipant::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for a user's conversation list)
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_participant_user_id")
                    .table(ConversationParticipant::Table)
                    .col(ConversationParticipant::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ConversationParticipant::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Conversation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Conversation {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ConversationParticipant {
    Table,
    Id,
    ConversationId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
