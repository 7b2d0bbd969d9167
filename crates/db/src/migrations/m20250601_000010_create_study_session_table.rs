//! Create `study_session` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StudySession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudySession::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudySession::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudySession::SubjectId).string_len(32))
                    .col(
                        ColumnDef::new(StudySession::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudySession::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(StudySession::DurationSeconds).big_integer())
                    .col(
                        ColumnDef::new(StudySession::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_study_session_user")
                            .from(StudySession::Table, StudySession::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_study_session_subject")
                            .from(StudySession::Table, StudySession::SubjectId)
                            .to(Subject::Table, Subject::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, subject_id, start_time) - per-user history queries
        manager
            .create_index(
                Index::create()
                    .name("idx_study_session_user_subject_start")
                    .table(StudySession::Table)
                    .col(StudySession::UserId)
                    .col(StudySession::SubjectId)
                    .col(StudySession::StartTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudySession::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StudySession {
    Table,
    Id,
    UserId,
    SubjectId,
    StartTime,
    EndTime,
    DurationSeconds,
    Notes,
}

#[derive(Iden)]
enum Subject {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
