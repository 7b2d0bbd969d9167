//! Create `pomodoro_settings` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PomodoroSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PomodoroSettings::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PomodoroSettings::UserId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PomodoroSettings::WorkDuration)
                            .integer()
                            .not_null()
                            .default(25),
                    )
                    .col(
                        ColumnDef::new(PomodoroSettings::BreakDuration)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(PomodoroSettings::LongBreakDuration)
                            .integer()
                            .not_null()
                            .default(15),
                    )
                    .col(
                        ColumnDef::new(PomodoroSettings::SessionsUntilLongBreak)
                            .integer()
                            .not_null()
                            .default(4),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pomodoro_settings_user")
                            .from(PomodoroSettings::Table, PomodoroSettings::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PomodoroSettings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PomodoroSettings {
    Table,
    Id,
    UserId,
    WorkDuration,
    BreakDuration,
    LongBreakDuration,
    SessionsUntilLongBreak,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
