//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_user_profile_table;
mod m20250601_000003_create_friendship_table;
mod m20250601_000004_create_following_table;
mod m20250601_000005_create_friend_request_table;
mod m20250601_000006_create_conversation_tables;
mod m20250601_000007_create_message_tables;
mod m20250601_000008_create_subject_table;
mod m20250601_000009_create_post_tables;
mod m20250601_000010_create_study_session_table;
mod m20250601_000011_create_pomodoro_settings_table;
mod m20250601_000012_create_notification_table;
mod m20250601_000013_create_alarm_table;
mod m20250601_000014_create_post_it_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_user_profile_table::Migration),
            Box::new(m20250601_000003_create_friendship_table::Migration),
            Box::new(m20250601_000004_create_following_table::Migration),
            Box::new(m20250601_000005_create_friend_request_table::Migration),
            Box::new(m20250601_000006_create_conversation_tables::Migration),
            Box::new(m20250601_000007_create_message_tables::Migration),
            Box::new(m20250601_000008_create_subject_table::Migration),
            Box::new(m20250601_000009_create_post_tables::Migration),
            Box::new(m20250601_000010_create_study_session_table::Migration),
            Box::new(m20250601_000011_create_pomodoro_settings_table::Migration),
            Box::new(m20250601_000012_create_notification_table::Migration),
            Box::new(m20250601_000013_create_alarm_table::Migration),
            Box::new(m20250601_000014_create_post_it_table::Migration),
        ]
    }
}
