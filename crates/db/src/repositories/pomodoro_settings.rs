//! Pomodoro settings repository.

use std::sync::Arc;

use crate::entities::{PomodoroSettings, pomodoro_settings};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use wooddesk_common::{AppError, AppResult};

/// Pomodoro settings repository for database operations.
#[derive(Clone)]
pub struct PomodoroSettingsRepository {
    db: Arc<DatabaseConnection>,
}

impl PomodoroSettingsRepository {
    /// Create a new pomodoro settings repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the settings row owned by a user.
    pub async fn find_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<pomodoro_settings::Model>> {
        PomodoroSettings::find()
            .filter(pomodoro_settings::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new settings row.
    pub async fn create(
        &self,
        model: pomodoro_settings::ActiveModel,
    ) -> AppResult<pomodoro_settings::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing settings row.
    pub async fn update(
        &self,
        model: pomodoro_settings::ActiveModel,
    ) -> AppResult<pomodoro_settings::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
