//! Alarm service: user-configured desk alarms.

use chrono::Utc;
use sea_orm::Set;
use validator::Validate;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::alarm,
    repositories::{AlarmRepository, UserRepository},
};

/// Input for creating an alarm.
#[derive(Debug, Clone, Validate)]
pub struct CreateAlarmInput {
    /// Alarm name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Time of day the alarm fires.
    pub time: chrono::NaiveTime,
    /// Weekdays the alarm repeats on (0–6, 0 = Monday).
    pub days: Vec<u8>,
    /// Whether the alarm is armed.
    pub is_active: bool,
}

/// Input for updating an alarm. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateAlarmInput {
    /// New alarm name.
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// New time of day.
    pub time: Option<chrono::NaiveTime>,
    /// New weekday list.
    pub days: Option<Vec<u8>>,
    /// New armed state.
    pub is_active: Option<bool>,
}

fn validate_days(days: &[u8]) -> AppResult<()> {
    if days.iter().any(|&d| d > 6) {
        return Err(AppError::Validation(
            "Alarm days must be in 0..=6".to_string(),
        ));
    }
    Ok(())
}

/// Alarm service for business logic.
#[derive(Clone)]
pub struct AlarmService {
    alarm_repo: AlarmRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl AlarmService {
    /// Create a new alarm service.
    #[must_use]
    pub const fn new(alarm_repo: AlarmRepository, user_repo: UserRepository) -> Self {
        Self {
            alarm_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an alarm for a user.
    pub async fn create_alarm(
        &self,
        user_id: &str,
        input: CreateAlarmInput,
    ) -> AppResult<alarm::Model> {
        input.validate()?;
        validate_days(&input.days)?;

        self.user_repo.get_by_id(user_id).await?;

        let model = alarm::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            name: Set(input.name),
            time: Set(input.time),
            days: Set(serde_json::json!(input.days)),
            is_active: Set(input.is_active),
            created_at: Set(Utc::now().into()),
        };

        self.alarm_repo.create(model).await
    }

    /// Update an alarm. Only the owner may update.
    pub async fn update_alarm(
        &self,
        alarm_id: &str,
        user_id: &str,
        input: UpdateAlarmInput,
    ) -> AppResult<alarm::Model> {
        input.validate()?;
        if let Some(ref days) = input.days {
            validate_days(days)?;
        }

        let alarm = self.alarm_repo.get_by_id(alarm_id).await?;

        if alarm.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can update an alarm".to_string(),
            ));
        }

        let mut active: alarm::ActiveModel = alarm.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(time) = input.time {
            active.time = Set(time);
        }
        if let Some(days) = input.days {
            active.days = Set(serde_json::json!(days));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        self.alarm_repo.update(active).await
    }

    /// Delete an alarm. Only the owner may delete.
    pub async fn delete_alarm(&self, alarm_id: &str, user_id: &str) -> AppResult<()> {
        let alarm = self.alarm_repo.get_by_id(alarm_id).await?;

        if alarm.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can delete an alarm".to_string(),
            ));
        }

        self.alarm_repo.delete(alarm_id).await
    }

    /// Get a user's alarms ordered by time of day.
    pub async fn get_alarms(&self, user_id: &str) -> AppResult<Vec<alarm::Model>> {
        self.alarm_repo.find_by_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_alarm(id: &str, user_id: &str) -> alarm::Model {
        alarm::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: "Morning study".to_string(),
            time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            days: serde_json::json!([0, 1, 2, 3, 4]),
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(alarm_db: MockDatabase, user_db: MockDatabase) -> AlarmService {
        AlarmService::new(
            AlarmRepository::new(Arc::new(alarm_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_create_alarm_rejects_invalid_day() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .create_alarm(
                "user1",
                CreateAlarmInput {
                    name: "Bad".to_string(),
                    time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                    days: vec![1, 7],
                    is_active: true,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_alarm_rejects_non_owner() {
        let alarm_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_alarm("a1", "owner")]]);

        let service = service_with(alarm_db, MockDatabase::new(DatabaseBackend::Postgres));
        let result = service
            .update_alarm("a1", "intruder", UpdateAlarmInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
