//! Alarm repository.

use std::sync::Arc;

use crate::entities::{Alarm, alarm};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use wooddesk_common::{AppError, AppResult};

/// Alarm repository for database operations.
#[derive(Clone)]
pub struct AlarmRepository {
    db: Arc<DatabaseConnection>,
}

impl AlarmRepository {
    /// Create a new alarm repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an alarm by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<alarm::Model>> {
        Alarm::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an alarm by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<alarm::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Alarm not found: {id}")))
    }

    /// Create a new alarm.
    pub async fn create(&self, model: alarm::ActiveModel) -> AppResult<alarm::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing alarm.
    pub async fn update(&self, model: alarm::ActiveModel) -> AppResult<alarm::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an alarm.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Alarm::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a user's alarms ordered by time of day.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<alarm::Model>> {
        Alarm::find()
            .filter(alarm::Column::UserId.eq(user_id))
            .order_by_asc(alarm::Column::Time)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

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

    #[tokio::test]
    async fn test_find_by_user() {
        let alarm = create_test_alarm("a1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alarm.clone()]])
                .into_connection(),
        );

        let repo = AlarmRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert!(result[0].is_active);
    }
}
