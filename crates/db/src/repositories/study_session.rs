//! Study session repository.

use std::sync::Arc;

use crate::entities::{StudySession, study_session};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use wooddesk_common::{AppError, AppResult};

/// Study session repository for database operations.
#[derive(Clone)]
pub struct StudySessionRepository {
    db: Arc<DatabaseConnection>,
}

impl StudySessionRepository {
    /// Create a new study session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<study_session::Model>> {
        StudySession::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a session by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<study_session::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Study session not found: {id}")))
    }

    /// Create a new session.
    pub async fn create(
        &self,
        model: study_session::ActiveModel,
    ) -> AppResult<study_session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing session.
    pub async fn update(
        &self,
        model: study_session::ActiveModel,
    ) -> AppResult<study_session::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user's sessions, newest start first (paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<study_session::Model>> {
        let mut query = StudySession::find()
            .filter(study_session::Column::UserId.eq(user_id))
            .order_by_desc(study_session::Column::StartTime)
            .order_by_desc(study_session::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(study_session::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user's active (unended) sessions.
    ///
    /// More than one row is possible; nothing enforces a single active
    /// session per user.
    pub async fn find_active_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<study_session::Model>> {
        StudySession::find()
            .filter(study_session::Column::UserId.eq(user_id))
            .filter(study_session::Column::EndTime.is_null())
            .order_by_desc(study_session::Column::StartTime)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's sessions for a subject.
    pub async fn count_by_user_and_subject(
        &self,
        user_id: &str,
        subject_id: &str,
    ) -> AppResult<u64> {
        StudySession::find()
            .filter(study_session::Column::UserId.eq(user_id))
            .filter(study_session::Column::SubjectId.eq(subject_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_session(id: &str, user_id: &str, ended: bool) -> study_session::Model {
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        study_session::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            subject_id: None,
            start_time: now,
            end_time: ended.then_some(now),
            duration_seconds: ended.then_some(0),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_active_by_user() {
        let active = create_test_session("ss1", "user1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[active.clone()]])
                .into_connection(),
        );

        let repo = StudySessionRepository::new(db);
        let result = repo.find_active_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert!(result[0].is_active());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_returns_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<study_session::Model>::new()])
                .into_connection(),
        );

        let repo = StudySessionRepository::new(db);
        let result = repo.get_by_id("ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
