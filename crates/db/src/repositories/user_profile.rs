//! User profile repository.

use std::sync::Arc;

use crate::entities::{UserProfile, user_profile};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use wooddesk_common::{AppError, AppResult};

/// User profile repository for database operations.
#[derive(Clone)]
pub struct UserProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl UserProfileRepository {
    /// Create a new user profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a profile by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user_profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile not found: {id}")))
    }

    /// Find the profile owned by a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the profile owned by a user, failing when absent.
    pub async fn get_by_user(&self, user_id: &str) -> AppResult<user_profile::Model> {
        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile not found for user: {user_id}")))
    }

    /// Create a new profile.
    pub async fn create(&self, model: user_profile::ActiveModel) -> AppResult<user_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing profile.
    pub async fn update(&self, model: user_profile::ActiveModel) -> AppResult<user_profile::Model> {
        model
            .update(self.db.as_ref())
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

    fn create_test_profile(id: &str, user_id: &str) -> user_profile::Model {
        user_profile::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            bio: String::new(),
            avatar_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let profile = create_test_profile("profile1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "profile1");
    }

    #[tokio::test]
    async fn test_get_by_user_missing_returns_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.get_by_user("ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
