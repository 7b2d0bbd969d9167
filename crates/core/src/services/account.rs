//! Account service.
//!
//! Registration is an explicit factory: the user row, its profile and its
//! pomodoro settings are created together in one transaction, so a user
//! never exists without the rows the rest of the system assumes.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use std::sync::Arc;
use validator::Validate;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::{pomodoro_settings, user, user_profile},
    repositories::{PomodoroSettingsRepository, UserProfileRepository, UserRepository},
};

/// Input for registering a new user.
#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    /// Unique handle, 3–64 word characters.
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    /// Unique email address.
    #[validate(email)]
    pub email: String,
}

/// Input for updating a profile.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateProfileInput {
    /// New bio text.
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    /// New profile picture URL.
    pub avatar_url: Option<String>,
}

/// Everything provisioned for a freshly registered user.
pub struct Registration {
    /// The created user.
    pub user: user::Model,
    /// The created profile.
    pub profile: user_profile::Model,
    /// The created pomodoro settings.
    pub settings: pomodoro_settings::Model,
}

/// Account service for registration and profile management.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    pomodoro_repo: PomodoroSettingsRepository,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
        pomodoro_repo: PomodoroSettingsRepository,
    ) -> Self {
        Self {
            db,
            user_repo,
            profile_repo,
            pomodoro_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user, provisioning profile and pomodoro settings in
    /// the same transaction.
    pub async fn register(&self, input: RegisterInput) -> AppResult<Registration> {
        input.validate()?;

        if !input
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits and underscores".to_string(),
            ));
        }

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username already taken: {}",
                input.username
            )));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Email already registered: {}",
                input.email
            )));
        }

        let now = Utc::now().into();
        let user_id = self.id_gen.generate();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = user::ActiveModel {
            id: Set(user_id.clone()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let profile = user_profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.clone()),
            bio: Set(String::new()),
            avatar_url: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let settings = pomodoro_settings::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.clone()),
            work_duration: Set(25),
            break_duration: Set(5),
            long_break_duration: Set(15),
            sessions_until_long_break: Set(4),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(user_id = %user.id, username = %user.username, "Registered user");

        Ok(Registration {
            user,
            profile,
            settings,
        })
    }

    /// Get a user's profile.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<user_profile::Model> {
        self.profile_repo.get_by_user(user_id).await
    }

    /// Update a user's profile bio and/or avatar.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user_profile::Model> {
        input.validate()?;

        let profile = self.profile_repo.get_by_user(user_id).await?;
        let mut active: user_profile::ActiveModel = profile.into();

        if let Some(bio) = input.bio {
            active.bio = Set(bio);
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.profile_repo.update(active).await
    }

    /// Deactivate a user account.
    pub async fn deactivate(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.deactivate(user_id).await
    }

    /// Search active users by username or email substring.
    pub async fn search(
        &self,
        query: &str,
        searcher_id: &str,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        self.user_repo.search(trimmed, searcher_id, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            email: format!("{username}@example.com"),
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> AccountService {
        let db = Arc::new(db);
        AccountService::new(
            db.clone(),
            UserRepository::new(db.clone()),
            UserProfileRepository::new(db.clone()),
            PomodoroSettingsRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_register_rejects_short_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .register(RegisterInput {
                username: "ab".to_string(),
                email: "ab@example.com".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_username_chars() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .register(RegisterInput {
                username: "bad name!".to_string(),
                email: "bad@example.com".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .register(RegisterInput {
                username: "alice".to_string(),
                email: "not-an-email".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let existing = create_test_user("user1", "alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();
        let service = service_with(db);

        let result = service
            .register(RegisterInput {
                username: "alice".to_string(),
                email: "alice2@example.com".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_search_with_blank_query_returns_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service.search("   ", "user1", 50).await.unwrap();

        assert!(result.is_empty());
    }
}
