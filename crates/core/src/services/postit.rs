//! Post-it service: quick desk notes.

use chrono::Utc;
use sea_orm::Set;
use validator::Validate;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::post_it,
    repositories::{PostItRepository, UserRepository},
};

/// Input for creating a post-it.
#[derive(Debug, Clone, Validate)]
pub struct CreatePostItInput {
    /// Note text.
    #[validate(length(min = 1, max = 500))]
    pub content: String,
    /// Hex color like `#ffeb3b`.
    pub color: Option<String>,
    /// Desk X position.
    pub position_x: i32,
    /// Desk Y position.
    pub position_y: i32,
}

/// Input for updating a post-it. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePostItInput {
    /// New note text.
    #[validate(length(min = 1, max = 500))]
    pub content: Option<String>,
    /// New hex color.
    pub color: Option<String>,
    /// New desk X position.
    pub position_x: Option<i32>,
    /// New desk Y position.
    pub position_y: Option<i32>,
}

fn validate_color(color: &str) -> AppResult<()> {
    let mut chars = color.chars();
    let valid = chars.next() == Some('#')
        && color.len() == 7
        && chars.all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Color must be a hex value like #ffeb3b, got: {color}"
        )))
    }
}

/// Post-it service for business logic.
#[derive(Clone)]
pub struct PostItService {
    post_it_repo: PostItRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl PostItService {
    /// Create a new post-it service.
    #[must_use]
    pub const fn new(post_it_repo: PostItRepository, user_repo: UserRepository) -> Self {
        Self {
            post_it_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post-it for a user.
    pub async fn create_post_it(
        &self,
        user_id: &str,
        input: CreatePostItInput,
    ) -> AppResult<post_it::Model> {
        input.validate()?;
        if let Some(ref color) = input.color {
            validate_color(color)?;
        }

        self.user_repo.get_by_id(user_id).await?;

        let model = post_it::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            content: Set(input.content),
            color: Set(input.color.unwrap_or_else(|| "#ffeb3b".to_string())),
            position_x: Set(input.position_x),
            position_y: Set(input.position_y),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.post_it_repo.create(model).await
    }

    /// Update a post-it. Only the owner may update.
    pub async fn update_post_it(
        &self,
        post_it_id: &str,
        user_id: &str,
        input: UpdatePostItInput,
    ) -> AppResult<post_it::Model> {
        input.validate()?;
        if let Some(ref color) = input.color {
            validate_color(color)?;
        }

        let note = self.post_it_repo.get_by_id(post_it_id).await?;

        if note.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can update a post-it".to_string(),
            ));
        }

        let mut active: post_it::ActiveModel = note.into();
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(color) = input.color {
            active.color = Set(color);
        }
        if let Some(position_x) = input.position_x {
            active.position_x = Set(position_x);
        }
        if let Some(position_y) = input.position_y {
            active.position_y = Set(position_y);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.post_it_repo.update(active).await
    }

    /// Delete a post-it. Only the owner may delete.
    pub async fn delete_post_it(&self, post_it_id: &str, user_id: &str) -> AppResult<()> {
        let note = self.post_it_repo.get_by_id(post_it_id).await?;

        if note.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can delete a post-it".to_string(),
            ));
        }

        self.post_it_repo.delete(post_it_id).await
    }

    /// Get a user's post-its, newest first.
    pub async fn get_post_its(&self, user_id: &str) -> AppResult<Vec<post_it::Model>> {
        self.post_it_repo.find_by_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post_it(id: &str, user_id: &str) -> post_it::Model {
        post_it::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: "buy highlighters".to_string(),
            color: "#ffeb3b".to_string(),
            position_x: 0,
            position_y: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(post_it_db: MockDatabase, user_db: MockDatabase) -> PostItService {
        PostItService::new(
            PostItRepository::new(Arc::new(post_it_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#ffeb3b").is_ok());
        assert!(validate_color("#FFEB3B").is_ok());
        assert!(validate_color("ffeb3b").is_err());
        assert!(validate_color("#ffeb3").is_err());
        assert!(validate_color("#ffeb3g").is_err());
    }

    #[tokio::test]
    async fn test_create_post_it_rejects_empty_content() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service
            .create_post_it(
                "user1",
                CreatePostItInput {
                    content: String::new(),
                    color: None,
                    position_x: 0,
                    position_y: 0,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_post_it_rejects_non_owner() {
        let post_it_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post_it("pi1", "owner")]]);

        let service = service_with(post_it_db, MockDatabase::new(DatabaseBackend::Postgres));
        let result = service.delete_post_it("pi1", "intruder").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
