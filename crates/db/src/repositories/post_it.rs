//! Post-it repository.

use std::sync::Arc;

use crate::entities::{PostIt, post_it};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use wooddesk_common::{AppError, AppResult};

/// Post-it repository for database operations.
#[derive(Clone)]
pub struct PostItRepository {
    db: Arc<DatabaseConnection>,
}

impl PostItRepository {
    /// Create a new post-it repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post-it by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post_it::Model>> {
        PostIt::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post-it by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post_it::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post-it not found: {id}")))
    }

    /// Create a new post-it.
    pub async fn create(&self, model: post_it::ActiveModel) -> AppResult<post_it::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing post-it.
    pub async fn update(&self, model: post_it::ActiveModel) -> AppResult<post_it::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post-it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        PostIt::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a user's post-its, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<post_it::Model>> {
        PostIt::find()
            .filter(post_it::Column::UserId.eq(user_id))
            .order_by_desc(post_it::Column::Id)
            .all(self.db.as_ref())
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

    fn create_test_post_it(id: &str, user_id: &str) -> post_it::Model {
        post_it::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: "buy highlighters".to_string(),
            color: "#ffeb3b".to_string(),
            position_x: 10,
            position_y: 20,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let note = create_test_post_it("pi1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[note.clone()]])
                .into_connection(),
        );

        let repo = PostItRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].color, "#ffeb3b");
    }
}
