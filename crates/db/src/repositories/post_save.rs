//! Post save (bookmark) repository.

use std::sync::Arc;

use crate::entities::{PostSave, post_save};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use wooddesk_common::{AppError, AppResult};

/// Post save repository for database operations.
#[derive(Clone)]
pub struct PostSaveRepository {
    db: Arc<DatabaseConnection>,
}

impl PostSaveRepository {
    /// Create a new post save repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a save by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<post_save::Model>> {
        PostSave::find()
            .filter(post_save::Column::UserId.eq(user_id))
            .filter(post_save::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has saved a post.
    pub async fn has_saved(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        Ok(self.find_by_user_and_post(user_id, post_id).await?.is_some())
    }

    /// Create a new save.
    pub async fn create(&self, model: post_save::ActiveModel) -> AppResult<post_save::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a save by user and post.
    pub async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        PostSave::delete_many()
            .filter(post_save::Column::UserId.eq(user_id))
            .filter(post_save::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count saves on a post.
    pub async fn count_for_post(&self, post_id: &str) -> AppResult<u64> {
        PostSave::find()
            .filter(post_save::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the post IDs a user has saved, newest first (paginated).
    pub async fn find_post_ids_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<String>> {
        let mut query = PostSave::find()
            .filter(post_save::Column::UserId.eq(user_id))
            .order_by_desc(post_save::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(post_save::Column::Id.lt(id));
        }

        let rows = query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.post_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_save(id: &str, post_id: &str, user_id: &str) -> post_save::Model {
        post_save::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_has_saved() {
        let save = create_test_save("s1", "post1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[save.clone()]])
                .into_connection(),
        );

        let repo = PostSaveRepository::new(db);
        assert!(repo.has_saved("user1", "post1").await.unwrap());
    }
}
