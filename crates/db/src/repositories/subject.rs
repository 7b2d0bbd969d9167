//! Subject repository.

use std::sync::Arc;

use crate::entities::{Subject, subject};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use wooddesk_common::{AppError, AppResult};

/// Subject repository for database operations.
#[derive(Clone)]
pub struct SubjectRepository {
    db: Arc<DatabaseConnection>,
}

impl SubjectRepository {
    /// Create a new subject repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a subject by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<subject::Model>> {
        Subject::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a subject by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<subject::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subject not found: {id}")))
    }

    /// Find a subject by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<subject::Model>> {
        Subject::find()
            .filter(subject::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a subject by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<subject::Model>> {
        Subject::find()
            .filter(subject::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new subject.
    pub async fn create(&self, model: subject::ActiveModel) -> AppResult<subject::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all subjects ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<subject::Model>> {
        Subject::find()
            .order_by_asc(subject::Column::Name)
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

    fn create_test_subject(id: &str, name: &str, slug: &str) -> subject::Model {
        subject::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let subject = create_test_subject("s1", "Calculus", "calculus");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[subject.clone()]])
                .into_connection(),
        );

        let repo = SubjectRepository::new(db);
        let result = repo.find_by_name("Calculus").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().slug, "calculus");
    }
}
