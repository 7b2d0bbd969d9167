//! Friendship repository.
//!
//! Friendship rows are stored once per pair in canonical order
//! (`profile_a_id` < `profile_b_id`); every lookup canonicalizes first so
//! the read view is symmetric.

use std::sync::Arc;

use crate::entities::{Friendship, friendship};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use wooddesk_common::{AppError, AppResult};

/// Order a profile pair canonically (lower ID first).
#[must_use]
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Friendship repository for database operations.
#[derive(Clone)]
pub struct FriendshipRepository {
    db: Arc<DatabaseConnection>,
}

impl FriendshipRepository {
    /// Create a new friendship repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the friendship edge between two profiles, in either orientation.
    pub async fn find_by_pair(
        &self,
        profile_a: &str,
        profile_b: &str,
    ) -> AppResult<Option<friendship::Model>> {
        let (lo, hi) = canonical_pair(profile_a, profile_b);

        Friendship::find()
            .filter(friendship::Column::ProfileAId.eq(lo))
            .filter(friendship::Column::ProfileBId.eq(hi))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether two profiles are friends.
    pub async fn are_friends(&self, profile_a: &str, profile_b: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(profile_a, profile_b).await?.is_some())
    }

    /// Create a new friendship edge.
    pub async fn create(&self, model: friendship::ActiveModel) -> AppResult<friendship::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the friendship edge between two profiles, if present.
    pub async fn delete_by_pair(&self, profile_a: &str, profile_b: &str) -> AppResult<()> {
        let (lo, hi) = canonical_pair(profile_a, profile_b);

        Friendship::delete_many()
            .filter(friendship::Column::ProfileAId.eq(lo))
            .filter(friendship::Column::ProfileBId.eq(hi))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get all friendship edges touching a profile.
    pub async fn find_for_profile(&self, profile_id: &str) -> AppResult<Vec<friendship::Model>> {
        Friendship::find()
            .filter(
                Condition::any()
                    .add(friendship::Column::ProfileAId.eq(profile_id))
                    .add(friendship::Column::ProfileBId.eq(profile_id)),
            )
            .order_by_desc(friendship::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the profile IDs of a profile's friends.
    pub async fn find_friend_ids(&self, profile_id: &str) -> AppResult<Vec<String>> {
        let edges = self.find_for_profile(profile_id).await?;
        Ok(edges
            .into_iter()
            .map(|edge| {
                if edge.profile_a_id == profile_id {
                    edge.profile_b_id
                } else {
                    edge.profile_a_id
                }
            })
            .collect())
    }

    /// Count a profile's friends.
    pub async fn count_for_profile(&self, profile_id: &str) -> AppResult<u64> {
        Friendship::find()
            .filter(
                Condition::any()
                    .add(friendship::Column::ProfileAId.eq(profile_id))
                    .add(friendship::Column::ProfileBId.eq(profile_id)),
            )
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

    fn create_test_friendship(id: &str, a: &str, b: &str) -> friendship::Model {
        friendship::Model {
            id: id.to_string(),
            profile_a_id: a.to_string(),
            profile_b_id: b.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_canonical_pair_orders_lexicographically() {
        assert_eq!(canonical_pair("p1", "p2"), ("p1", "p2"));
        assert_eq!(canonical_pair("p2", "p1"), ("p1", "p2"));
    }

    #[tokio::test]
    async fn test_are_friends_is_symmetric() {
        let edge = create_test_friendship("f1", "p1", "p2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge.clone()], [edge.clone()]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        assert!(repo.are_friends("p1", "p2").await.unwrap());
        assert!(repo.are_friends("p2", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_friend_ids_reports_the_other_side() {
        let edges = vec![
            create_test_friendship("f1", "p1", "p2"),
            create_test_friendship("f2", "p0", "p1"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([edges])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        let ids = repo.find_friend_ids("p1").await.unwrap();

        assert_eq!(ids, vec!["p2".to_string(), "p0".to_string()]);
    }
}
