//! Friend request repository.

use std::sync::Arc;

use crate::entities::{FriendRequest, friend_request};
use crate::entities::friend_request::FriendRequestStatus;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use wooddesk_common::{AppError, AppResult};

/// Friend request repository for database operations.
#[derive(Clone)]
pub struct FriendRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl FriendRequestRepository {
    /// Create a new friend request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a friend request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a friend request by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<friend_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Friend request not found: {id}")))
    }

    /// Find the request for an ordered (from, to) pair, regardless of status.
    pub async fn find_by_pair(
        &self,
        from_profile_id: &str,
        to_profile_id: &str,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::FromProfileId.eq(from_profile_id))
            .filter(friend_request::Column::ToProfileId.eq(to_profile_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pending request for an ordered (from, to) pair.
    pub async fn find_pending_by_pair(
        &self,
        from_profile_id: &str,
        to_profile_id: &str,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::FromProfileId.eq(from_profile_id))
            .filter(friend_request::Column::ToProfileId.eq(to_profile_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new friend request.
    pub async fn create(
        &self,
        model: friend_request::ActiveModel,
    ) -> AppResult<friend_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing friend request.
    pub async fn update(
        &self,
        model: friend_request::ActiveModel,
    ) -> AppResult<friend_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending requests received by a profile (paginated).
    pub async fn find_received_pending(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<friend_request::Model>> {
        let mut query = FriendRequest::find()
            .filter(friend_request::Column::ToProfileId.eq(profile_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .order_by_desc(friend_request::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(friend_request::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending requests sent by a profile (paginated).
    pub async fn find_sent_pending(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<friend_request::Model>> {
        let mut query = FriendRequest::find()
            .filter(friend_request::Column::FromProfileId.eq(profile_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .order_by_desc(friend_request::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(friend_request::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending requests received by a profile.
    pub async fn count_received_pending(&self, profile_id: &str) -> AppResult<u64> {
        FriendRequest::find()
            .filter(friend_request::Column::ToProfileId.eq(profile_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
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

    fn create_test_request(id: &str, from: &str, to: &str) -> friend_request::Model {
        friend_request::Model {
            id: id.to_string(),
            from_profile_id: from.to_string(),
            to_profile_id: to.to_string(),
            status: FriendRequestStatus::Pending,
            created_at: Utc::now().into(),
            responded_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_pending_by_pair() {
        let request = create_test_request("fr1", "p1", "p2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request.clone()]])
                .into_connection(),
        );

        let repo = FriendRequestRepository::new(db);
        let result = repo.find_pending_by_pair("p1", "p2").await.unwrap();

        assert!(result.is_some());
        assert!(result.unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_returns_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friend_request::Model>::new()])
                .into_connection(),
        );

        let repo = FriendRequestRepository::new(db);
        let result = repo.get_by_id("fr_missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
