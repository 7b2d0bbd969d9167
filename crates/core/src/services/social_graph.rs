//! Social graph service: friendships, friend requests and follows.

use crate::services::notification::NotificationService;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use std::sync::Arc;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::{friend_request, friendship, following},
    repositories::{
        FollowingRepository, FriendRequestRepository, FriendshipRepository, UserProfileRepository,
        UserRepository, canonical_pair,
    },
};

/// Result of a send-friend-request operation.
pub enum FriendRequestOutcome {
    /// A new pending request was created.
    Requested(friend_request::Model),
    /// A pending request in the reverse direction existed and was accepted
    /// instead of creating a crossed duplicate.
    AutoAccepted(friend_request::Model),
    /// The profiles are already friends; nothing was created.
    AlreadyFriends,
    /// A request for this ordered pair already exists; nothing was created.
    AlreadyRequested(friend_request::Model),
}

/// Social graph service for business logic.
#[derive(Clone)]
pub struct SocialGraphService {
    db: Arc<DatabaseConnection>,
    friendship_repo: FriendshipRepository,
    friend_request_repo: FriendRequestRepository,
    following_repo: FollowingRepository,
    profile_repo: UserProfileRepository,
    user_repo: UserRepository,
    notifications: Option<NotificationService>,
    id_gen: IdGenerator,
}

impl SocialGraphService {
    /// Create a new social graph service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        friendship_repo: FriendshipRepository,
        friend_request_repo: FriendRequestRepository,
        following_repo: FollowingRepository,
        profile_repo: UserProfileRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            db,
            friendship_repo,
            friend_request_repo,
            following_repo,
            profile_repo,
            user_repo,
            notifications: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the notification service.
    pub fn set_notification_service(&mut self, notifications: NotificationService) {
        self.notifications = Some(notifications);
    }

    /// Send a friend request from one profile to another.
    ///
    /// If the recipient already has a pending request towards the sender,
    /// that reverse request is accepted instead of creating a crossed
    /// duplicate.
    pub async fn send_friend_request(
        &self,
        from_profile_id: &str,
        to_profile_id: &str,
    ) -> AppResult<FriendRequestOutcome> {
        if from_profile_id == to_profile_id {
            return Err(AppError::BadRequest(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        let from_profile = self.profile_repo.get_by_id(from_profile_id).await?;
        let to_profile = self.profile_repo.get_by_id(to_profile_id).await?;

        if self
            .friendship_repo
            .are_friends(from_profile_id, to_profile_id)
            .await?
        {
            return Ok(FriendRequestOutcome::AlreadyFriends);
        }

        // Crossed requests merge: accept the reverse pending request
        if let Some(reverse) = self
            .friend_request_repo
            .find_pending_by_pair(to_profile_id, from_profile_id)
            .await?
        {
            let accepted = self.accept_internal(&reverse).await?;
            self.notify_accepted(&accepted).await;
            return Ok(FriendRequestOutcome::AutoAccepted(accepted));
        }

        if let Some(existing) = self
            .friend_request_repo
            .find_by_pair(from_profile_id, to_profile_id)
            .await?
        {
            return Ok(FriendRequestOutcome::AlreadyRequested(existing));
        }

        let model = friend_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            from_profile_id: Set(from_profile_id.to_string()),
            to_profile_id: Set(to_profile_id.to_string()),
            status: Set(friend_request::FriendRequestStatus::Pending),
            created_at: Set(Utc::now().into()),
            responded_at: Set(None),
        };

        let request = self.friend_request_repo.create(model).await?;
        tracing::debug!(
            request_id = %request.id,
            from = %from_profile_id,
            to = %to_profile_id,
            "Created friend request"
        );

        if let Some(ref notifications) = self.notifications {
            match self.user_repo.get_by_id(&from_profile.user_id).await {
                Ok(sender) => {
                    if let Err(e) = notifications
                        .notify_friend_request(&to_profile.user_id, &request.id, &sender.username)
                        .await
                    {
                        tracing::warn!(error = %e, "Failed to create friend request notification");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load sender for notification");
                }
            }
        }

        Ok(FriendRequestOutcome::Requested(request))
    }

    /// Accept a pending friend request.
    ///
    /// Only the recipient may accept. The status flip and the friendship
    /// edge are written in one transaction.
    pub async fn accept_request(
        &self,
        request_id: &str,
        acting_profile_id: &str,
    ) -> AppResult<friend_request::Model> {
        let request = self.friend_request_repo.get_by_id(request_id).await?;

        if request.to_profile_id != acting_profile_id {
            return Err(AppError::Forbidden(
                "Only the recipient can accept a friend request".to_string(),
            ));
        }

        if !request.is_pending() {
            return Err(AppError::Conflict(
                "Friend request is already resolved".to_string(),
            ));
        }

        let accepted = self.accept_internal(&request).await?;
        self.notify_accepted(&accepted).await;
        Ok(accepted)
    }

    /// Reject a pending friend request. Terminal: a rejected request never
    /// becomes pending again.
    pub async fn reject_request(
        &self,
        request_id: &str,
        acting_profile_id: &str,
    ) -> AppResult<friend_request::Model> {
        let request = self.friend_request_repo.get_by_id(request_id).await?;

        if request.to_profile_id != acting_profile_id {
            return Err(AppError::Forbidden(
                "Only the recipient can reject a friend request".to_string(),
            ));
        }

        if !request.is_pending() {
            return Err(AppError::Conflict(
                "Friend request is already resolved".to_string(),
            ));
        }

        let mut active: friend_request::ActiveModel = request.into();
        active.status = Set(friend_request::FriendRequestStatus::Rejected);
        active.responded_at = Set(Some(Utc::now().into()));

        let rejected = self.friend_request_repo.update(active).await?;
        tracing::debug!(request_id = %rejected.id, "Rejected friend request");
        Ok(rejected)
    }

    /// Flip a pending request to accepted and insert the friendship edge,
    /// atomically.
    async fn accept_internal(
        &self,
        request: &friend_request::Model,
    ) -> AppResult<friend_request::Model> {
        let now = Utc::now().into();
        let (lo, hi) = canonical_pair(&request.from_profile_id, &request.to_profile_id);

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        friendship::ActiveModel {
            id: Set(self.id_gen.generate()),
            profile_a_id: Set(lo.to_string()),
            profile_b_id: Set(hi.to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: friend_request::ActiveModel = request.clone().into();
        active.status = Set(friend_request::FriendRequestStatus::Accepted);
        active.responded_at = Set(Some(now));

        let accepted = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            request_id = %accepted.id,
            from = %accepted.from_profile_id,
            to = %accepted.to_profile_id,
            "Accepted friend request"
        );

        Ok(accepted)
    }

    /// Best-effort notification to the original sender after acceptance.
    async fn notify_accepted(&self, request: &friend_request::Model) {
        let Some(ref notifications) = self.notifications else {
            return;
        };

        let sender_user = match self.profile_repo.get_by_id(&request.from_profile_id).await {
            Ok(profile) => profile.user_id,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load profile for notification");
                return;
            }
        };

        let acceptor_username = match self.profile_repo.get_by_id(&request.to_profile_id).await {
            Ok(profile) => match self.user_repo.get_by_id(&profile.user_id).await {
                Ok(user) => user.username,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load acceptor for notification");
                    return;
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load profile for notification");
                return;
            }
        };

        if let Err(e) = notifications
            .notify_friend_request_accepted(&sender_user, &request.id, &acceptor_username)
            .await
        {
            tracing::warn!(error = %e, "Failed to create acceptance notification");
        }
    }

    /// Remove the friendship between two profiles. Safe to call when they
    /// are not friends.
    pub async fn remove_friend(&self, profile_a: &str, profile_b: &str) -> AppResult<()> {
        self.friendship_repo
            .delete_by_pair(profile_a, profile_b)
            .await
    }

    /// Follow another profile. Re-following is a no-op.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        self.profile_repo.get_by_id(follower_id).await?;
        self.profile_repo.get_by_id(followee_id).await?;

        if self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Ok(());
        }

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.following_repo.create(model).await?;
        Ok(())
    }

    /// Stop following another profile. Safe to call when not following.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        self.following_repo
            .delete_by_pair(follower_id, followee_id)
            .await
    }

    /// Check whether two profiles are friends. Symmetric.
    pub async fn is_friend(&self, profile_a: &str, profile_b: &str) -> AppResult<bool> {
        self.friendship_repo.are_friends(profile_a, profile_b).await
    }

    /// Check whether one profile follows another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// Count a profile's friends.
    pub async fn friend_count(&self, profile_id: &str) -> AppResult<u64> {
        self.friendship_repo.count_for_profile(profile_id).await
    }

    /// Count a profile's followers.
    pub async fn follower_count(&self, profile_id: &str) -> AppResult<u64> {
        self.following_repo.count_followers(profile_id).await
    }

    /// Count the profiles a profile follows.
    pub async fn following_count(&self, profile_id: &str) -> AppResult<u64> {
        self.following_repo.count_following(profile_id).await
    }

    /// Get the profile IDs of a profile's friends.
    pub async fn friend_ids(&self, profile_id: &str) -> AppResult<Vec<String>> {
        self.friendship_repo.find_friend_ids(profile_id).await
    }

    /// Get pending requests received by a profile (paginated).
    pub async fn pending_received(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<friend_request::Model>> {
        self.friend_request_repo
            .find_received_pending(profile_id, limit, until_id)
            .await
    }

    /// Get pending requests sent by a profile (paginated).
    pub async fn pending_sent(
        &self,
        profile_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<friend_request::Model>> {
        self.friend_request_repo
            .find_sent_pending(profile_id, limit, until_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use wooddesk_db::entities::friend_request::FriendRequestStatus;
    use wooddesk_db::entities::user_profile;

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

    fn create_test_request(
        id: &str,
        from: &str,
        to: &str,
        status: FriendRequestStatus,
    ) -> friend_request::Model {
        friend_request::Model {
            id: id.to_string(),
            from_profile_id: from.to_string(),
            to_profile_id: to.to_string(),
            status,
            created_at: Utc::now().into(),
            responded_at: None,
        }
    }

    fn create_test_friendship(id: &str, a: &str, b: &str) -> friendship::Model {
        friendship::Model {
            id: id.to_string(),
            profile_a_id: a.to_string(),
            profile_b_id: b.to_string(),
            created_at: Utc::now().into(),
        }
    }

    struct MockDbs {
        main: MockDatabase,
        friendship: MockDatabase,
        friend_request: MockDatabase,
        following: MockDatabase,
        profile: MockDatabase,
        user: MockDatabase,
    }

    impl MockDbs {
        fn new() -> Self {
            Self {
                main: MockDatabase::new(DatabaseBackend::Postgres),
                friendship: MockDatabase::new(DatabaseBackend::Postgres),
                friend_request: MockDatabase::new(DatabaseBackend::Postgres),
                following: MockDatabase::new(DatabaseBackend::Postgres),
                profile: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn into_service(self) -> SocialGraphService {
            SocialGraphService::new(
                Arc::new(self.main.into_connection()),
                FriendshipRepository::new(Arc::new(self.friendship.into_connection())),
                FriendRequestRepository::new(Arc::new(self.friend_request.into_connection())),
                FollowingRepository::new(Arc::new(self.following.into_connection())),
                UserProfileRepository::new(Arc::new(self.profile.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
            )
        }
    }

    #[tokio::test]
    async fn test_send_request_to_self_returns_error() {
        let service = MockDbs::new().into_service();

        let result = service.send_friend_request("p1", "p1").await;

        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("yourself"));
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_send_request_when_already_friends_is_noop() {
        let mut dbs = MockDbs::new();
        dbs.profile = dbs.profile.append_query_results([
            [create_test_profile("p1", "user1")],
            [create_test_profile("p2", "user2")],
        ]);
        dbs.friendship = dbs
            .friendship
            .append_query_results([[create_test_friendship("f1", "p1", "p2")]]);

        let service = dbs.into_service();
        let outcome = service.send_friend_request("p1", "p2").await.unwrap();

        assert!(matches!(outcome, FriendRequestOutcome::AlreadyFriends));
    }

    #[tokio::test]
    async fn test_send_request_twice_reports_existing() {
        let mut dbs = MockDbs::new();
        dbs.profile = dbs.profile.append_query_results([
            [create_test_profile("p1", "user1")],
            [create_test_profile("p2", "user2")],
        ]);
        // Not friends yet
        dbs.friendship = dbs
            .friendship
            .append_query_results([Vec::<friendship::Model>::new()]);
        // No reverse pending request, but a forward one exists
        dbs.friend_request = dbs
            .friend_request
            .append_query_results([Vec::<friend_request::Model>::new()])
            .append_query_results([[create_test_request(
                "fr1",
                "p1",
                "p2",
                FriendRequestStatus::Pending,
            )]]);

        let service = dbs.into_service();
        let outcome = service.send_friend_request("p1", "p2").await.unwrap();

        match outcome {
            FriendRequestOutcome::AlreadyRequested(existing) => assert_eq!(existing.id, "fr1"),
            _ => panic!("Expected AlreadyRequested outcome"),
        }
    }

    #[tokio::test]
    async fn test_send_request_merges_reverse_pending() {
        use sea_orm::MockExecResult;

        let mut dbs = MockDbs::new();
        dbs.profile = dbs.profile.append_query_results([
            [create_test_profile("p1", "user1")],
            [create_test_profile("p2", "user2")],
        ]);
        // Not friends yet
        dbs.friendship = dbs
            .friendship
            .append_query_results([Vec::<friendship::Model>::new()]);
        // p2 already sent p1 a pending request
        dbs.friend_request = dbs.friend_request.append_query_results([[
            create_test_request("fr_rev", "p2", "p1", FriendRequestStatus::Pending),
        ]]);
        // Transactional accept: friendship insert, then request update
        let mut accepted = create_test_request("fr_rev", "p2", "p1", FriendRequestStatus::Accepted);
        accepted.responded_at = Some(Utc::now().into());
        dbs.main = dbs
            .main
            .append_query_results([[create_test_friendship("f1", "p1", "p2")]])
            .append_query_results([[accepted]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ]);

        let service = dbs.into_service();
        let outcome = service.send_friend_request("p1", "p2").await.unwrap();

        match outcome {
            FriendRequestOutcome::AutoAccepted(request) => {
                assert_eq!(request.id, "fr_rev");
                assert_eq!(request.status, FriendRequestStatus::Accepted);
                assert!(request.responded_at.is_some());
            }
            _ => panic!("Expected AutoAccepted outcome"),
        }
    }

    #[tokio::test]
    async fn test_accept_by_non_recipient_is_forbidden() {
        let mut dbs = MockDbs::new();
        dbs.friend_request = dbs.friend_request.append_query_results([[
            create_test_request("fr1", "p1", "p2", FriendRequestStatus::Pending),
        ]]);

        let service = dbs.into_service();
        let result = service.accept_request("fr1", "p1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_accept_resolved_request_is_conflict() {
        let mut dbs = MockDbs::new();
        dbs.friend_request = dbs.friend_request.append_query_results([[
            create_test_request("fr1", "p1", "p2", FriendRequestStatus::Accepted),
        ]]);

        let service = dbs.into_service();
        let result = service.accept_request("fr1", "p2").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reject_resolved_request_is_conflict() {
        let mut dbs = MockDbs::new();
        dbs.friend_request = dbs.friend_request.append_query_results([[
            create_test_request("fr1", "p1", "p2", FriendRequestStatus::Rejected),
        ]]);

        let service = dbs.into_service();
        let result = service.reject_request("fr1", "p2").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let service = MockDbs::new().into_service();

        let result = service.follow("p1", "p1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_follow_when_already_following_is_noop() {
        let mut dbs = MockDbs::new();
        dbs.profile = dbs.profile.append_query_results([
            [create_test_profile("p1", "user1")],
            [create_test_profile("p2", "user2")],
        ]);
        dbs.following = dbs.following.append_query_results([[following::Model {
            id: "fo1".to_string(),
            follower_id: "p1".to_string(),
            followee_id: "p2".to_string(),
            created_at: Utc::now().into(),
        }]]);

        let service = dbs.into_service();
        let result = service.follow("p1", "p2").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_is_friend_is_symmetric() {
        let edge = create_test_friendship("f1", "p1", "p2");

        let mut dbs = MockDbs::new();
        dbs.friendship = dbs
            .friendship
            .append_query_results([[edge.clone()], [edge.clone()]]);

        let service = dbs.into_service();
        assert!(service.is_friend("p1", "p2").await.unwrap());
        assert!(service.is_friend("p2", "p1").await.unwrap());
    }
}
