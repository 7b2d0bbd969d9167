//! Notification service.

use chrono::Utc;
use sea_orm::Set;
use validator::Validate;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::notification::{self, NotificationPriority, NotificationType, TargetKind},
    repositories::NotificationRepository,
};

/// Reference to the entity a notification points at.
#[derive(Debug, Clone)]
pub struct NotificationTarget {
    /// Kind of the related entity.
    pub kind: TargetKind,
    /// ID of the related entity.
    pub id: String,
}

/// Input for creating a notification.
#[derive(Debug, Clone, Validate)]
pub struct CreateNotificationInput {
    /// Recipient user ID.
    pub user_id: String,
    /// Notification type.
    pub notification_type: NotificationType,
    /// Short title shown in the inbox.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Full message body.
    #[validate(length(min = 1))]
    pub message: String,
    /// Optional link to open when activated.
    pub link: Option<String>,
    /// Priority level.
    pub priority: NotificationPriority,
    /// Optional related entity.
    pub target: Option<NotificationTarget>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a notification.
    pub async fn create(
        &self,
        input: CreateNotificationInput,
    ) -> AppResult<notification::Model> {
        input.validate()?;

        if let Some(ref link) = input.link {
            url::Url::parse(link)
                .map_err(|_| AppError::Validation(format!("Invalid link URL: {link}")))?;
        }

        let (target_kind, target_id) = match input.target {
            Some(target) => (Some(target.kind), Some(target.id)),
            None => (None, None),
        };

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(input.user_id),
            notification_type: Set(input.notification_type),
            title: Set(input.title),
            message: Set(input.message),
            link: Set(input.link),
            priority: Set(input.priority),
            target_kind: Set(target_kind),
            target_id: Set(target_id),
            is_read: Set(false),
            is_dismissed: Set(false),
            created_at: Set(Utc::now().into()),
            read_at: Set(None),
        };

        let notification = self.notification_repo.create(model).await?;
        tracing::debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            "Created notification"
        );
        Ok(notification)
    }

    /// Create a friend-request-received notification.
    pub async fn notify_friend_request(
        &self,
        user_id: &str,
        request_id: &str,
        from_username: &str,
    ) -> AppResult<notification::Model> {
        self.create(CreateNotificationInput {
            user_id: user_id.to_string(),
            notification_type: NotificationType::FriendRequest,
            title: "New friend request".to_string(),
            message: format!("{from_username} sent you a friend request"),
            link: None,
            priority: NotificationPriority::Medium,
            target: Some(NotificationTarget {
                kind: TargetKind::FriendRequest,
                id: request_id.to_string(),
            }),
        })
        .await
    }

    /// Create a friend-request-accepted notification.
    pub async fn notify_friend_request_accepted(
        &self,
        user_id: &str,
        request_id: &str,
        by_username: &str,
    ) -> AppResult<notification::Model> {
        self.create(CreateNotificationInput {
            user_id: user_id.to_string(),
            notification_type: NotificationType::FriendRequest,
            title: "Friend request accepted".to_string(),
            message: format!("{by_username} accepted your friend request"),
            link: None,
            priority: NotificationPriority::Medium,
            target: Some(NotificationTarget {
                kind: TargetKind::FriendRequest,
                id: request_id.to_string(),
            }),
        })
        .await
    }

    /// Create a study-milestone notification.
    pub async fn notify_study_milestone(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
    ) -> AppResult<notification::Model> {
        self.create(CreateNotificationInput {
            user_id: user_id.to_string(),
            notification_type: NotificationType::StudyMilestone,
            title: "Study milestone".to_string(),
            message: message.to_string(),
            link: None,
            priority: NotificationPriority::Low,
            target: Some(NotificationTarget {
                kind: TargetKind::StudySession,
                id: session_id.to_string(),
            }),
        })
        .await
    }

    /// Get notifications for a user, newest first (paginated).
    pub async fn get_notifications(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
        include_dismissed: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, limit, until_id, unread_only, include_dismissed)
            .await
    }

    /// Mark a notification as read, stamping `read_at`.
    ///
    /// Returns `false` when the notification was already read (no write
    /// happens in that case).
    pub async fn mark_read(&self, notification_id: &str, user_id: &str) -> AppResult<bool> {
        let notification = self.notification_repo.get_by_id(notification_id).await?;

        if notification.user_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot read another user's notification".to_string(),
            ));
        }

        if notification.is_read {
            return Ok(false);
        }

        self.notification_repo
            .mark_as_read(notification_id, Utc::now().into())
            .await?;
        Ok(true)
    }

    /// Dismiss a notification, independent of its read state.
    pub async fn dismiss(&self, notification_id: &str, user_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.get_by_id(notification_id).await?;

        if notification.user_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot dismiss another user's notification".to_string(),
            ));
        }

        self.notification_repo.dismiss(notification_id).await
    }

    /// Mark all of a user's unread notifications as read. Returns the
    /// number of rows updated. Individual `read_at` timestamps are not
    /// touched by the bulk update.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        let marked = self.notification_repo.mark_all_as_read(user_id).await?;
        tracing::debug!(user_id = %user_id, marked = marked, "Marked all notifications read");
        Ok(marked)
    }

    /// Whether a notification is less than 24 hours old.
    #[must_use]
    pub fn is_recent(&self, notification: &notification::Model) -> bool {
        notification.is_recent_at(Utc::now().into())
    }

    /// Count unread, undismissed notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Delete a notification.
    pub async fn delete(&self, notification_id: &str, user_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.get_by_id(notification_id).await?;

        if notification.user_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot delete another user's notification".to_string(),
            ));
        }

        self.notification_repo.delete(notification_id).await
    }

    /// Delete all notifications for a user.
    pub async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.delete_all_for_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_notification(id: &str, user_id: &str, is_read: bool) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            notification_type: NotificationType::General,
            title: "Welcome".to_string(),
            message: "Your desk is ready".to_string(),
            link: None,
            priority: NotificationPriority::Medium,
            target_kind: None,
            target_id: None,
            is_read,
            is_dismissed: false,
            created_at: Utc::now().into(),
            read_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> NotificationService {
        NotificationService::new(NotificationRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .create(CreateNotificationInput {
                user_id: "user1".to_string(),
                notification_type: NotificationType::General,
                title: String::new(),
                message: "body".to_string(),
                link: None,
                priority: NotificationPriority::Low,
                target: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_link() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service
            .create(CreateNotificationInput {
                user_id: "user1".to_string(),
                notification_type: NotificationType::General,
                title: "Ping".to_string(),
                message: "body".to_string(),
                link: Some("not a url".to_string()),
                priority: NotificationPriority::Low,
                target: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_mark_read_rejects_foreign_notification() {
        let n = create_test_notification("n1", "owner", false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[n]])
            .into_connection();
        let service = service_with(db);

        let result = service.mark_read("n1", "intruder").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_read_is_noop_when_already_read() {
        let n = create_test_notification("n1", "user1", true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[n]])
            .into_connection();
        let service = service_with(db);

        let newly_marked = service.mark_read("n1", "user1").await.unwrap();

        assert!(!newly_marked);
    }

    #[test]
    fn test_is_recent_boundary() {
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

        let mut fresh = create_test_notification("n1", "user1", false);
        fresh.created_at = now - chrono::Duration::hours(23);
        assert!(fresh.is_recent_at(now));

        let mut stale = create_test_notification("n2", "user1", false);
        stale.created_at = now - chrono::Duration::hours(25);
        assert!(!stale.is_recent_at(now));
    }
}
