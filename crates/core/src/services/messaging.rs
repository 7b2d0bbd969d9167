//! Messaging service: conversations, messages and read receipts.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::sync::Arc;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::{Conversation, conversation, message, message_read},
    repositories::{ConversationRepository, MessageRepository, UserRepository},
};

/// Maximum characters of message content shown in a conversation preview.
const PREVIEW_MAX_CHARS: usize = 80;

/// Truncate message content for a conversation list preview.
#[must_use]
pub fn truncate_preview(content: &str) -> String {
    let mut chars = content.chars();
    let prefix: String = chars.by_ref().take(PREVIEW_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}…")
    } else {
        prefix
    }
}

/// Conversation summary for listing.
pub struct ConversationSummary {
    /// The conversation itself.
    pub conversation: conversation::Model,
    /// The newest message, if any.
    pub last_message: Option<message::Model>,
    /// Messages the listing user has not read yet.
    pub unread_count: u64,
}

/// Messaging service for business logic.
#[derive(Clone)]
pub struct MessagingService {
    db: Arc<DatabaseConnection>,
    conversation_repo: ConversationRepository,
    message_repo: MessageRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl MessagingService {
    /// Create a new messaging service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        conversation_repo: ConversationRepository,
        message_repo: MessageRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            db,
            conversation_repo,
            message_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start a conversation between two users, or return the existing one.
    ///
    /// Creation is atomic: the conversation row and both participant rows
    /// are inserted in one transaction.
    pub async fn start_conversation(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> AppResult<conversation::Model> {
        if user_a == user_b {
            return Err(AppError::BadRequest(
                "Cannot start a conversation with yourself".to_string(),
            ));
        }

        self.user_repo.get_by_id(user_a).await?;
        self.user_repo.get_by_id(user_b).await?;

        if let Some(existing) = self
            .conversation_repo
            .find_by_participant_pair(user_a, user_b)
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now().into();
        let model = conversation::ActiveModel {
            id: Set(self.id_gen.generate()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let participants = vec![
            (self.id_gen.generate(), user_a.to_string()),
            (self.id_gen.generate(), user_b.to_string()),
        ];

        let created = self
            .conversation_repo
            .create_with_participants(model, &participants)
            .await?;

        tracing::debug!(conversation_id = %created.id, "Created conversation");
        Ok(created)
    }

    /// Append a message to a conversation.
    ///
    /// The message row, the sender's read receipt and the conversation's
    /// `updated_at` bump are written in one transaction.
    pub async fn post_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
    ) -> AppResult<message::Model> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Message content must not be empty".to_string(),
            ));
        }

        self.conversation_repo.get_by_id(conversation_id).await?;

        if !self
            .conversation_repo
            .is_participant(conversation_id, sender_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Only participants can post to a conversation".to_string(),
            ));
        }

        let now = Utc::now().into();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            conversation_id: Set(conversation_id.to_string()),
            sender_id: Set(sender_id.to_string()),
            content: Set(trimmed.to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        // The sender has read their own message by definition
        message_read::ActiveModel {
            id: Set(self.id_gen.generate()),
            message_id: Set(created.id.clone()),
            user_id: Set(sender_id.to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Conversation::update_many()
            .col_expr(conversation::Column::UpdatedAt, Expr::value(created.created_at))
            .filter(conversation::Column::Id.eq(conversation_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            message_id = %created.id,
            conversation_id = %conversation_id,
            "Posted message"
        );

        Ok(created)
    }

    /// Mark every message of a conversation as read by a user. Returns the
    /// number of newly-marked messages; calling again returns 0.
    pub async fn mark_read(&self, conversation_id: &str, user_id: &str) -> AppResult<u64> {
        self.conversation_repo.get_by_id(conversation_id).await?;

        if !self
            .conversation_repo
            .is_participant(conversation_id, user_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Only participants can mark a conversation read".to_string(),
            ));
        }

        let unread = self
            .message_repo
            .find_unread(conversation_id, user_id)
            .await?;

        let mut marked = 0;
        for message in unread {
            let receipt = message_read::ActiveModel {
                id: Set(self.id_gen.generate()),
                message_id: Set(message.id),
                user_id: Set(user_id.to_string()),
                created_at: Set(Utc::now().into()),
            };
            self.message_repo.create_read(receipt).await?;
            marked += 1;
        }

        Ok(marked)
    }

    /// Count a conversation's messages a user has not read. An absent user
    /// has no unread messages.
    pub async fn unread_count(
        &self,
        conversation_id: &str,
        user_id: Option<&str>,
    ) -> AppResult<u64> {
        match user_id {
            Some(user_id) => {
                self.message_repo
                    .count_unread(conversation_id, user_id)
                    .await
            }
            None => Ok(0),
        }
    }

    /// Get a conversation's messages in delivery order. Participants only.
    pub async fn get_messages(
        &self,
        conversation_id: &str,
        requester_id: &str,
    ) -> AppResult<Vec<message::Model>> {
        self.conversation_repo.get_by_id(conversation_id).await?;

        if !self
            .conversation_repo
            .is_participant(conversation_id, requester_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Only participants can read a conversation".to_string(),
            ));
        }

        self.message_repo.find_by_conversation(conversation_id).await
    }

    /// Delete a conversation and all of its messages. Participants only.
    pub async fn delete_conversation(
        &self,
        conversation_id: &str,
        requester_id: &str,
    ) -> AppResult<()> {
        self.conversation_repo.get_by_id(conversation_id).await?;

        if !self
            .conversation_repo
            .is_participant(conversation_id, requester_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Only participants can delete a conversation".to_string(),
            ));
        }

        self.conversation_repo.delete(conversation_id).await?;
        tracing::debug!(conversation_id = %conversation_id, "Deleted conversation");
        Ok(())
    }

    /// Preview of the newest message: content truncated to 80 characters
    /// with an ellipsis, or an empty string when there are no messages.
    pub async fn last_message_preview(&self, conversation_id: &str) -> AppResult<String> {
        let latest = self
            .message_repo
            .find_latest_in_conversation(conversation_id)
            .await?;

        Ok(latest
            .map(|m| truncate_preview(&m.content))
            .unwrap_or_default())
    }

    /// Get a user's conversations with unread counts, most recently active
    /// first.
    pub async fn get_conversations(&self, user_id: &str) -> AppResult<Vec<ConversationSummary>> {
        let conversations = self.conversation_repo.find_for_user(user_id).await?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let last_message = self
                .message_repo
                .find_latest_in_conversation(&conversation.id)
                .await?;
            let unread_count = self
                .message_repo
                .count_unread(&conversation.id, user_id)
                .await?;

            summaries.push(ConversationSummary {
                conversation,
                last_message,
                unread_count,
            });
        }

        Ok(summaries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use wooddesk_db::entities::conversation_participant;

    fn create_test_conversation(id: &str) -> conversation::Model {
        let now = Utc::now().into();
        conversation::Model {
            id: id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn create_test_message(id: &str, conversation_id: &str, content: &str) -> message::Model {
        message::Model {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: "user1".to_string(),
            content: content.to_string(),
            created_at: Utc::now().into(),
        }
    }

    struct MockDbs {
        main: MockDatabase,
        conversation: MockDatabase,
        message: MockDatabase,
        user: MockDatabase,
    }

    impl MockDbs {
        fn new() -> Self {
            Self {
                main: MockDatabase::new(DatabaseBackend::Postgres),
                conversation: MockDatabase::new(DatabaseBackend::Postgres),
                message: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn into_service(self) -> MessagingService {
            MessagingService::new(
                Arc::new(self.main.into_connection()),
                ConversationRepository::new(Arc::new(self.conversation.into_connection())),
                MessageRepository::new(Arc::new(self.message.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
            )
        }
    }

    #[test]
    fn test_truncate_preview_under_limit() {
        assert_eq!(truncate_preview("hello"), "hello");
    }

    #[test]
    fn test_truncate_preview_at_boundary() {
        let exactly_80 = "a".repeat(80);
        assert_eq!(truncate_preview(&exactly_80), exactly_80);
    }

    #[test]
    fn test_truncate_preview_over_limit() {
        let long = "a".repeat(81);
        let preview = truncate_preview(&long);
        assert_eq!(preview.chars().count(), 81);
        assert!(preview.ends_with('…'));
        assert!(preview.starts_with(&"a".repeat(80)));
    }

    #[test]
    fn test_truncate_preview_empty() {
        assert_eq!(truncate_preview(""), "");
    }

    #[tokio::test]
    async fn test_start_conversation_with_yourself_returns_error() {
        let service = MockDbs::new().into_service();

        let result = service.start_conversation("user1", "user1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_post_message_rejects_blank_content() {
        let service = MockDbs::new().into_service();

        let result = service.post_message("conv1", "user1", "   \n\t ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_post_message_rejects_non_participant() {
        let mut dbs = MockDbs::new();
        dbs.conversation = dbs
            .conversation
            .append_query_results([[create_test_conversation("conv1")]])
            .append_query_results([Vec::<conversation_participant::Model>::new()]);

        let service = dbs.into_service();
        let result = service.post_message("conv1", "outsider", "hello").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_post_message_trims_and_bumps_conversation() {
        use sea_orm::MockExecResult;
        use wooddesk_db::entities::message_read;

        let participant = conversation_participant::Model {
            id: "cp1".to_string(),
            conversation_id: "conv1".to_string(),
            user_id: "user1".to_string(),
            created_at: Utc::now().into(),
        };
        let receipt = message_read::Model {
            id: "mr1".to_string(),
            message_id: "m1".to_string(),
            user_id: "user1".to_string(),
            created_at: Utc::now().into(),
        };

        let mut dbs = MockDbs::new();
        dbs.conversation = dbs
            .conversation
            .append_query_results([[create_test_conversation("conv1")]])
            .append_query_results([[participant]]);
        // Transaction: message insert, sender receipt insert, updated_at bump
        dbs.main = dbs
            .main
            .append_query_results([[create_test_message("m1", "conv1", "hello")]])
            .append_query_results([[receipt]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
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
        let message = service
            .post_message("conv1", "user1", "  hello  ")
            .await
            .unwrap();

        assert_eq!(message.content, "hello");
        assert_eq!(message.conversation_id, "conv1");
    }

    #[tokio::test]
    async fn test_unread_count_for_absent_user_is_zero() {
        let service = MockDbs::new().into_service();

        let count = service.unread_count("conv1", None).await.unwrap();

        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_last_message_preview_without_messages_is_empty() {
        let mut dbs = MockDbs::new();
        dbs.message = dbs
            .message
            .append_query_results([Vec::<message::Model>::new()]);

        let service = dbs.into_service();
        let preview = service.last_message_preview("conv1").await.unwrap();

        assert_eq!(preview, "");
    }

    #[tokio::test]
    async fn test_last_message_preview_truncates_long_content() {
        let long = "b".repeat(120);
        let mut dbs = MockDbs::new();
        dbs.message = dbs
            .message
            .append_query_results([[create_test_message("m1", "conv1", &long)]]);

        let service = dbs.into_service();
        let preview = service.last_message_preview("conv1").await.unwrap();

        assert_eq!(preview.chars().count(), 81);
        assert!(preview.ends_with('…'));
    }

    #[tokio::test]
    async fn test_delete_conversation_rejects_non_participant() {
        let mut dbs = MockDbs::new();
        dbs.conversation = dbs
            .conversation
            .append_query_results([[create_test_conversation("conv1")]])
            .append_query_results([Vec::<conversation_participant::Model>::new()]);

        let service = dbs.into_service();
        let result = service.delete_conversation("conv1", "outsider").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
