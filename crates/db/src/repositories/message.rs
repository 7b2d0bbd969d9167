//! Message repository.
//!
//! Owns messages and their read receipts. Message order within a
//! conversation is `(created_at, id)` ascending; ULID ids break timestamp
//! ties in insertion order.

use std::sync::Arc;

use crate::entities::{Message, MessageRead, message, message_read};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use wooddesk_common::{AppError, AppResult};

/// Message repository for database operations.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new message.
    pub async fn create(&self, model: message::ActiveModel) -> AppResult<message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a message by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<message::Model>> {
        Message::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all messages of a conversation in delivery order.
    pub async fn find_by_conversation(
        &self,
        conversation_id: &str,
    ) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the newest message of a conversation.
    pub async fn find_latest_in_conversation(
        &self,
        conversation_id: &str,
    ) -> AppResult<Option<message::Model>> {
        Message::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a conversation's messages that a user has not read yet, in
    /// delivery order.
    pub async fn find_unread(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .filter(
                message::Column::Id.not_in_subquery(
                    Query::select()
                        .column(message_read::Column::MessageId)
                        .from(MessageRead)
                        .and_where(message_read::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a conversation's messages that a user has not read yet.
    pub async fn count_unread(&self, conversation_id: &str, user_id: &str) -> AppResult<u64> {
        Message::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .filter(
                message::Column::Id.not_in_subquery(
                    Query::select()
                        .column(message_read::Column::MessageId)
                        .from(MessageRead)
                        .and_where(message_read::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            )
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a user has read a message.
    pub async fn has_read(&self, message_id: &str, user_id: &str) -> AppResult<bool> {
        let row = MessageRead::find()
            .filter(message_read::Column::MessageId.eq(message_id))
            .filter(message_read::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(row.is_some())
    }

    /// Record a read receipt.
    pub async fn create_read(
        &self,
        model: message_read::ActiveModel,
    ) -> AppResult<message_read::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the user IDs that have read a message.
    pub async fn find_reader_ids(&self, message_id: &str) -> AppResult<Vec<String>> {
        let rows = MessageRead::find()
            .filter(message_read::Column::MessageId.eq(message_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }
}
