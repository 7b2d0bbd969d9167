//! Conversation repository.

use std::sync::Arc;

use crate::entities::{
    Conversation, ConversationParticipant, conversation, conversation_participant,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use wooddesk_common::{AppError, AppResult};

/// Conversation repository for database operations.
///
/// Also owns the participant join table; a conversation and its membership
/// always change together.
#[derive(Clone)]
pub struct ConversationRepository {
    db: Arc<DatabaseConnection>,
}

impl ConversationRepository {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a conversation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<conversation::Model>> {
        Conversation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a conversation by ID, failing when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<conversation::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Conversation not found: {id}")))
    }

    /// Delete a conversation (participants and messages cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Conversation::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get the participant rows of a conversation.
    pub async fn find_participants(
        &self,
        conversation_id: &str,
    ) -> AppResult<Vec<conversation_participant::Model>> {
        ConversationParticipant::find()
            .filter(conversation_participant::Column::ConversationId.eq(conversation_id))
            .order_by_asc(conversation_participant::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a user belongs to a conversation.
    pub async fn is_participant(&self, conversation_id: &str, user_id: &str) -> AppResult<bool> {
        let row = ConversationParticipant::find()
            .filter(conversation_participant::Column::ConversationId.eq(conversation_id))
            .filter(conversation_participant::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(row.is_some())
    }

    /// Find the conversation shared by two users, if one exists.
    pub async fn find_by_participant_pair(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> AppResult<Option<conversation::Model>> {
        let memberships = ConversationParticipant::find()
            .filter(conversation_participant::Column::UserId.eq(user_a))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if memberships.is_empty() {
            return Ok(None);
        }

        let conversation_ids: Vec<String> =
            memberships.into_iter().map(|m| m.conversation_id).collect();

        let shared = ConversationParticipant::find()
            .filter(conversation_participant::Column::UserId.eq(user_b))
            .filter(conversation_participant::Column::ConversationId.is_in(conversation_ids))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match shared {
            Some(membership) => self.find_by_id(&membership.conversation_id).await,
            None => Ok(None),
        }
    }

    /// Get a user's conversations, most recently active first.
    pub async fn find_for_user(&self, user_id: &str) -> AppResult<Vec<conversation::Model>> {
        let memberships = ConversationParticipant::find()
            .filter(conversation_participant::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let conversation_ids: Vec<String> =
            memberships.into_iter().map(|m| m.conversation_id).collect();

        Conversation::find()
            .filter(conversation::Column::Id.is_in(conversation_ids))
            .order_by_desc(conversation::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a conversation together with its participants in one
    /// transaction so a half-created conversation is never observable.
    pub async fn create_with_participants(
        &self,
        conversation: conversation::ActiveModel,
        participant_ids: &[(String, String)],
    ) -> AppResult<conversation::Model> {
        use sea_orm::TransactionTrait;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = conversation
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let now = created.created_at;
        for (row_id, user_id) in participant_ids {
            let member = conversation_participant::ActiveModel {
                id: Set(row_id.clone()),
                conversation_id: Set(created.id.clone()),
                user_id: Set(user_id.clone()),
                created_at: Set(now),
            };
            member
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_conversation(id: &str) -> conversation::Model {
        let now = Utc::now().into();
        conversation::Model {
            id: id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn create_test_participant(
        id: &str,
        conversation_id: &str,
        user_id: &str,
    ) -> conversation_participant::Model {
        conversation_participant::Model {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_participant() {
        let member = create_test_participant("cp1", "conv1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[member.clone()]])
                .into_connection(),
        );

        let repo = ConversationRepository::new(db);
        assert!(repo.is_participant("conv1", "user1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_participant_pair_without_shared_conversation() {
        let member = create_test_participant("cp1", "conv1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![member]])
                .append_query_results([Vec::<conversation_participant::Model>::new()])
                .into_connection(),
        );

        let repo = ConversationRepository::new(db);
        let result = repo
            .find_by_participant_pair("user1", "user2")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_by_participant_pair_returns_shared_conversation() {
        let member_a = create_test_participant("cp1", "conv1", "user1");
        let member_b = create_test_participant("cp2", "conv1", "user2");
        let conv = create_test_conversation("conv1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![member_a]])
                .append_query_results([vec![member_b]])
                .append_query_results([vec![conv]])
                .into_connection(),
        );

        let repo = ConversationRepository::new(db);
        let result = repo
            .find_by_participant_pair("user1", "user2")
            .await
            .unwrap();

        assert_eq!(result.unwrap().id, "conv1");
    }
}
