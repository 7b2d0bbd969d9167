//! Post feed service: posts, subject tags, likes, saves and relevance.

use chrono::Utc;
use sea_orm::Set;
use std::collections::BTreeSet;
use validator::Validate;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::{post, post_like, post_save, post_subject, subject},
    repositories::{
        PostLikeRepository, PostRepository, PostSaveRepository, SubjectRepository, UserRepository,
    },
};

/// Default weight of a like in the relevance score.
pub const DEFAULT_LIKES_WEIGHT: f64 = 1.0;

/// Default weight of a save in the relevance score.
pub const DEFAULT_SAVES_WEIGHT: f64 = 1.5;

/// Linear relevance score over current like/save counts. Uncached; callers
/// recompute on demand.
#[must_use]
pub fn relevance_score(likes: u64, saves: u64, likes_weight: f64, saves_weight: f64) -> f64 {
    likes as f64 * likes_weight + saves as f64 * saves_weight
}

/// Derive a URL-safe slug from a subject name.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;

    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Input for creating a post.
#[derive(Debug, Clone, Validate)]
pub struct CreatePostInput {
    /// Caption text (max 1000 chars).
    #[validate(length(max = 1000))]
    pub caption: String,
    /// Optional image URL.
    pub image_url: Option<String>,
    /// Visibility flag.
    pub is_public: bool,
    /// Subject names to tag the post with (created on demand).
    pub subjects: Vec<String>,
}

/// Input for updating a post. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePostInput {
    /// New caption text.
    #[validate(length(max = 1000))]
    pub caption: Option<String>,
    /// New image URL.
    pub image_url: Option<String>,
    /// New visibility flag.
    pub is_public: Option<bool>,
    /// Replacement subject names.
    pub subjects: Option<Vec<String>>,
}

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    like_repo: PostLikeRepository,
    save_repo: PostSaveRepository,
    subject_repo: SubjectRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        like_repo: PostLikeRepository,
        save_repo: PostSaveRepository,
        subject_repo: SubjectRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            post_repo,
            like_repo,
            save_repo,
            subject_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a subject by name, creating it when absent.
    pub async fn get_or_create_subject(&self, name: &str) -> AppResult<subject::Model> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Subject name must not be empty".to_string(),
            ));
        }

        if let Some(existing) = self.subject_repo.find_by_name(trimmed).await? {
            return Ok(existing);
        }

        let slug = slugify(trimmed);
        if let Some(existing) = self.subject_repo.find_by_slug(&slug).await? {
            return Ok(existing);
        }

        let model = subject::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(trimmed.to_string()),
            slug: Set(slug),
            created_at: Set(Utc::now().into()),
        };

        self.subject_repo.create(model).await
    }

    /// Create a post, tagging it with the given subjects.
    pub async fn create_post(
        &self,
        user_id: &str,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        self.user_repo.get_by_id(user_id).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            image_url: Set(input.image_url),
            caption: Set(input.caption),
            is_public: Set(input.is_public),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.post_repo.create(model).await?;
        self.tag_subjects(&created.id, &input.subjects).await?;

        tracing::debug!(post_id = %created.id, user_id = %user_id, "Created post");
        Ok(created)
    }

    /// Update a post. Only the owner may update.
    pub async fn update_post(
        &self,
        post_id: &str,
        user_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;

        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can update a post".to_string(),
            ));
        }

        let mut active: post::ActiveModel = post.into();
        if let Some(caption) = input.caption {
            active.caption = Set(caption);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(is_public) = input.is_public {
            active.is_public = Set(is_public);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;

        if let Some(subjects) = input.subjects {
            self.post_repo.clear_subjects(post_id).await?;
            self.tag_subjects(post_id, &subjects).await?;
        }

        Ok(updated)
    }

    /// Delete a post. Only the owner may delete.
    pub async fn delete_post(&self, post_id: &str, user_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete a post".to_string(),
            ));
        }

        self.post_repo.delete(post_id).await?;
        tracing::debug!(post_id = %post_id, "Deleted post");
        Ok(())
    }

    /// Resolve subject names to rows and tag the post with each, once.
    async fn tag_subjects(&self, post_id: &str, names: &[String]) -> AppResult<()> {
        let unique: BTreeSet<&str> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();

        for name in unique {
            let subject = self.get_or_create_subject(name).await?;
            let tag = post_subject::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                subject_id: Set(subject.id),
            };
            self.post_repo.add_subject(tag).await?;
        }

        Ok(())
    }

    /// Toggle a user's like on a post. Returns the new membership state.
    /// An absent (anonymous) user is a no-op reported as `false`.
    pub async fn toggle_like(&self, post_id: &str, user_id: Option<&str>) -> AppResult<bool> {
        let Some(user_id) = user_id else {
            return Ok(false);
        };

        self.post_repo.get_by_id(post_id).await?;

        if self.like_repo.has_liked(user_id, post_id).await? {
            self.like_repo
                .delete_by_user_and_post(user_id, post_id)
                .await?;
            return Ok(false);
        }

        let model = post_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };
        self.like_repo.create(model).await?;
        Ok(true)
    }

    /// Toggle a user's save on a post. Returns the new membership state.
    /// An absent (anonymous) user is a no-op reported as `false`.
    pub async fn toggle_save(&self, post_id: &str, user_id: Option<&str>) -> AppResult<bool> {
        let Some(user_id) = user_id else {
            return Ok(false);
        };

        self.post_repo.get_by_id(post_id).await?;

        if self.save_repo.has_saved(user_id, post_id).await? {
            self.save_repo
                .delete_by_user_and_post(user_id, post_id)
                .await?;
            return Ok(false);
        }

        let model = post_save::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };
        self.save_repo.create(model).await?;
        Ok(true)
    }

    /// Whether a user has liked a post; `false` for an absent user.
    pub async fn is_liked(&self, post_id: &str, user_id: Option<&str>) -> AppResult<bool> {
        match user_id {
            Some(user_id) => self.like_repo.has_liked(user_id, post_id).await,
            None => Ok(false),
        }
    }

    /// Whether a user has saved a post; `false` for an absent user.
    pub async fn is_saved(&self, post_id: &str, user_id: Option<&str>) -> AppResult<bool> {
        match user_id {
            Some(user_id) => self.save_repo.has_saved(user_id, post_id).await,
            None => Ok(false),
        }
    }

    /// Compute a post's relevance score from its current like/save counts
    /// with the default weights.
    pub async fn score(&self, post_id: &str) -> AppResult<f64> {
        let likes = self.like_repo.count_for_post(post_id).await?;
        let saves = self.save_repo.count_for_post(post_id).await?;
        Ok(relevance_score(
            likes,
            saves,
            DEFAULT_LIKES_WEIGHT,
            DEFAULT_SAVES_WEIGHT,
        ))
    }

    /// Get the public feed, newest first (paginated).
    pub async fn get_public_feed(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_public(limit, until_id).await
    }

    /// Get a user's posts. The owner sees private posts too; everyone else
    /// sees only public ones.
    pub async fn get_user_posts(
        &self,
        target_user_id: &str,
        requester_id: Option<&str>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        if requester_id == Some(target_user_id) {
            self.post_repo
                .find_by_user(target_user_id, limit, until_id)
                .await
        } else {
            self.post_repo
                .find_public_by_user(target_user_id, limit, until_id)
                .await
        }
    }

    /// Get public posts tagged with a subject, newest first (paginated).
    pub async fn get_posts_by_subject(
        &self,
        subject_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .find_public_by_subject(subject_id, limit, until_id)
            .await
    }

    /// Get a single post.
    pub async fn get_post(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            image_url: None,
            caption: "binomial theorem summary".to_string(),
            is_public: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    struct MockDbs {
        post: MockDatabase,
        like: MockDatabase,
        save: MockDatabase,
        subject: MockDatabase,
        user: MockDatabase,
    }

    impl MockDbs {
        fn new() -> Self {
            Self {
                post: MockDatabase::new(DatabaseBackend::Postgres),
                like: MockDatabase::new(DatabaseBackend::Postgres),
                save: MockDatabase::new(DatabaseBackend::Postgres),
                subject: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn into_service(self) -> FeedService {
            FeedService::new(
                PostRepository::new(Arc::new(self.post.into_connection())),
                PostLikeRepository::new(Arc::new(self.like.into_connection())),
                PostSaveRepository::new(Arc::new(self.save.into_connection())),
                SubjectRepository::new(Arc::new(self.subject.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
            )
        }
    }

    #[test]
    fn test_relevance_score_default_weights() {
        assert_eq!(relevance_score(0, 0, 1.0, 1.5), 0.0);
        assert_eq!(relevance_score(4, 2, 1.0, 1.5), 7.0);
    }

    #[test]
    fn test_relevance_score_is_monotonic() {
        let base = relevance_score(3, 1, 1.0, 1.5);
        assert!(relevance_score(4, 1, 1.0, 1.5) > base);
        assert!(relevance_score(3, 2, 1.0, 1.5) > base);
        // Removing the added like returns to the prior value
        assert_eq!(relevance_score(3, 1, 1.0, 1.5), base);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Linear Algebra"), "linear-algebra");
        assert_eq!(slugify("  C++ (advanced)  "), "c-advanced");
        assert_eq!(slugify("Física II"), "física-ii");
    }

    #[tokio::test]
    async fn test_toggle_like_for_anonymous_user_is_noop() {
        let service = MockDbs::new().into_service();

        let liked = service.toggle_like("post1", None).await.unwrap();

        assert!(!liked);
    }

    #[tokio::test]
    async fn test_toggle_save_for_anonymous_user_is_noop() {
        let service = MockDbs::new().into_service();

        let saved = service.toggle_save("post1", None).await.unwrap();

        assert!(!saved);
    }

    #[tokio::test]
    async fn test_update_post_rejects_non_owner() {
        let mut dbs = MockDbs::new();
        dbs.post = dbs
            .post
            .append_query_results([[create_test_post("post1", "owner")]]);

        let service = dbs.into_service();
        let result = service
            .update_post("post1", "intruder", UpdatePostInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_post_rejects_non_owner() {
        let mut dbs = MockDbs::new();
        dbs.post = dbs
            .post
            .append_query_results([[create_test_post("post1", "owner")]]);

        let service = dbs.into_service();
        let result = service.delete_post("post1", "intruder").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_post_rejects_oversized_caption() {
        let service = MockDbs::new().into_service();

        let result = service
            .create_post(
                "user1",
                CreatePostInput {
                    caption: "x".repeat(1001),
                    image_url: None,
                    is_public: true,
                    subjects: Vec::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_or_create_subject_rejects_blank_name() {
        let service = MockDbs::new().into_service();

        let result = service.get_or_create_subject("   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_is_liked_for_anonymous_user_is_false() {
        let service = MockDbs::new().into_service();

        assert!(!service.is_liked("post1", None).await.unwrap());
    }
}
