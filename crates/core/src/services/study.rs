//! Study tracking service: sessions and pomodoro settings.

use chrono::Utc;
use sea_orm::Set;
use validator::Validate;
use wooddesk_common::{AppError, AppResult, IdGenerator};
use wooddesk_db::{
    entities::{pomodoro_settings, study_session},
    repositories::{
        PomodoroSettingsRepository, StudySessionRepository, SubjectRepository, UserRepository,
    },
};

/// Elapsed seconds between session start and end.
#[must_use]
pub fn session_duration_seconds(
    start: chrono::DateTime<chrono::FixedOffset>,
    end: chrono::DateTime<chrono::FixedOffset>,
) -> i64 {
    end.signed_duration_since(start).num_seconds()
}

/// Input for updating pomodoro settings. `None` fields are left untouched.
/// All durations are minutes.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePomodoroSettingsInput {
    /// Work period length (1–120).
    #[validate(range(min = 1, max = 120))]
    pub work_duration: Option<i32>,
    /// Short break length (1–30).
    #[validate(range(min = 1, max = 30))]
    pub break_duration: Option<i32>,
    /// Long break length (1–60).
    #[validate(range(min = 1, max = 60))]
    pub long_break_duration: Option<i32>,
    /// Work periods between long breaks (1–10).
    #[validate(range(min = 1, max = 10))]
    pub sessions_until_long_break: Option<i32>,
}

/// Study service for business logic.
#[derive(Clone)]
pub struct StudyService {
    session_repo: StudySessionRepository,
    subject_repo: SubjectRepository,
    pomodoro_repo: PomodoroSettingsRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl StudyService {
    /// Create a new study service.
    #[must_use]
    pub const fn new(
        session_repo: StudySessionRepository,
        subject_repo: SubjectRepository,
        pomodoro_repo: PomodoroSettingsRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            session_repo,
            subject_repo,
            pomodoro_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start a study session now, optionally against a subject.
    ///
    /// Nothing prevents a user from holding several active sessions at
    /// once; ending them is the caller's concern.
    pub async fn start_session(
        &self,
        user_id: &str,
        subject_id: Option<&str>,
        notes: Option<String>,
    ) -> AppResult<study_session::Model> {
        self.user_repo.get_by_id(user_id).await?;

        if let Some(subject_id) = subject_id {
            self.subject_repo.get_by_id(subject_id).await?;
        }

        let model = study_session::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            subject_id: Set(subject_id.map(std::string::ToString::to_string)),
            start_time: Set(Utc::now().into()),
            end_time: Set(None),
            duration_seconds: Set(None),
            notes: Set(notes.unwrap_or_default()),
        };

        let session = self.session_repo.create(model).await?;
        tracing::debug!(session_id = %session.id, user_id = %user_id, "Started study session");
        Ok(session)
    }

    /// End a study session. Ending an already-ended session is a no-op
    /// that returns the session unchanged.
    ///
    /// `end_time` and the derived duration are persisted together, so the
    /// duration is never observed stale relative to the end time.
    pub async fn end_session(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<study_session::Model> {
        let session = self.session_repo.get_by_id(session_id).await?;

        if session.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can end a study session".to_string(),
            ));
        }

        if !session.is_active() {
            return Ok(session);
        }

        let end_time: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let duration = session_duration_seconds(session.start_time, end_time);

        let mut active: study_session::ActiveModel = session.into();
        active.end_time = Set(Some(end_time));
        active.duration_seconds = Set(Some(duration));

        let ended = self.session_repo.update(active).await?;
        tracing::debug!(
            session_id = %ended.id,
            duration_seconds = duration,
            "Ended study session"
        );
        Ok(ended)
    }

    /// Get a user's sessions, newest start first (paginated).
    pub async fn get_sessions(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<study_session::Model>> {
        self.session_repo.find_by_user(user_id, limit, until_id).await
    }

    /// Get a user's active sessions.
    pub async fn get_active_sessions(&self, user_id: &str) -> AppResult<Vec<study_session::Model>> {
        self.session_repo.find_active_by_user(user_id).await
    }

    /// Get a user's pomodoro settings, provisioning defaults when absent.
    pub async fn get_pomodoro_settings(
        &self,
        user_id: &str,
    ) -> AppResult<pomodoro_settings::Model> {
        if let Some(settings) = self.pomodoro_repo.find_by_user(user_id).await? {
            return Ok(settings);
        }

        self.user_repo.get_by_id(user_id).await?;

        let model = pomodoro_settings::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            work_duration: Set(25),
            break_duration: Set(5),
            long_break_duration: Set(15),
            sessions_until_long_break: Set(4),
        };

        self.pomodoro_repo.create(model).await
    }

    /// Update a user's pomodoro settings. Out-of-range values are rejected
    /// before any write.
    pub async fn update_pomodoro_settings(
        &self,
        user_id: &str,
        input: UpdatePomodoroSettingsInput,
    ) -> AppResult<pomodoro_settings::Model> {
        input.validate()?;

        let settings = self.get_pomodoro_settings(user_id).await?;
        let mut active: pomodoro_settings::ActiveModel = settings.into();

        if let Some(work_duration) = input.work_duration {
            active.work_duration = Set(work_duration);
        }
        if let Some(break_duration) = input.break_duration {
            active.break_duration = Set(break_duration);
        }
        if let Some(long_break_duration) = input.long_break_duration {
            active.long_break_duration = Set(long_break_duration);
        }
        if let Some(sessions_until_long_break) = input.sessions_until_long_break {
            active.sessions_until_long_break = Set(sessions_until_long_break);
        }

        self.pomodoro_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_session(id: &str, user_id: &str, ended: bool) -> study_session::Model {
        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        study_session::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            subject_id: None,
            start_time: now - chrono::Duration::minutes(30),
            end_time: ended.then_some(now),
            duration_seconds: ended.then_some(1800),
            notes: String::new(),
        }
    }

    struct MockDbs {
        session: MockDatabase,
        subject: MockDatabase,
        pomodoro: MockDatabase,
        user: MockDatabase,
    }

    impl MockDbs {
        fn new() -> Self {
            Self {
                session: MockDatabase::new(DatabaseBackend::Postgres),
                subject: MockDatabase::new(DatabaseBackend::Postgres),
                pomodoro: MockDatabase::new(DatabaseBackend::Postgres),
                user: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn into_service(self) -> StudyService {
            StudyService::new(
                StudySessionRepository::new(Arc::new(self.session.into_connection())),
                SubjectRepository::new(Arc::new(self.subject.into_connection())),
                PomodoroSettingsRepository::new(Arc::new(self.pomodoro.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
            )
        }
    }

    #[test]
    fn test_session_duration_is_exact() {
        let start: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let end = start + chrono::Duration::seconds(5400);

        assert_eq!(session_duration_seconds(start, end), 5400);
    }

    #[tokio::test]
    async fn test_end_session_rejects_non_owner() {
        let mut dbs = MockDbs::new();
        dbs.session = dbs
            .session
            .append_query_results([[create_test_session("ss1", "owner", false)]]);

        let service = dbs.into_service();
        let result = service.end_session("ss1", "intruder").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_end_session_twice_is_noop() {
        let ended = create_test_session("ss1", "user1", true);
        let original_end = ended.end_time;

        let mut dbs = MockDbs::new();
        dbs.session = dbs.session.append_query_results([[ended]]);

        let service = dbs.into_service();
        let result = service.end_session("ss1", "user1").await.unwrap();

        // No second write happened; the stored end time is untouched
        assert_eq!(result.end_time, original_end);
        assert_eq!(result.duration_seconds, Some(1800));
    }

    #[tokio::test]
    async fn test_update_pomodoro_rejects_out_of_range_work_duration() {
        let service = MockDbs::new().into_service();

        let result = service
            .update_pomodoro_settings(
                "user1",
                UpdatePomodoroSettingsInput {
                    work_duration: Some(121),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_pomodoro_rejects_zero_break() {
        let service = MockDbs::new().into_service();

        let result = service
            .update_pomodoro_settings(
                "user1",
                UpdatePomodoroSettingsInput {
                    break_duration: Some(0),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_pomodoro_settings_returns_existing_row() {
        let settings = pomodoro_settings::Model {
            id: "ps1".to_string(),
            user_id: "user1".to_string(),
            work_duration: 50,
            break_duration: 10,
            long_break_duration: 30,
            sessions_until_long_break: 2,
        };

        let mut dbs = MockDbs::new();
        dbs.pomodoro = dbs.pomodoro.append_query_results([[settings]]);

        let service = dbs.into_service();
        let result = service.get_pomodoro_settings("user1").await.unwrap();

        assert_eq!(result.work_duration, 50);
    }
}
