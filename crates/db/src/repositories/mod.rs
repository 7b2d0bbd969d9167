//! Database repositories.

#![allow(missing_docs)]

pub mod alarm;
pub mod conversation;
pub mod following;
pub mod friend_request;
pub mod friendship;
pub mod message;
pub mod notification;
pub mod pomodoro_settings;
pub mod post;
pub mod post_it;
pub mod post_like;
pub mod post_save;
pub mod study_session;
pub mod subject;
pub mod user;
pub mod user_profile;

pub use alarm::AlarmRepository;
pub use conversation::ConversationRepository;
pub use following::FollowingRepository;
pub use friend_request::FriendRequestRepository;
pub use friendship::{FriendshipRepository, canonical_pair};
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use pomodoro_settings::PomodoroSettingsRepository;
pub use post::PostRepository;
pub use post_it::PostItRepository;
pub use post_like::PostLikeRepository;
pub use post_save::PostSaveRepository;
pub use study_session::StudySessionRepository;
pub use subject::SubjectRepository;
pub use user::UserRepository;
pub use user_profile::UserProfileRepository;
