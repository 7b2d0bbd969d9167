//! Database entities.

#![allow(missing_docs)]

pub mod alarm;
pub mod conversation;
pub mod conversation_participant;
pub mod following;
pub mod friend_request;
pub mod friendship;
pub mod message;
pub mod message_read;
pub mod notification;
pub mod pomodoro_settings;
pub mod post;
pub mod post_it;
pub mod post_like;
pub mod post_save;
pub mod post_subject;
pub mod study_session;
pub mod subject;
pub mod user;
pub mod user_profile;

pub use alarm::Entity as Alarm;
pub use conversation::Entity as Conversation;
pub use conversation_participant::Entity as ConversationParticipant;
pub use following::Entity as Following;
pub use friend_request::Entity as FriendRequest;
pub use friendship::Entity as Friendship;
pub use message::Entity as Message;
pub use message_read::Entity as MessageRead;
pub use notification::Entity as Notification;
pub use pomodoro_settings::Entity as PomodoroSettings;
pub use post::Entity as Post;
pub use post_it::Entity as PostIt;
pub use post_like::Entity as PostLike;
pub use post_save::Entity as PostSave;
pub use post_subject::Entity as PostSubject;
pub use study_session::Entity as StudySession;
pub use subject::Entity as Subject;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
