//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod alarm;
pub mod feed;
pub mod messaging;
pub mod notification;
pub mod postit;
pub mod social_graph;
pub mod study;

pub use account::{AccountService, RegisterInput, Registration, UpdateProfileInput};
pub use alarm::{AlarmService, CreateAlarmInput, UpdateAlarmInput};
pub use feed::{
    CreatePostInput, DEFAULT_LIKES_WEIGHT, DEFAULT_SAVES_WEIGHT, FeedService, UpdatePostInput,
    relevance_score, slugify,
};
pub use messaging::{ConversationSummary, MessagingService, truncate_preview};
pub use notification::{
    CreateNotificationInput, NotificationService, NotificationTarget,
};
pub use postit::{CreatePostItInput, PostItService, UpdatePostItInput};
pub use social_graph::{FriendRequestOutcome, SocialGraphService};
pub use study::{StudyService, UpdatePomodoroSettingsInput, session_duration_seconds};
