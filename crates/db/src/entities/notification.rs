//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NotificationType {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "alarm")]
    Alarm,
    #[sea_orm(string_value = "pomodoro")]
    Pomodoro,
    #[sea_orm(string_value = "friend_request")]
    FriendRequest,
    #[sea_orm(string_value = "study_milestone")]
    StudyMilestone,
    #[sea_orm(string_value = "achievement")]
    Achievement,
}

/// Notification priority levels (drive presentation emphasis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum NotificationPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

/// Kinds of entities a notification may point at.
///
/// The target set is closed, so the reference is a discriminated
/// (kind, id) pair rather than an untyped polymorphic link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TargetKind {
    #[sea_orm(string_value = "alarm")]
    Alarm,
    #[sea_orm(string_value = "friend_request")]
    FriendRequest,
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "study_session")]
    StudySession,
    #[sea_orm(string_value = "achievement")]
    Achievement,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    pub user_id: String,

    pub notification_type: NotificationType,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Optional link to open when the notification is activated
    #[sea_orm(nullable)]
    pub link: Option<String>,

    pub priority: NotificationPriority,

    /// Kind of the related entity, if any
    #[sea_orm(nullable)]
    pub target_kind: Option<TargetKind>,

    /// ID of the related entity, if any
    #[sea_orm(nullable)]
    pub target_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    #[sea_orm(default_value = false)]
    pub is_dismissed: bool,

    pub created_at: DateTimeWithTimeZone,

    /// Set when `is_read` flips through a single mark-read; bulk
    /// mark-all-read leaves it NULL
    #[sea_orm(nullable)]
    pub read_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether the notification was created less than 24 hours before
    /// `now`. Computed at read time, never stored.
    #[must_use]
    pub fn is_recent_at(&self, now: chrono::DateTime<chrono::FixedOffset>) -> bool {
        now.signed_duration_since(self.created_at) < chrono::Duration::hours(24)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
